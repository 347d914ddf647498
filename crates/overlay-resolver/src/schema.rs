//! Column schema and projection.
//!
//! The schema decides which columns a listing fetches, which ones search
//! looks at, and which ones read through the branch delta.

use overlay_query::{Expr, Fragment, IDENTITY_COLUMN};

use crate::error::{ResolverError, ResolverResult};

/// Columns every listing projects, whatever subset was requested.
pub const MANDATORY_COLUMNS: [&str; 4] = [IDENTITY_COLUMN, "object_name", "object_type", "disabled"];

/// One projected column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnDef {
    /// Name in result rows.
    pub alias: String,
    /// Column of the base and delta tables.
    pub column: String,
    /// Read `COALESCE(delta, base)` when a branch is active.
    pub overlay_eligible: bool,
    /// Matched against search terms.
    pub searchable: bool,
}

impl ColumnDef {
    /// An overlay-eligible, non-searchable column named like its alias.
    pub fn new(alias: &str) -> Self {
        Self {
            alias: alias.to_string(),
            column: alias.to_string(),
            overlay_eligible: true,
            searchable: false,
        }
    }

    /// A column exposed under a different alias.
    pub fn mapped(alias: &str, column: &str) -> Self {
        Self {
            column: column.to_string(),
            ..Self::new(alias)
        }
    }

    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    /// Never overlaid: always read from the base table.
    pub fn base_only(mut self) -> Self {
        self.overlay_eligible = false;
        self
    }

    /// Projection expression in `fragment`.
    pub fn expr(&self, fragment: Fragment) -> Expr {
        fragment.column(&self.column, self.overlay_eligible)
    }
}

/// Ordered column list of a category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategorySchema {
    category: String,
    columns: Vec<ColumnDef>,
}

impl CategorySchema {
    /// The mandatory columns; `object_name` is searchable.
    pub fn new(category: &str) -> Self {
        Self {
            category: category.to_string(),
            columns: vec![
                ColumnDef::new(IDENTITY_COLUMN).base_only(),
                ColumnDef::new("object_name").searchable(),
                ColumnDef::new("object_type"),
                ColumnDef::new("disabled"),
            ],
        }
    }

    /// Add a column, replacing one with the same alias in place.
    pub fn push(&mut self, column: ColumnDef) {
        match self.columns.iter_mut().find(|c| c.alias == column.alias) {
            Some(slot) => *slot = column,
            None => self.columns.push(column),
        }
    }

    pub fn with(mut self, column: ColumnDef) -> Self {
        self.push(column);
        self
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn get(&self, alias: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.alias == alias)
    }

    pub fn aliases(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.alias.clone()).collect()
    }

    pub fn search_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| c.searchable)
    }

    /// Keep the mandatory columns plus `requested`, in schema order.
    pub fn subset(&self, requested: &[String]) -> ResolverResult<Self> {
        if let Some(missing) = requested.iter().find(|r| self.get(r).is_none()) {
            return Err(ResolverError::UnknownColumn {
                category: self.category.clone(),
                column: missing.clone(),
            });
        }
        let columns = self
            .columns
            .iter()
            .filter(|c| MANDATORY_COLUMNS.contains(&c.alias.as_str()) || requested.contains(&c.alias))
            .cloned()
            .collect();
        Ok(Self {
            category: self.category.clone(),
            columns,
        })
    }

    /// `(alias, expr)` pairs for a select over `fragment`.
    pub fn projection(&self, fragment: Fragment) -> Vec<(String, Expr)> {
        self.columns
            .iter()
            .map(|c| (c.alias.clone(), c.expr(fragment)))
            .collect()
    }
}
