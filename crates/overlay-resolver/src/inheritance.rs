//! Template inheritance: filtering listings down to a template's children.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use overlay_query::{Expr, Fragment, Predicate, Query, Select};
use overlay_store::Store;
use overlay_types::{ObjectId, ObjectType, Value};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ResolverResult;
use crate::metadata::CategoryMeta;

/// How deep below a template an object may sit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Inheritance {
    /// Objects importing the template itself.
    #[default]
    Direct,
    /// Objects importing one of the template's descendants, not the template.
    Indirect,
    /// Objects importing the template or any descendant.
    All,
}

impl Inheritance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Indirect => "indirect",
            Self::All => "all",
        }
    }
}

impl fmt::Display for Inheritance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Inheritance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "direct" => Ok(Self::Direct),
            "indirect" => Ok(Self::Indirect),
            "all" => Ok(Self::All),
            other => Err(format!("unknown inheritance mode '{other}'")),
        }
    }
}

/// Restrict a listing to objects below `template`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TemplateFilter {
    pub template: ObjectId,
    pub mode: Inheritance,
}

impl TemplateFilter {
    pub fn new(template: ObjectId, mode: Inheritance) -> Self {
        Self { template, mode }
    }

    /// Resolve the parent ids this filter accepts.
    pub fn resolve(&self, store: &dyn Store, meta: &CategoryMeta) -> ResolverResult<TemplateScope> {
        let tree = TemplateTree::new(store, meta);
        let root = self.template.get();
        let parents = match self.mode {
            Inheritance::Direct => vec![root],
            Inheritance::Indirect => tree.descendants(root)?,
            Inheritance::All => {
                let mut ids = vec![root];
                ids.extend(tree.descendants(root)?);
                ids
            }
        };
        debug!(
            template = %self.template,
            mode = %self.mode,
            parents = parents.len(),
            "template filter resolved"
        );
        Ok(TemplateScope {
            inheritance_table: meta.inheritance_table(),
            child_column: meta.child_column(),
            parent_column: meta.parent_column(),
            parent_ids: parents,
        })
    }
}

/// A resolved template filter, ready to narrow query fragments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateScope {
    inheritance_table: String,
    child_column: String,
    parent_column: String,
    parent_ids: Vec<i64>,
}

impl TemplateScope {
    pub fn parent_ids(&self) -> &[i64] {
        &self.parent_ids
    }

    /// `identity IN (SELECT child FROM inheritance WHERE parent IN ids)`.
    ///
    /// Pending objects have no identity yet and are left out of every
    /// template listing.
    pub fn apply(&self, select: &mut Select, fragment: Fragment) {
        if self.parent_ids.is_empty() {
            select.add_filter(Predicate::False);
            return;
        }
        let children = Select::from_table(self.inheritance_table.as_str(), "i")
            .column(self.child_column.as_str(), Expr::col("i", &self.child_column))
            .filter(
                Expr::col("i", &self.parent_column)
                    .in_list(self.parent_ids.iter().map(|id| Value::from(*id)).collect()),
            );
        select.add_filter(fragment.identity().in_select(children));
    }
}

/// Walks a category's inheritance graph through the store.
pub struct TemplateTree<'a> {
    store: &'a dyn Store,
    meta: &'a CategoryMeta,
}

impl<'a> TemplateTree<'a> {
    pub fn new(store: &'a dyn Store, meta: &'a CategoryMeta) -> Self {
        Self { store, meta }
    }

    /// Objects directly importing any of `parents`.
    pub fn children(&self, parents: &[i64]) -> ResolverResult<Vec<i64>> {
        if parents.is_empty() {
            return Ok(Vec::new());
        }
        let child = self.meta.child_column();
        let parent = self.meta.parent_column();
        let query: Query = Select::from_table(self.meta.inheritance_table(), "i")
            .column(child.as_str(), Expr::col("i", &child))
            .filter(
                Expr::col("i", &parent)
                    .in_list(parents.iter().map(|id| Value::from(*id)).collect()),
            )
            .into();
        Ok(self
            .store
            .execute(&query)?
            .iter()
            .filter_map(|row| row.get_int(&child))
            .collect())
    }

    /// Every object below `template`, in breadth-first order, template
    /// excluded. Cycles are tolerated.
    pub fn descendants(&self, template: i64) -> ResolverResult<Vec<i64>> {
        let mut seen = BTreeSet::from([template]);
        let mut out = Vec::new();
        let mut frontier = vec![template];
        while !frontier.is_empty() {
            let mut next = Vec::new();
            for id in self.children(&frontier)? {
                if seen.insert(id) {
                    out.push(id);
                    next.push(id);
                }
            }
            frontier = next;
        }
        Ok(out)
    }
}

/// Look up a template of the category by name.
pub fn find_template(
    store: &dyn Store,
    meta: &CategoryMeta,
    name: &str,
) -> ResolverResult<Option<ObjectId>> {
    let query: Query = Select::from_table(meta.table.as_str(), "o")
        .column("id", Expr::col("o", "id"))
        .filter(Expr::col("o", "object_name").equals(Expr::param(name)))
        .filter(Expr::col("o", "object_type").equals(Expr::param(ObjectType::Template)))
        .limit(1)
        .into();
    Ok(store
        .fetch_one(&query)?
        .and_then(|row| row.get_int("id"))
        .map(ObjectId::new))
}
