//! Column scoping for the parts of an overlay query.
//!
//! A logical column such as `object_name` is read differently depending on
//! which part of the query is being built. Filters (type filter,
//! restrictions, template filter) ask the [`Fragment`] for the expression to
//! use instead of hard-coding table aliases.

use crate::ast::Expr;

/// Alias of the canonical (base) table.
pub const BASE_ALIAS: &str = "o";
/// Alias of the branch-delta table.
pub const DELTA_ALIAS: &str = "bo";
/// Alias of the derived table wrapping the union of overlay fragments.
pub const UNION_ALIAS: &str = "u";
/// The identity column. Always read from the base table.
pub const IDENTITY_COLUMN: &str = "id";

/// The part of a query a filter is being applied to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Fragment {
    /// Plain base-table query (no active branch).
    Base,
    /// Base rows left-joined to their delta, if any.
    Overridden,
    /// Deltas without a base row: objects created inside the branch.
    Pending,
}

impl Fragment {
    /// Returns `true` for the two fragments of a branch overlay.
    pub fn is_overlay(&self) -> bool {
        !matches!(self, Self::Base)
    }

    /// The base identity (`o.id`).
    ///
    /// NULL for pending objects, so a filter on identity (template children,
    /// hostgroup membership) never matches an object created in the branch.
    pub fn identity(&self) -> Expr {
        Expr::col(BASE_ALIAS, IDENTITY_COLUMN)
    }

    /// Expression for a column, preferring the delta value when the column
    /// is overlay-eligible and a branch is active.
    pub fn column(&self, name: &str, overlay_eligible: bool) -> Expr {
        if !self.is_overlay() || !overlay_eligible || name == IDENTITY_COLUMN {
            return Expr::col(BASE_ALIAS, name);
        }
        Expr::coalesce(Expr::col(DELTA_ALIAS, name), Expr::col(BASE_ALIAS, name))
    }

    /// The effective (overlaid) value of a column.
    pub fn effective(&self, name: &str) -> Expr {
        self.column(name, true)
    }

    /// Column the type filter must compare against.
    ///
    /// Pending objects have no base row, so their category discriminator
    /// can only come from the delta itself.
    pub fn type_column(&self) -> Expr {
        match self {
            Self::Base | Self::Overridden => Expr::col(BASE_ALIAS, "object_type"),
            Self::Pending => Expr::col(DELTA_ALIAS, "object_type"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_fragment_reads_base_columns() {
        assert_eq!(
            Fragment::Base.column("disabled", true),
            Expr::col("o", "disabled")
        );
    }

    #[test]
    fn overlay_fragments_coalesce_eligible_columns() {
        let expected = Expr::coalesce(Expr::col("bo", "disabled"), Expr::col("o", "disabled"));
        assert_eq!(Fragment::Overridden.column("disabled", true), expected);
        assert_eq!(Fragment::Pending.effective("disabled"), expected);
    }

    #[test]
    fn ineligible_columns_stay_on_base() {
        assert_eq!(
            Fragment::Overridden.column("address", false),
            Expr::col("o", "address")
        );
    }

    #[test]
    fn identity_is_never_overlaid() {
        assert_eq!(Fragment::Overridden.column("id", true), Expr::col("o", "id"));
        assert_eq!(Fragment::Pending.identity(), Expr::col("o", "id"));
    }

    #[test]
    fn type_filter_column_depends_on_fragment() {
        assert_eq!(Fragment::Base.type_column(), Expr::col("o", "object_type"));
        assert_eq!(
            Fragment::Overridden.type_column(),
            Expr::col("o", "object_type")
        );
        assert_eq!(
            Fragment::Pending.type_column(),
            Expr::col("bo", "object_type")
        );
    }
}
