//! The overlay algorithm.
//!
//! Without a branch a listing is a plain select over the base table. With a
//! branch it is the union of two disjoint fragments:
//!
//! - **overridden**: every base row, left-joined to its delta in the branch,
//!   minus rows the branch deletes;
//! - **pending**: deltas of the branch that have no base row (new objects).
//!
//! Each fragment gets the type filter, the restriction chain and the
//! template filter on its own. Search, ordering and the page limit apply to
//! the union as a whole, so fragments also carry searchable columns that
//! are not displayed.

use overlay_query::{
    escape_like, Expr, Fragment, Predicate, Query, Select, BASE_ALIAS, DELTA_ALIAS,
    IDENTITY_COLUMN, UNION_ALIAS,
};
use overlay_restrict::RestrictionChain;
use overlay_types::{BranchId, Flag, ObjectType};
use tracing::debug;

use crate::inheritance::TemplateScope;
use crate::metadata::CategoryMeta;
use crate::schema::{CategorySchema, ColumnDef};

/// Fixed page size of a listing.
pub const PAGE_SIZE: usize = 100;
/// Fixed sort column of a listing, ascending.
pub const SORT_KEY: &str = "object_name";

/// Everything the overlay algorithm needs besides the branch.
#[derive(Clone, Copy)]
pub struct QueryPlan<'a> {
    pub meta: &'a CategoryMeta,
    /// Displayed columns.
    pub schema: &'a CategorySchema,
    /// Every searchable column of the category, displayed or not.
    pub search_columns: &'a [ColumnDef],
    pub object_type: ObjectType,
    pub restrictions: &'a RestrictionChain,
    pub template: Option<&'a TemplateScope>,
    /// Whitespace-separated search text.
    pub search: Option<&'a str>,
    pub case_insensitive: bool,
}

impl<'a> QueryPlan<'a> {
    /// Type filter, restrictions and template filter for one fragment.
    fn scope(&self, select: &mut Select, fragment: Fragment) {
        select.add_filter(fragment.type_column().equals(Expr::param(self.object_type)));
        self.restrictions.apply(select, fragment);
        if let Some(template) = self.template {
            template.apply(select, fragment);
        }
    }

    fn project(&self, mut select: Select, fragment: Fragment) -> Select {
        for (alias, expr) in self.schema.projection(fragment) {
            select = select.column(alias, expr);
        }
        if fragment.is_overlay() {
            for column in self.hidden_search_columns() {
                select = select.column(column.alias.as_str(), column.expr(fragment));
            }
        }
        select
    }

    /// Searchable columns outside the displayed schema.
    fn hidden_search_columns(&self) -> impl Iterator<Item = &'a ColumnDef> {
        let schema = self.schema;
        self.search_columns
            .iter()
            .filter(move |c| schema.get(&c.alias).is_none())
    }

    fn search_terms(&self) -> Vec<&str> {
        self.search
            .map(|s| s.split_whitespace().collect())
            .unwrap_or_default()
    }
}

/// Every term must match at least one of `columns`.
pub fn search_predicate(terms: &[&str], columns: &[Expr], case_insensitive: bool) -> Predicate {
    Predicate::and(
        terms
            .iter()
            .map(|term| {
                let pattern = format!("%{}%", escape_like(term));
                Predicate::or(
                    columns
                        .iter()
                        .map(|c| c.clone().like(pattern.clone(), case_insensitive))
                        .collect(),
                )
            })
            .collect(),
    )
}

/// Listing without a branch.
pub fn resolve_base(plan: &QueryPlan<'_>) -> Query {
    let mut select = plan.project(
        Select::from_table(plan.meta.table.as_str(), BASE_ALIAS),
        Fragment::Base,
    );
    plan.scope(&mut select, Fragment::Base);

    let columns: Vec<Expr> = plan
        .search_columns
        .iter()
        .map(|c| c.expr(Fragment::Base))
        .collect();
    select.add_filter(search_predicate(
        &plan.search_terms(),
        &columns,
        plan.case_insensitive,
    ));

    debug!(category = %plan.meta.name, "base query built");
    select
        .order_by(Expr::col(BASE_ALIAS, SORT_KEY))
        .limit(PAGE_SIZE)
        .into()
}

/// Listing as seen from inside `branch`.
pub fn resolve_overlay(plan: &QueryPlan<'_>, branch: BranchId) -> Query {
    let fragments = vec![overridden(plan, branch), pending(plan, branch)];
    debug!(
        category = %plan.meta.name,
        branch = %branch.short_id(),
        fragments = fragments.len(),
        "overlay query built"
    );

    let mut outer = union(fragments, &plan.schema.aliases());
    let columns: Vec<Expr> = plan
        .search_columns
        .iter()
        .map(|c| Expr::name(&c.alias))
        .collect();
    outer.add_filter(search_predicate(
        &plan.search_terms(),
        &columns,
        plan.case_insensitive,
    ));
    outer.order_by(Expr::name(SORT_KEY)).limit(PAGE_SIZE).into()
}

/// Duplicate-free union of `fragments`, wrapped so it can be filtered and
/// sorted by the unqualified column names in `columns`.
pub fn union(fragments: Vec<Select>, columns: &[String]) -> Select {
    columns.iter().fold(
        Select::from_derived(Query::union(fragments), UNION_ALIAS),
        |select, alias| select.column(alias.as_str(), Expr::name(alias)),
    )
}

fn not_deleted() -> Predicate {
    let deleted = Expr::col(DELTA_ALIAS, "deleted");
    Predicate::or(vec![
        deleted.clone().is_null(),
        deleted.equals(Expr::param(Flag::No)),
    ])
}

fn branch_matches(branch: BranchId) -> Predicate {
    Expr::col(DELTA_ALIAS, "branch_uuid").equals(Expr::param(branch))
}

fn delta_of_base() -> Predicate {
    Expr::col(DELTA_ALIAS, "object_id").equals(Expr::col(BASE_ALIAS, IDENTITY_COLUMN))
}

fn overridden(plan: &QueryPlan<'_>, branch: BranchId) -> Select {
    let mut select = plan
        .project(
            Select::from_table(plan.meta.table.as_str(), BASE_ALIAS),
            Fragment::Overridden,
        )
        .left_join(
            &plan.meta.branch_table(),
            DELTA_ALIAS,
            Predicate::and(vec![delta_of_base(), branch_matches(branch)]),
        )
        .filter(not_deleted());
    plan.scope(&mut select, Fragment::Overridden);
    select
}

fn pending(plan: &QueryPlan<'_>, branch: BranchId) -> Select {
    let mut select = plan
        .project(
            Select::from_table(plan.meta.table.as_str(), BASE_ALIAS),
            Fragment::Pending,
        )
        .right_join(&plan.meta.branch_table(), DELTA_ALIAS, delta_of_base())
        .filter(Expr::col(BASE_ALIAS, IDENTITY_COLUMN).is_null())
        .filter(branch_matches(branch))
        .filter(not_deleted());
    plan.scope(&mut select, Fragment::Pending);
    select
}
