use overlay_query::{Query, SqlDialect};
use overlay_types::Row;

use crate::error::StoreResult;

/// A source of rows that can execute overlay queries.
///
/// Implementations must:
/// - treat queries as read-only; executing never changes stored data,
/// - honour SQL semantics for NULL, outer joins and `UNION`,
/// - return rows keyed by the projection aliases of the query,
/// - propagate every backend failure as an error instead of returning a
///   partial result.
pub trait Store: Send + Sync {
    /// SQL flavour of the underlying database.
    fn dialect(&self) -> SqlDialect;

    /// Execute a query and return its rows in result order.
    fn execute(&self, query: &Query) -> StoreResult<Vec<Row>>;

    /// Execute a query expected to yield at most one row.
    fn fetch_one(&self, query: &Query) -> StoreResult<Option<Row>> {
        Ok(self.execute(query)?.into_iter().next())
    }
}
