use std::collections::BTreeMap;
use std::sync::RwLock;

use overlay_query::{render_inline, Query, SqlDialect};
use overlay_types::Row;
use tracing::{debug, Level};

use crate::error::{StoreError, StoreResult};
use crate::eval::Evaluator;
use crate::table::Table;
use crate::traits::Store;

/// In-memory relational store.
///
/// Tables live behind a `RwLock`; queries evaluate under a read lock so
/// concurrent readers never block each other. The dialect only affects how
/// executed queries are rendered into the debug log.
pub struct InMemoryStore {
    dialect: SqlDialect,
    tables: RwLock<BTreeMap<String, Table>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new(dialect: SqlDialect) -> Self {
        Self {
            dialect,
            tables: RwLock::new(BTreeMap::new()),
        }
    }

    /// Add an empty table with the given columns.
    pub fn create_table<I, S>(&self, name: &str, columns: I) -> StoreResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_table(Table::new(name, columns))
    }

    /// Add a table, rows included. Rows are checked against the columns.
    pub fn add_table(&self, table: Table) -> StoreResult<()> {
        for row in &table.rows {
            table.check_row(row)?;
        }
        let mut tables = self.tables.write().map_err(|_| StoreError::Poisoned)?;
        if tables.contains_key(&table.name) {
            return Err(StoreError::DuplicateTable(table.name));
        }
        tables.insert(table.name.clone(), table);
        Ok(())
    }

    /// Append a row to a table.
    pub fn insert(&self, table: &str, row: Row) -> StoreResult<()> {
        let mut tables = self.tables.write().map_err(|_| StoreError::Poisoned)?;
        tables
            .get_mut(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))?
            .insert(row)
    }

    /// Append several rows, stopping at the first invalid one.
    pub fn insert_all(&self, table: &str, rows: impl IntoIterator<Item = Row>) -> StoreResult<()> {
        rows.into_iter().try_for_each(|row| self.insert(table, row))
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables
            .read()
            .map(|t| t.contains_key(name))
            .unwrap_or(false)
    }

    /// Sorted table names.
    pub fn table_names(&self) -> StoreResult<Vec<String>> {
        let tables = self.tables.read().map_err(|_| StoreError::Poisoned)?;
        Ok(tables.keys().cloned().collect())
    }

    pub fn row_count(&self, table: &str) -> StoreResult<usize> {
        let tables = self.tables.read().map_err(|_| StoreError::Poisoned)?;
        tables
            .get(table)
            .map(Table::len)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(SqlDialect::default())
    }
}

impl Store for InMemoryStore {
    fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    fn execute(&self, query: &Query) -> StoreResult<Vec<Row>> {
        query.validate()?;
        if tracing::enabled!(Level::DEBUG) {
            if let Ok(sql) = render_inline(query, self.dialect) {
                debug!(dialect = %self.dialect, %sql, "executing query");
            }
        }
        let tables = self.tables.read().map_err(|_| StoreError::Poisoned)?;
        let rows = Evaluator::new(&tables).query(query)?;
        debug!(rows = rows.len(), "query returned");
        Ok(rows)
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.tables.read().map(|t| t.len()).unwrap_or(0);
        f.debug_struct("InMemoryStore")
            .field("dialect", &self.dialect)
            .field("table_count", &count)
            .finish()
    }
}
