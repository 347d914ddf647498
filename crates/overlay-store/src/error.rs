use overlay_query::QueryError;

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The query referenced a table the store does not hold.
    #[error("unknown table: {0}")]
    UnknownTable(String),

    /// A table with this name already exists.
    #[error("table already exists: {0}")]
    DuplicateTable(String),

    /// A qualified column used an alias that is not in scope.
    #[error("unknown table alias: {0}")]
    UnknownAlias(String),

    /// A column could not be resolved against the sources in scope.
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// An unqualified column matched more than one source.
    #[error("ambiguous column: {0}")]
    AmbiguousColumn(String),

    /// A row carried a column the table does not define.
    #[error("table {table} has no column {column}")]
    InvalidRow { table: String, column: String },

    /// A sub-select used with `IN` must project exactly one column.
    #[error("sub-select projects {0} columns, expected 1")]
    SubqueryColumns(usize),

    /// The query failed structural validation.
    #[error("invalid query: {0}")]
    Query(#[from] QueryError),

    /// A lock guarding store state was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Poisoned,

    /// Failure reported by an external backend.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
