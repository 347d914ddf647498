/// Errors detected while validating or rendering a query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// A select projects no columns.
    #[error("select from '{source_name}' projects no columns")]
    EmptyProjection { source_name: String },

    /// A union has no parts.
    #[error("union has no parts")]
    EmptyUnion,

    /// Union parts project different column lists.
    #[error("union part {index} projects {actual:?}, expected {expected:?}")]
    MismatchedUnion {
        index: usize,
        expected: Vec<String>,
        actual: Vec<String>,
    },
}

/// Result alias for query operations.
pub type QueryResult<T> = Result<T, QueryError>;
