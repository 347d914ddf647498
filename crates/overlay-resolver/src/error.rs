use overlay_query::QueryError;
use overlay_restrict::RestrictError;
use overlay_store::StoreError;

/// Errors from resolving object listings.
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    /// No metadata is registered for the category.
    #[error("unknown object category: {0}")]
    UnknownCategory(String),

    /// A requested display column is not part of the category schema.
    #[error("category {category} has no column {column}")]
    UnknownColumn { category: String, column: String },

    /// A listing request for another category was handed to a resolver.
    #[error("query targets category {actual}, resolver serves {expected}")]
    CategoryMismatch { expected: String, actual: String },

    /// Building the restriction chain failed.
    #[error(transparent)]
    Restriction(#[from] RestrictError),

    /// Store failure, propagated unchanged.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The generated query was structurally invalid.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResolverError {
    /// Returns `true` when the caller was not authenticated.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Restriction(RestrictError::Unauthenticated))
    }
}

/// Result alias for resolver operations.
pub type ResolverResult<T> = Result<T, ResolverError>;
