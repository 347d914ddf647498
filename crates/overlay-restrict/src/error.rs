use overlay_store::StoreError;

/// Errors raised while building restrictions.
#[derive(Debug, thiserror::Error)]
pub enum RestrictError {
    /// Restrictions were requested without an authenticated principal.
    #[error("restrictions require an authenticated principal")]
    Unauthenticated,

    /// Resolving restriction data from the store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result alias for restriction operations.
pub type RestrictResult<T> = Result<T, RestrictError>;
