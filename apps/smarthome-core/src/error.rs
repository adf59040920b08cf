//! Application error types.

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The operation needs a signed-in user.
    #[error("Not signed in")]
    NotSignedIn,

    /// Storage could not be opened.
    #[error("Storage error: {0}")]
    Storage(#[from] kv_store::StorageError),

    /// Authentication store error.
    #[error("Auth error: {0}")]
    Auth(#[from] auth::AuthError),

    /// Listing store error.
    #[error("Listing error: {0}")]
    Listings(#[from] listing_store::ListingStoreError),
}

/// Result type alias for application operations.
pub type AppResult<T> = Result<T, AppError>;
