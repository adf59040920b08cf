//! Listing store error types.

use kv_store::StorageError;
use thiserror::Error;

/// Errors that can occur during listing store operations.
#[derive(Debug, Error)]
pub enum ListingStoreError {
    /// Device storage failed. The in-memory change has already been applied.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for listing store operations.
pub type ListingStoreResult<T> = Result<T, ListingStoreError>;
