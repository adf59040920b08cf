//! Authentication error types.

use kv_store::StorageError;
use thiserror::Error;

/// Errors that can occur during authentication operations.
///
/// Rejected credentials and duplicate emails are not errors; they are
/// reported as `Ok(false)` by the store.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Device storage failed. The in-memory change has already been applied.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;
