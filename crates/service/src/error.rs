//! Typed error enum for the service layer.
//!
//! Lets handlers tell a rejected submission apart from a storage failure
//! without inspecting message strings.

use medassist_core::ValidationError;
use medassist_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage operation failed.
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// Caller provided invalid input. Safe to echo back.
    #[error("{0}")]
    InvalidInput(#[from] ValidationError),
}
