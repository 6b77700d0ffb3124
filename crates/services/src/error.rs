//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use validation_core::RestoreError;

/// Errors emitted while starting or driving a validation session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("validation session has shut down")]
    Closed,
    #[error(transparent)]
    Restore(#[from] RestoreError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Typed failure returned by an `AnswerSubmitter`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SubmitError {
    /// The node refused the answers.
    #[error("answers rejected: {0}")]
    Rejected(String),
    /// The node could not be reached; the outcome is unknown.
    #[error("submission endpoint unavailable: {0}")]
    Unavailable(String),
}
