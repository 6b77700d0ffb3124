use thiserror::Error;

use crate::model::Epoch;

/// A persisted snapshot could not be resumed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RestoreError {
    #[error("snapshot belongs to epoch {found}, expected {expected}")]
    EpochMismatch { expected: Epoch, found: Epoch },
}
