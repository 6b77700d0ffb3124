//! Submission Controller seam.

use async_trait::async_trait;
use serde::Serialize;

use validation_core::machine::{FlipAnswer, SessionTier};
use validation_core::model::{CredentialHandle, Epoch};

use crate::error::SubmitError;

/// Answers of one tier, as handed to the submitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionRequest {
    pub epoch: Epoch,
    pub coinbase: String,
    pub tier: SessionTier,
    pub attempt: u32,
    pub answers: Vec<FlipAnswer>,
    #[serde(skip)]
    pub credential: CredentialHandle,
}

/// External collaborator that publishes answers.
///
/// Called at most once per attempt; never retried automatically.
#[async_trait]
pub trait AnswerSubmitter: Send + Sync {
    /// Submit the answers of one tier.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError` if the answers were rejected or could not be delivered.
    async fn submit(&self, request: SubmissionRequest) -> Result<(), SubmitError>;
}
