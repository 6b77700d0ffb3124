//! Headless replay of a recorded event script against a session fixture.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use services::{
    AnswerSubmitter, SessionError, SessionHandle, SessionHooks, SubmissionRequest, SubmitError,
};
use tracing::info;
use validation_core::machine::{Event, FailureReason, predicates};
use validation_core::model::{Flip, FlipHash, SessionParamsDraft};

/// Session parameters plus the initial flip lists.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionFixture {
    pub epoch: u64,
    pub coinbase: String,
    #[serde(default)]
    pub credential: String,
    /// Epoch milliseconds; defaults to the moment the replay starts.
    pub validation_start_ms: Option<i64>,
    pub short_session_secs: u32,
    pub long_session_secs: u32,
    pub locale: Option<String>,
    #[serde(default)]
    pub short_flips: Vec<Flip>,
    #[serde(default)]
    pub long_flips: Vec<Flip>,
}

impl SessionFixture {
    pub fn into_parts(self, started_ms: i64) -> (SessionParamsDraft, Vec<Flip>, Vec<Flip>) {
        let draft = SessionParamsDraft {
            epoch: self.epoch,
            coinbase: self.coinbase,
            credential: self.credential,
            validation_start_ms: self.validation_start_ms.unwrap_or(started_ms),
            short_session_secs: self.short_session_secs,
            long_session_secs: self.long_session_secs,
            locale: self.locale,
        };
        (draft, self.short_flips, self.long_flips)
    }
}

pub fn load_fixture(path: &Path) -> Result<SessionFixture, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn load_script(path: &Path) -> Result<Vec<Event>, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Feed `script` to the session one event at a time.
///
/// A submission started by an event is resolved before the next event is sent.
///
/// # Errors
///
/// Returns `SessionError::Closed` if the session stops mid-script.
pub async fn run_script(handle: &SessionHandle, script: Vec<Event>) -> Result<(), SessionError> {
    for event in script {
        let applied = handle.apply(event).await?;
        if predicates::is_submitting(&applied) {
            handle
                .wait_for(|snapshot| !predicates::is_submitting(snapshot))
                .await?;
        }
    }
    Ok(())
}

/// Submitter that logs the payload instead of publishing it.
pub struct DryRunSubmitter;

#[async_trait]
impl AnswerSubmitter for DryRunSubmitter {
    async fn submit(&self, request: SubmissionRequest) -> Result<(), SubmitError> {
        let payload = serde_json::to_string(&request)
            .map_err(|err| SubmitError::Rejected(err.to_string()))?;
        info!(epoch = %request.epoch, attempt = request.attempt, %payload, "dry-run submission");
        Ok(())
    }
}

/// Hooks that only log.
pub struct LoggingHooks;

impl SessionHooks for LoggingHooks {
    fn on_exceeded_reports(&self) {
        info!("report quota exceeded");
    }

    fn on_exceeded_reports_dismissed(&self) {
        info!("report quota notice dismissed");
    }

    fn on_refetch_flips(&self, hashes: &[FlipHash]) {
        info!(?hashes, "flip refetch requested");
    }

    fn on_validation_succeeded(&self) {
        info!("validation succeeded");
    }

    fn on_validation_failed(&self, reason: FailureReason) {
        info!(%reason, "validation failed");
    }
}

pub fn logging_hooks() -> Arc<dyn SessionHooks> {
    Arc::new(LoggingHooks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use services::{Clock, ValidationSessionService};
    use storage::repository::{InMemoryRepository, ValidationStateRepository};
    use std::time::Duration;
    use validation_core::model::{AnswerOption, Epoch, FlipStatus};
    use validation_core::time::fixed_now;

    struct SlowSubmitter;

    #[async_trait]
    impl AnswerSubmitter for SlowSubmitter {
        async fn submit(&self, _request: SubmissionRequest) -> Result<(), SubmitError> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn script_waits_for_slow_submission() {
        let repo = InMemoryRepository::new();
        let service = ValidationSessionService::new(
            Clock::fixed(fixed_now()),
            Arc::new(repo.clone()),
            Arc::new(SlowSubmitter),
        );
        let fixture = SessionFixture {
            epoch: 9,
            coinbase: "0xabc".into(),
            credential: "key".into(),
            validation_start_ms: Some(fixed_now().timestamp_millis()),
            short_session_secs: 120,
            long_session_secs: 600,
            locale: None,
            short_flips: vec![
                Flip::new("a").with_status(FlipStatus::decoded()),
                Flip::new("b").with_status(FlipStatus::decoded()),
            ],
            long_flips: Vec::new(),
        };
        let (draft, short, long) = fixture.into_parts(0);
        let handle = service.start(draft.validate().unwrap(), short, long).await.unwrap();

        let script = vec![
            Event::Answer {
                hash: "a".into(),
                option: AnswerOption::Left,
            },
            Event::Answer {
                hash: "b".into(),
                option: AnswerOption::Right,
            },
            Event::Submit,
            Event::Submit,
        ];
        run_script(&handle, script).await.unwrap();

        let last = handle.shutdown().await;
        assert_eq!(last.state().path(), "validationSucceeded");
        let stored = repo.load_state(Epoch::new(9)).await.unwrap().unwrap();
        assert_eq!(stored.state_path, "validationSucceeded");
    }

    #[test]
    fn fixture_and_script_parse() {
        let fixture: SessionFixture = serde_json::from_str(
            r#"{
                "epoch": 3,
                "coinbase": "0xabc",
                "shortSessionSecs": 120,
                "longSessionSecs": 600,
                "shortFlips": [{"hash": "a", "status": {"decoded": true}}]
            }"#,
        )
        .unwrap();
        let (draft, short, long) = fixture.into_parts(1_000);
        assert_eq!(draft.validation_start_ms, 1_000);
        assert_eq!(short.len(), 1);
        assert!(short[0].is_decoded());
        assert!(long.is_empty());
        assert!(draft.validate().is_ok());

        let script: Vec<Event> = serde_json::from_str(
            r#"[{"type": "ANSWER", "hash": "a", "option": "Left"}, {"type": "SUBMIT"}]"#,
        )
        .unwrap();
        assert_eq!(script.len(), 2);
        assert_eq!(script[1], Event::Submit);
    }
}
