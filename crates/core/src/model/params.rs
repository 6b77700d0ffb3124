use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::ids::Epoch;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionParamsError {
    #[error("coinbase address cannot be empty")]
    EmptyCoinbase,

    #[error("validation start is not a valid timestamp: {0}")]
    InvalidValidationStart(i64),

    #[error("short session duration must be > 0")]
    InvalidShortSessionDuration,

    #[error("long session duration must be > 0")]
    InvalidLongSessionDuration,
}

//
// ─── CREDENTIAL ────────────────────────────────────────────────────────────────
//

/// Opaque signing credential handed to the answer submitter.
///
/// Never inspected by the machine and never serialized.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialHandle(String);

impl CredentialHandle {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CredentialHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialHandle(<redacted>)")
    }
}

//
// ─── TIMING ────────────────────────────────────────────────────────────────────
//

/// Wall-clock window of a validation ceremony.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTiming {
    validation_start: DateTime<Utc>,
    short_session_secs: u32,
    long_session_secs: u32,
}

impl SessionTiming {
    /// # Errors
    ///
    /// Returns `SessionParamsError` if either duration is zero.
    pub fn new(
        validation_start: DateTime<Utc>,
        short_session_secs: u32,
        long_session_secs: u32,
    ) -> Result<Self, SessionParamsError> {
        if short_session_secs == 0 {
            return Err(SessionParamsError::InvalidShortSessionDuration);
        }
        if long_session_secs == 0 {
            return Err(SessionParamsError::InvalidLongSessionDuration);
        }
        Ok(Self {
            validation_start,
            short_session_secs,
            long_session_secs,
        })
    }

    #[must_use]
    pub fn validation_start(&self) -> DateTime<Utc> {
        self.validation_start
    }

    #[must_use]
    pub fn short_session(&self) -> Duration {
        Duration::seconds(i64::from(self.short_session_secs))
    }

    #[must_use]
    pub fn long_session(&self) -> Duration {
        Duration::seconds(i64::from(self.long_session_secs))
    }
}

//
// ─── PARAMS ────────────────────────────────────────────────────────────────────
//

/// Immutable parameters captured when a session is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionParams {
    epoch: Epoch,
    coinbase: String,
    timing: SessionTiming,
    locale: String,
    #[serde(skip)]
    credential: CredentialHandle,
}

/// Raw construction input, as handed over by the node/auth layer.
#[derive(Debug, Clone, Default)]
pub struct SessionParamsDraft {
    pub epoch: u64,
    pub coinbase: String,
    pub credential: String,
    /// Epoch milliseconds.
    pub validation_start_ms: i64,
    pub short_session_secs: u32,
    pub long_session_secs: u32,
    pub locale: Option<String>,
}

impl SessionParamsDraft {
    /// Validate and normalize the draft into session parameters.
    ///
    /// # Errors
    ///
    /// Returns `SessionParamsError` if the coinbase is blank, the start timestamp
    /// is out of range, or a duration is zero.
    pub fn validate(self) -> Result<SessionParams, SessionParamsError> {
        let coinbase = self.coinbase.trim().to_string();
        if coinbase.is_empty() {
            return Err(SessionParamsError::EmptyCoinbase);
        }
        let validation_start = DateTime::<Utc>::from_timestamp_millis(self.validation_start_ms)
            .ok_or(SessionParamsError::InvalidValidationStart(
                self.validation_start_ms,
            ))?;
        let timing = SessionTiming::new(
            validation_start,
            self.short_session_secs,
            self.long_session_secs,
        )?;
        let locale = self
            .locale
            .map(|val| val.trim().to_string())
            .filter(|val| !val.is_empty())
            .unwrap_or_else(|| DEFAULT_LOCALE.to_string());

        Ok(SessionParams {
            epoch: Epoch::new(self.epoch),
            coinbase,
            timing,
            locale,
            credential: CredentialHandle::new(self.credential),
        })
    }
}

pub const DEFAULT_LOCALE: &str = "en";

impl SessionParams {
    #[must_use]
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    #[must_use]
    pub fn coinbase(&self) -> &str {
        &self.coinbase
    }

    #[must_use]
    pub fn timing(&self) -> SessionTiming {
        self.timing
    }

    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    #[must_use]
    pub fn credential(&self) -> &CredentialHandle {
        &self.credential
    }
}
