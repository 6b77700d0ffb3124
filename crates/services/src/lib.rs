#![forbid(unsafe_code)]

pub mod error;
pub mod hooks;
pub mod sessions;
pub mod submission;

pub use validation_core::Clock;
pub use sessions as session;

pub use error::{SessionError, SubmitError};
pub use hooks::{NoopHooks, SessionHooks};
pub use sessions::{DEFAULT_TICK_INTERVAL, SessionHandle, ValidationSessionService};
pub use submission::{AnswerSubmitter, SubmissionRequest};
