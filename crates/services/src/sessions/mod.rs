mod handle;
mod persist;
mod runtime;
mod service;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use handle::SessionHandle;
pub use service::{DEFAULT_TICK_INTERVAL, ValidationSessionService};
