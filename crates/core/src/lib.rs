#![forbid(unsafe_code)]

pub mod deadline;
pub mod error;
pub mod machine;
pub mod model;
pub mod quota;
pub mod sequence;
pub mod time;

pub use error::RestoreError;
pub use time::Clock;
