mod flip;
mod ids;
mod params;

pub use ids::{Epoch, FlipHash};

pub use flip::{AnswerOption, Flip, FlipStatus, Relevance};
pub use params::{
    CredentialHandle, DEFAULT_LOCALE, SessionParams, SessionParamsDraft, SessionParamsError,
    SessionTiming,
};
