use crate::model::{Flip, FlipStatus, SessionParams, SessionParamsDraft};
use crate::time::fixed_now;

/// Epoch 7, 120s short session, 600s long session, starting at `fixed_now()`.
pub fn params() -> SessionParams {
    params_for_epoch(7)
}

pub fn params_for_epoch(epoch: u64) -> SessionParams {
    SessionParamsDraft {
        epoch,
        coinbase: "0xcoinbase".into(),
        credential: "key".into(),
        validation_start_ms: fixed_now().timestamp_millis(),
        short_session_secs: 120,
        long_session_secs: 600,
        locale: None,
    }
    .validate()
    .unwrap()
}

/// `count` decoded flips named `{prefix}0..`.
pub fn decoded_flips(prefix: &str, count: usize) -> Vec<Flip> {
    (0..count)
        .map(|i| Flip::new(format!("{prefix}{i}")).with_status(FlipStatus::decoded()))
        .collect()
}

/// Decoded flips that also carry keywords.
pub fn keyword_flips(prefix: &str, count: usize) -> Vec<Flip> {
    decoded_flips(prefix, count)
        .into_iter()
        .enumerate()
        .map(|(i, flip)| {
            let word = u32::try_from(i).unwrap_or_default();
            flip.with_words(vec![word * 2, word * 2 + 1])
        })
        .collect()
}
