//! Report quota policy for keyword qualification.

use crate::model::{Flip, Relevance};

/// One report is allowed per this many long-session flips.
pub const FLIPS_PER_REPORT: usize = 3;

/// Maximum number of long flips that may carry `Relevance::Irrelevant` at once.
///
/// Monotonic in the flip count and never negative.
#[must_use]
pub fn available_reports_number(long_flips: &[Flip]) -> usize {
    long_flips.len() / FLIPS_PER_REPORT
}

/// Number of long flips currently marked as reported.
#[must_use]
pub fn reported_flips_count(long_flips: &[Flip]) -> usize {
    long_flips
        .iter()
        .filter(|flip| flip.relevance() == Some(Relevance::Irrelevant))
        .count()
}
