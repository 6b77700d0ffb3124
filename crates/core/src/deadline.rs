//! Wall-clock phase computation for a validation session.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::model::SessionTiming;

/// Which window of the ceremony is open at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SessionPhase {
    ShortSession,
    LongSession,
    /// Both windows have elapsed.
    Closed,
}

/// Decides the active phase from the session timing and the current time.
///
/// The short window is `[start, start + short)`, the long window is
/// `[start + short, start + short + long)`. Instants before `start` count as
/// short session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineClock {
    timing: SessionTiming,
}

impl DeadlineClock {
    #[must_use]
    pub fn new(timing: SessionTiming) -> Self {
        Self { timing }
    }

    #[must_use]
    pub fn short_session_ends_at(&self) -> DateTime<Utc> {
        self.timing.validation_start() + self.timing.short_session()
    }

    #[must_use]
    pub fn long_session_ends_at(&self) -> DateTime<Utc> {
        self.short_session_ends_at() + self.timing.long_session()
    }

    #[must_use]
    pub fn phase_at(&self, now: DateTime<Utc>) -> SessionPhase {
        if now < self.short_session_ends_at() {
            SessionPhase::ShortSession
        } else if now < self.long_session_ends_at() {
            SessionPhase::LongSession
        } else {
            SessionPhase::Closed
        }
    }

    /// Time left in the phase open at `now`; zero once both windows closed.
    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        let ends_at = match self.phase_at(now) {
            SessionPhase::ShortSession => self.short_session_ends_at(),
            SessionPhase::LongSession => self.long_session_ends_at(),
            SessionPhase::Closed => return Duration::zero(),
        };
        ends_at - now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn clock() -> DeadlineClock {
        DeadlineClock::new(SessionTiming::new(fixed_now(), 120, 600).unwrap())
    }

    #[test]
    fn phases_follow_window_boundaries() {
        let clock = clock();
        let start = fixed_now();

        assert_eq!(clock.phase_at(start - Duration::seconds(5)), SessionPhase::ShortSession);
        assert_eq!(clock.phase_at(start), SessionPhase::ShortSession);
        assert_eq!(
            clock.phase_at(start + Duration::seconds(119)),
            SessionPhase::ShortSession
        );
        assert_eq!(
            clock.phase_at(start + Duration::seconds(120)),
            SessionPhase::LongSession
        );
        assert_eq!(
            clock.phase_at(start + Duration::seconds(719)),
            SessionPhase::LongSession
        );
        assert_eq!(clock.phase_at(start + Duration::seconds(720)), SessionPhase::Closed);
    }

    #[test]
    fn remaining_counts_down_per_phase() {
        let clock = clock();
        let start = fixed_now();

        assert_eq!(clock.remaining(start + Duration::seconds(20)), Duration::seconds(100));
        assert_eq!(clock.remaining(start + Duration::seconds(120)), Duration::seconds(600));
        assert_eq!(clock.remaining(start + Duration::hours(2)), Duration::zero());
    }
}
