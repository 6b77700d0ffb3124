use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::effect::FlipAnswer;
use super::event::Translations;
use super::state::SessionTier;
use crate::model::{Flip, FlipHash, SessionParams};
use crate::quota::reported_flips_count;
use crate::sequence::{long_sequence, regular_flips, short_sequence};

/// Mutable payload of the validation machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    params: SessionParams,
    short_flips: Vec<Flip>,
    long_flips: Vec<Flip>,
    current_index: usize,
    #[serde(default)]
    translations: Translations,
    reported_flips_count: usize,
    submit_attempts: u32,
}

impl SessionContext {
    /// Every hash is kept once: a repeated hash is dropped, whether it repeats
    /// within a list or appears in both lists.
    #[must_use]
    pub fn new(params: SessionParams, short_flips: Vec<Flip>, long_flips: Vec<Flip>) -> Self {
        let mut seen = HashSet::new();
        let short_flips = distinct_flips(short_flips, &mut seen);
        let long_flips = distinct_flips(long_flips, &mut seen);
        let reported = reported_flips_count(&long_flips);
        Self {
            params,
            short_flips,
            long_flips,
            current_index: 0,
            translations: Translations::new(),
            reported_flips_count: reported,
            submit_attempts: 0,
        }
    }

    #[must_use]
    pub fn params(&self) -> &SessionParams {
        &self.params
    }

    #[must_use]
    pub fn short_flips(&self) -> &[Flip] {
        &self.short_flips
    }

    #[must_use]
    pub fn long_flips(&self) -> &[Flip] {
        &self.long_flips
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn translations(&self) -> &Translations {
        &self.translations
    }

    #[must_use]
    pub fn reported_flips_count(&self) -> usize {
        self.reported_flips_count
    }

    /// Number of submission attempts started so far.
    #[must_use]
    pub fn submit_attempts(&self) -> u32 {
        self.submit_attempts
    }

    /// Active sequence of `tier`.
    #[must_use]
    pub fn sequence(&self, tier: SessionTier) -> Vec<&Flip> {
        match tier {
            SessionTier::Short => short_sequence(&self.short_flips),
            SessionTier::Long => long_sequence(&self.long_flips),
        }
    }

    /// Answers handed to the submitter for `tier`.
    #[must_use]
    pub fn submission_answers(&self, tier: SessionTier) -> Vec<FlipAnswer> {
        match tier {
            SessionTier::Short => regular_flips(&self.short_flips)
                .map(|flip| FlipAnswer {
                    hash: flip.hash().clone(),
                    option: flip.option(),
                    relevance: None,
                })
                .collect(),
            SessionTier::Long => self
                .long_flips
                .iter()
                .map(|flip| FlipAnswer {
                    hash: flip.hash().clone(),
                    option: flip.option(),
                    relevance: flip.relevance(),
                })
                .collect(),
        }
    }

    pub(crate) fn set_params(&mut self, params: SessionParams) {
        self.params = params;
    }

    pub(crate) fn set_current_index(&mut self, index: usize) {
        self.current_index = index;
    }

    pub(crate) fn set_translations(&mut self, translations: Translations) {
        self.translations = translations;
    }

    /// Keeps `current_index` inside the active sequence of `tier`.
    pub(crate) fn clamp_current_index(&mut self, tier: SessionTier) {
        let len = self.sequence(tier).len();
        self.current_index = self.current_index.min(len.saturating_sub(1));
    }

    pub(crate) fn next_attempt(&mut self) -> u32 {
        self.submit_attempts = self.submit_attempts.saturating_add(1);
        self.submit_attempts
    }

    pub(crate) fn tier_flips_mut(&mut self, tier: SessionTier) -> &mut Vec<Flip> {
        match tier {
            SessionTier::Short => &mut self.short_flips,
            SessionTier::Long => &mut self.long_flips,
        }
    }

    /// Flip with `hash` in either list.
    pub(crate) fn flip_mut(&mut self, hash: &FlipHash) -> Option<&mut Flip> {
        self.short_flips
            .iter_mut()
            .chain(self.long_flips.iter_mut())
            .find(|flip| flip.hash() == hash)
    }

    pub(crate) fn long_flip_mut(&mut self, hash: &FlipHash) -> Option<&mut Flip> {
        self.long_flips.iter_mut().find(|flip| flip.hash() == hash)
    }

    pub(crate) fn recount_reports(&mut self) {
        self.reported_flips_count = reported_flips_count(&self.long_flips);
    }
}

fn distinct_flips(flips: Vec<Flip>, seen: &mut HashSet<FlipHash>) -> Vec<Flip> {
    flips
        .into_iter()
        .filter(|flip| seen.insert(flip.hash().clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::test_support::params;
    use crate::model::{AnswerOption, FlipStatus, Relevance};

    #[test]
    fn short_submission_excludes_extra_flips() {
        let mut short = vec![
            Flip::new("a").with_status(FlipStatus::decoded()),
            Flip::new("spare").with_extra(true),
        ];
        short[0].set_option(AnswerOption::Right);
        let ctx = SessionContext::new(params(), short, Vec::new());

        let answers = ctx.submission_answers(SessionTier::Short);
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].hash, FlipHash::new("a"));
        assert_eq!(answers[0].option, Some(AnswerOption::Right));
        assert_eq!(answers[0].relevance, None);
    }

    #[test]
    fn long_submission_carries_relevance() {
        let mut long = vec![Flip::new("a"), Flip::new("b")];
        long[1].set_relevance(Relevance::Irrelevant);
        let ctx = SessionContext::new(params(), Vec::new(), long);

        let answers = ctx.submission_answers(SessionTier::Long);
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[1].relevance, Some(Relevance::Irrelevant));
        assert_eq!(ctx.reported_flips_count(), 1);
    }

    #[test]
    fn repeated_hashes_are_kept_once() {
        let short = vec![Flip::new("a"), Flip::new("b"), Flip::new("a")];
        let long = vec![Flip::new("b"), Flip::new("c")];
        let mut ctx = SessionContext::new(params(), short, long);

        let short: Vec<&str> = ctx.short_flips().iter().map(|f| f.hash().as_str()).collect();
        let long: Vec<&str> = ctx.long_flips().iter().map(|f| f.hash().as_str()).collect();
        assert_eq!(short, vec!["a", "b"]);
        assert_eq!(long, vec!["c"]);

        ctx.flip_mut(&FlipHash::new("b"))
            .unwrap()
            .set_option(AnswerOption::Left);
        assert_eq!(ctx.short_flips()[1].option(), Some(AnswerOption::Left));
    }

    #[test]
    fn clamp_handles_empty_sequence() {
        let mut ctx = SessionContext::new(params(), Vec::new(), Vec::new());
        ctx.set_current_index(4);
        ctx.clamp_current_index(SessionTier::Short);
        assert_eq!(ctx.current_index(), 0);
    }

    #[test]
    fn attempts_increase_monotonically() {
        let mut ctx = SessionContext::new(params(), Vec::new(), Vec::new());
        assert_eq!(ctx.next_attempt(), 1);
        assert_eq!(ctx.next_attempt(), 2);
        assert_eq!(ctx.submit_attempts(), 2);
    }
}
