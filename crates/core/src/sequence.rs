//! Derivation of the active flip sequence shown to the user.
//!
//! Nothing here is stored: sequences are recomputed from the flip lists on
//! demand, so the same lists always yield the same order, before and after a
//! reload.

use crate::model::Flip;

/// Flips that must be answered in the short session (spares excluded).
pub fn regular_flips(flips: &[Flip]) -> impl Iterator<Item = &Flip> {
    flips.iter().filter(|flip| !flip.is_extra())
}

/// Stable display order: decoded flips, then still loading, then failed.
///
/// Ties keep their original list position.
#[must_use]
pub fn rearrange_flips<'a>(flips: impl IntoIterator<Item = &'a Flip>) -> Vec<&'a Flip> {
    let mut ordered: Vec<&Flip> = flips.into_iter().collect();
    ordered.sort_by_key(|flip| display_rank(flip));
    ordered
}

fn display_rank(flip: &Flip) -> u8 {
    if flip.is_decoded() {
        0
    } else if flip.is_failed() {
        2
    } else {
        1
    }
}

/// Active sequence of the short session.
#[must_use]
pub fn short_sequence(short_flips: &[Flip]) -> Vec<&Flip> {
    rearrange_flips(regular_flips(short_flips))
}

/// Active sequence of the long session; missing flips drop out unless they decoded.
#[must_use]
pub fn long_sequence(long_flips: &[Flip]) -> Vec<&Flip> {
    rearrange_flips(
        long_flips
            .iter()
            .filter(|flip| flip.is_decoded() || !flip.is_missing()),
    )
}

/// Decoded subset of a sequence, as listed in review dialogs.
#[must_use]
pub fn solvable_flips<'a>(sequence: &[&'a Flip]) -> Vec<&'a Flip> {
    sequence
        .iter()
        .copied()
        .filter(|flip| flip.is_decoded())
        .collect()
}

/// Position of the first flip in `sequence` without an answer.
#[must_use]
pub fn first_unanswered_index(sequence: &[&Flip]) -> Option<usize> {
    sequence.iter().position(|flip| !flip.is_answered())
}

/// Position of the first keyword flip in `sequence` without a relevance mark.
#[must_use]
pub fn first_unmarked_index(sequence: &[&Flip]) -> Option<usize> {
    sequence
        .iter()
        .position(|flip| flip.is_keyword_flip() && flip.relevance().is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FlipStatus, Relevance};

    fn hashes(seq: &[&Flip]) -> Vec<String> {
        seq.iter().map(|f| f.hash().to_string()).collect()
    }

    fn loading(hash: &str) -> Flip {
        Flip::new(hash)
    }

    fn decoded(hash: &str) -> Flip {
        Flip::new(hash).with_status(FlipStatus::decoded())
    }

    fn failed(hash: &str) -> Flip {
        Flip::new(hash).with_status(FlipStatus::failed())
    }

    #[test]
    fn rearrange_puts_decoded_first_and_failed_last() {
        let flips = vec![failed("f1"), loading("l1"), decoded("d1"), decoded("d2"), loading("l2")];
        let ordered = rearrange_flips(&flips);
        assert_eq!(hashes(&ordered), vec!["d1", "d2", "l1", "l2", "f1"]);
    }

    #[test]
    fn rearrange_is_deterministic() {
        let flips = vec![loading("a"), decoded("b"), failed("c"), decoded("d")];
        assert_eq!(rearrange_flips(&flips), rearrange_flips(&flips));
    }

    #[test]
    fn short_sequence_skips_extra_flips() {
        let flips = vec![decoded("a"), decoded("spare").with_extra(true), decoded("b")];
        assert_eq!(hashes(&short_sequence(&flips)), vec!["a", "b"]);
    }

    #[test]
    fn long_sequence_drops_missing_unless_decoded() {
        let missing = Flip::new("gone").with_status(FlipStatus {
            missing: true,
            ..FlipStatus::default()
        });
        let recovered = Flip::new("back").with_status(FlipStatus {
            decoded: true,
            missing: true,
            ..FlipStatus::default()
        });
        let flips = vec![missing, recovered, loading("x")];
        assert_eq!(hashes(&long_sequence(&flips)), vec!["back", "x"]);
    }

    #[test]
    fn first_unmarked_ignores_flips_without_keywords() {
        let mut marked = decoded("m").with_words(vec![1, 2]);
        marked.set_relevance(Relevance::Relevant);
        let flips = vec![marked, decoded("plain"), decoded("k").with_words(vec![3])];
        let seq = rearrange_flips(&flips);
        assert_eq!(first_unmarked_index(&seq), Some(2));
    }
}
