// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Winner-take-k selection, shared by both connectome variants.

use rayon::prelude::*;

/// A scored candidate for the winner set.
///
/// `Established(v)` is a concrete neuron index (every neuron in the non-lazy
/// variant; the visited set in the lazy variant). `Fresh(j)` is the j-th
/// aggregate draw for a never-visited candidate — it receives a concrete
/// index only if it wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CandidateSlot {
    Established(u32),
    Fresh(usize),
}

/// Candidate counts above this sort in parallel. The comparator is a total
/// order, so the unstable parallel sort is deterministic.
const PARALLEL_SORT_THRESHOLD: usize = 1 << 14;

/// Select the `k` highest-scoring candidates.
///
/// Ordering: score descending; at equal score the lowest established neuron
/// index wins, established candidates outrank fresh ones, and fresh
/// candidates rank among themselves by draw order. Zero-score candidates are
/// admitted only when fewer than `k` candidates score positive, which the
/// plain top-k cut gives for free.
pub(crate) fn take_top_k(
    mut candidates: Vec<(CandidateSlot, f64)>,
    k: usize,
) -> Vec<(CandidateSlot, f64)> {
    let compare = |a: &(CandidateSlot, f64), b: &(CandidateSlot, f64)| {
        b.1.total_cmp(&a.1).then_with(|| slot_order(a.0, b.0))
    };
    if candidates.len() >= PARALLEL_SORT_THRESHOLD {
        candidates.par_sort_unstable_by(compare);
    } else {
        candidates.sort_unstable_by(compare);
    }
    candidates.truncate(k);
    candidates
}

fn slot_order(a: CandidateSlot, b: CandidateSlot) -> core::cmp::Ordering {
    use CandidateSlot::{Established, Fresh};
    match (a, b) {
        (Established(i), Established(j)) => i.cmp(&j),
        (Established(_), Fresh(_)) => core::cmp::Ordering::Less,
        (Fresh(_), Established(_)) => core::cmp::Ordering::Greater,
        (Fresh(i), Fresh(j)) => i.cmp(&j),
    }
}

#[cfg(test)]
mod tests {
    use super::CandidateSlot::{Established, Fresh};
    use super::*;

    #[test]
    fn picks_highest_scores() {
        let winners = take_top_k(
            vec![
                (Established(0), 1.0),
                (Established(1), 5.0),
                (Established(2), 3.0),
                (Established(3), 4.0),
            ],
            2,
        );
        assert_eq!(winners[0].0, Established(1));
        assert_eq!(winners[1].0, Established(3));
    }

    #[test]
    fn ties_break_to_lowest_index() {
        let winners = take_top_k(
            vec![
                (Established(9), 2.0),
                (Established(3), 2.0),
                (Established(7), 2.0),
            ],
            2,
        );
        assert_eq!(winners[0].0, Established(3));
        assert_eq!(winners[1].0, Established(7));
    }

    #[test]
    fn established_outranks_fresh_at_equal_score() {
        let winners = take_top_k(
            vec![(Fresh(0), 2.0), (Established(5), 2.0), (Fresh(1), 2.0)],
            2,
        );
        assert_eq!(winners[0].0, Established(5));
        assert_eq!(winners[1].0, Fresh(0));
    }

    #[test]
    fn zero_scores_fill_only_remaining_slots() {
        let winners = take_top_k(
            vec![
                (Established(0), 0.0),
                (Established(1), 1.0),
                (Established(2), 0.0),
            ],
            2,
        );
        assert_eq!(winners[0].0, Established(1));
        assert_eq!(winners[1].0, Established(0));
    }
}
