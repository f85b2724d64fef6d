//! Exact pairwise and groupwise predicates over subset codes.
//!
//! Every predicate is total and allocation-free: a handful of word operations
//! per call, no knowledge of the ground-set size required. The synthesizer
//! gates every constraint emission on these.

use crate::space::Subset;

/// Returns whether `a` is a subset of `b` (not necessarily proper).
#[inline(always)]
pub fn is_subset_of(a: Subset, b: Subset) -> bool {
    (a.bits() & !b.bits()) == 0
}

/// Returns whether `a` and `b` are comparable: one contains the other.
#[inline(always)]
pub fn comparable(a: Subset, b: Subset) -> bool {
    is_subset_of(a, b) || is_subset_of(b, a)
}

/// Returns whether the symmetric difference \(|A \triangle B|\) exceeds `d`.
#[inline(always)]
pub fn symmetric_difference_exceeds(a: Subset, b: Subset, d: u32) -> bool {
    (a.bits() ^ b.bits()).count_ones() > d
}

/// Returns whether `a` and `b` share no element.
#[inline(always)]
pub fn intersection_empty(a: Subset, b: Subset) -> bool {
    (a.bits() & b.bits()) == 0
}

/// Returns whether the members of `group` are pairwise disjoint.
///
/// One pass with a running union: summed position-wise, no position is hit
/// twice exactly when each member avoids the union of its predecessors.
pub fn pairwise_disjoint(group: &[Subset]) -> bool {
    let mut union = 0u64;
    for s in group {
        if s.bits() & union != 0 {
            return false;
        }
        union |= s.bits();
    }
    true
}

/// Returns whether `a` meets `mask` in at least `t` positions.
#[inline(always)]
pub fn meets_threshold(a: Subset, mask: u64, t: u32) -> bool {
    (a.bits() & mask).count_ones() >= t
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_xorshift::XorShiftRng;

    fn random_subset<R: Rng>(rng: &mut R, n: usize) -> Subset {
        Subset::from_bits(rng.random_range(0..(1u64 << n)))
    }

    // -------------------------------------------------------------------------
    // Subset order axioms
    // -------------------------------------------------------------------------

    #[test]
    fn subset_relation_is_a_partial_order() {
        let mut rng = XorShiftRng::seed_from_u64(0xAB1E);
        for _ in 0..2_000 {
            let a = random_subset(&mut rng, 10);
            let b = random_subset(&mut rng, 10);
            let c = random_subset(&mut rng, 10);

            assert!(is_subset_of(a, a), "reflexivity");
            if is_subset_of(a, b) && is_subset_of(b, a) {
                assert_eq!(a, b, "antisymmetry");
            }
            if is_subset_of(a, b) && is_subset_of(b, c) {
                assert!(is_subset_of(a, c), "transitivity");
            }
        }
    }

    #[test]
    fn empty_set_is_below_everything() {
        let mut rng = XorShiftRng::seed_from_u64(0xE);
        for _ in 0..200 {
            let a = random_subset(&mut rng, 12);
            assert!(is_subset_of(Subset::EMPTY, a));
            assert!(intersection_empty(Subset::EMPTY, a));
            assert!(comparable(Subset::EMPTY, a));
        }
    }

    // -------------------------------------------------------------------------
    // Symmetric difference
    // -------------------------------------------------------------------------

    #[test]
    fn symmetric_difference_is_symmetric_and_matches_weights() {
        let mut rng = XorShiftRng::seed_from_u64(0xD1FF);
        for _ in 0..2_000 {
            let a = random_subset(&mut rng, 14);
            let b = random_subset(&mut rng, 14);
            let dist = (a.bits() ^ b.bits()).count_ones();
            for d in 0..16 {
                assert_eq!(
                    symmetric_difference_exceeds(a, b, d),
                    dist > d,
                    "threshold {d}"
                );
                assert_eq!(
                    symmetric_difference_exceeds(a, b, d),
                    symmetric_difference_exceeds(b, a, d)
                );
            }
        }
    }

    #[test]
    fn disjoint_sets_have_additive_symmetric_difference() {
        let a = Subset::from_bits(0b1100);
        let b = Subset::from_bits(0b0011);
        assert!(intersection_empty(a, b));
        assert!(symmetric_difference_exceeds(a, b, 3));
        assert!(!symmetric_difference_exceeds(a, b, 4));
    }

    // -------------------------------------------------------------------------
    // Group disjointness
    // -------------------------------------------------------------------------

    #[test]
    fn group_disjointness_matches_all_pairs() {
        let mut rng = XorShiftRng::seed_from_u64(0x97091);
        for _ in 0..2_000 {
            let len = rng.random_range(0..6usize);
            let group: Vec<Subset> = (0..len).map(|_| random_subset(&mut rng, 8)).collect();

            let mut brute = true;
            for i in 0..group.len() {
                for j in (i + 1)..group.len() {
                    brute &= intersection_empty(group[i], group[j]);
                }
            }
            assert_eq!(pairwise_disjoint(&group), brute);
        }
    }

    #[test]
    fn duplicate_nonempty_members_are_not_disjoint() {
        let s = Subset::from_bits(0b10);
        assert!(!pairwise_disjoint(&[s, s]));
        // the empty set is disjoint even from itself
        assert!(pairwise_disjoint(&[Subset::EMPTY, Subset::EMPTY]));
    }

    // -------------------------------------------------------------------------
    // Threshold
    // -------------------------------------------------------------------------

    #[test]
    fn threshold_counts_mask_overlap() {
        let a = Subset::from_bits(0b1011);
        assert!(meets_threshold(a, 0b0011, 2));
        assert!(!meets_threshold(a, 0b0011, 3));
        assert!(meets_threshold(a, 0b1111, 3));
        assert!(meets_threshold(a, 0, 0));
        assert!(!meets_threshold(a, 0, 1));
    }
}
