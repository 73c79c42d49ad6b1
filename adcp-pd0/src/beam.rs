//! PD0 ↔ canonical beam-index permutation (SPEC_FULL.md §4.4.4).
//!
//! `canonical[i] = pd0[DECODE_PERM[i]]` and its inverse `pd0[i] = canonical[ENCODE_PERM[i]]`.
//! Both arrays are derived from, and checked against, scenario S1 (SPEC_FULL.md §8) rather than
//! the raw prose table, since the table's "PD0 beam N -> Canonical beam M" phrasing and the
//! worked example disagree on direction unless read as a gather indexed by the destination.

/// `canonical[i] = pd0[DECODE_PERM[i]]`. Applies to velocity (Beam/Ship/Earth transforms),
/// correlation, echo intensity, percent good, and bottom-track per-beam scalars.
pub const DECODE_PERM: [usize; 4] = [3, 2, 0, 1];

/// `pd0[i] = canonical[ENCODE_PERM[i]]`, the inverse gather of [`DECODE_PERM`].
pub const ENCODE_PERM: [usize; 4] = [2, 3, 1, 0];

/// Range uses its own mapping per §4.4.4 ("Range, however, uses its own mapping"). Numerically
/// this coincides with [`DECODE_PERM`] once both are read as the same destination-indexed
/// gather, but it is kept as a separately named constant so the two concerns can diverge without
/// a silent, hard-to-spot shared-array bug if either is revised.
pub const RANGE_DECODE_PERM: [usize; 4] = [3, 2, 0, 1];
pub const RANGE_ENCODE_PERM: [usize; 4] = [2, 3, 1, 0];

pub fn permute_decode<T: Copy>(pd0: [T; 4], perm: [usize; 4]) -> [T; 4] {
    [pd0[perm[0]], pd0[perm[1]], pd0[perm[2]], pd0[perm[3]]]
}

pub fn permute_encode<T: Copy>(canonical: [T; 4], perm: [usize; 4]) -> [T; 4] {
    [
        canonical[perm[0]],
        canonical[perm[1]],
        canonical[perm[2]],
        canonical[perm[3]],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s1_earth_velocity_permutation() {
        let pd0_mm_per_s = [100i32, 200, -50, 0];
        let canonical = permute_decode(pd0_mm_per_s, DECODE_PERM);
        assert_eq!(canonical, [0, -50, 100, 200]);
    }

    #[test]
    fn encode_perm_is_inverse_of_decode_perm() {
        let canonical = [10i32, 20, 30, 40];
        let pd0 = permute_encode(canonical, ENCODE_PERM);
        let round_tripped = permute_decode(pd0, DECODE_PERM);
        assert_eq!(round_tripped, canonical);
    }
}
