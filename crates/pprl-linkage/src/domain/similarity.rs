//! Dice coefficient over Bloom filters
//!
//! Dice(A, B) = 2 * |A AND B| / (|A| + |B|), defined as 0 when both vectors
//! are all-zero.
//!
//! Scores are exact rationals so that maximum search and tie detection never
//! depend on floating point rounding.

use std::cmp::Ordering;

use super::bit_vector::BitVector;

/// Exact Dice score `numerator / denominator`
#[derive(Clone, Copy, Debug)]
pub struct DiceScore {
    numerator: u64,
    denominator: u64,
}

impl DiceScore {
    /// Score of two all-zero vectors
    pub const ZERO: DiceScore = DiceScore {
        numerator: 0,
        denominator: 1,
    };

    /// Build from popcounts
    pub fn from_counts(common: usize, ones_a: usize, ones_b: usize) -> Self {
        let denominator = (ones_a + ones_b) as u64;
        if denominator == 0 {
            return Self::ZERO;
        }
        Self {
            numerator: 2 * common as u64,
            denominator,
        }
    }

    /// Floating point value in [0, 1]
    pub fn value(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }
}

impl PartialEq for DiceScore {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DiceScore {}

impl PartialOrd for DiceScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DiceScore {
    fn cmp(&self, other: &Self) -> Ordering {
        // Denominators are positive, so cross-multiplication preserves order.
        let lhs = self.numerator as u128 * other.denominator as u128;
        let rhs = other.numerator as u128 * self.denominator as u128;
        lhs.cmp(&rhs)
    }
}

/// Exact Dice score of two equal-length vectors
///
/// # Panics
/// Panics if the vectors have different lengths.
pub fn dice_score(a: &BitVector, b: &BitVector) -> DiceScore {
    DiceScore::from_counts(a.and_count_ones(b), a.count_ones(), b.count_ones())
}

/// Dice coefficient as `f64`
pub fn dice_coefficient(a: &BitVector, b: &BitVector) -> f64 {
    dice_score(a, b).value()
}
