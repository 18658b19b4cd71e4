//! BLoom-and-flIP (BLIP) hardening
//!
//! References:
//! - M. Alaggan, S. Gambs, A.M. Kermarrec, "BLIP: non-interactive
//!   differentially-private similarity computation on Bloom filters", 2012
//! - R. Schnell, C. Borgs, "Randomized response and balanced Bloom filters
//!   for privacy preserving record linkage", 2016
//!
//! Every bit is selected independently with probability p. A selected bit is
//! complemented (independent flip) or replaced by a fair coin (balanced flip).

use std::str::FromStr;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use super::bit_vector::BitVector;
use crate::error::LinkageError;

/// How a selected bit is randomized
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionMethod {
    /// Complement the bit (Alaggan et al.)
    IndependentFlip,
    /// Replace the bit with a fair coin (Schnell & Borgs)
    BalancedFlip,
}

impl SelectionMethod {
    pub fn name(&self) -> &'static str {
        match self {
            SelectionMethod::IndependentFlip => "independent-flip",
            SelectionMethod::BalancedFlip => "balanced-flip",
        }
    }
}

impl FromStr for SelectionMethod {
    type Err = LinkageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "independent-flip" | "ala" => Ok(SelectionMethod::IndependentFlip),
            "balanced-flip" | "sch" => Ok(SelectionMethod::BalancedFlip),
            other => Err(LinkageError::UnknownSelectionMethod(other.to_string())),
        }
    }
}

impl std::fmt::Display for SelectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Check a flip probability lies in [0, 1]
pub fn validate_flip_probability(p: f64) -> Result<(), LinkageError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(LinkageError::InvalidFlipProbability { p });
    }
    Ok(())
}

/// BLIP hardener owning its random generator
///
/// One instance corresponds to one hardening pass. Calls are intentionally
/// non-idempotent: hardening the same filter twice yields two independent
/// noisy releases.
#[derive(Debug)]
pub struct BlipHardener {
    method: SelectionMethod,
    flip_probability: f64,
    rng: ChaCha20Rng,
}

impl BlipHardener {
    /// Hardener seeded from OS entropy
    pub fn new(method: SelectionMethod, flip_probability: f64) -> Result<Self, LinkageError> {
        Self::with_rng(method, flip_probability, ChaCha20Rng::from_entropy())
    }

    /// Reproducible hardener on stream `stream` of `seed`
    pub fn with_seed(
        method: SelectionMethod,
        flip_probability: f64,
        seed: u64,
        stream: u64,
    ) -> Result<Self, LinkageError> {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        rng.set_stream(stream);
        Self::with_rng(method, flip_probability, rng)
    }

    fn with_rng(
        method: SelectionMethod,
        flip_probability: f64,
        rng: ChaCha20Rng,
    ) -> Result<Self, LinkageError> {
        validate_flip_probability(flip_probability)?;
        Ok(Self {
            method,
            flip_probability,
            rng,
        })
    }

    /// Harden a Bloom filter, leaving the input untouched
    pub fn harden(&mut self, bf: &BitVector) -> BitVector {
        let mut out = BitVector::zeros(bf.len());
        for (pos, bit) in bf.iter().enumerate() {
            let u: f64 = self.rng.gen();
            let new_bit = if u <= self.flip_probability {
                match self.method {
                    SelectionMethod::IndependentFlip => !bit,
                    SelectionMethod::BalancedFlip => self.rng.gen_bool(0.5),
                }
            } else {
                bit
            };
            if new_bit {
                out.set(pos, true);
            }
        }
        debug_assert_eq!(out.len(), bf.len());
        out
    }

    /// Expected fraction of bits whose value changes
    pub fn expected_change_rate(&self) -> f64 {
        match self.method {
            SelectionMethod::IndependentFlip => self.flip_probability,
            SelectionMethod::BalancedFlip => self.flip_probability / 2.0,
        }
    }

    pub fn method(&self) -> SelectionMethod {
        self.method
    }

    pub fn flip_probability(&self) -> f64 {
        self.flip_probability
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bf(len: usize) -> BitVector {
        BitVector::from_bools((0..len).map(|i| i % 3 == 0 || i % 7 == 0))
    }

    fn changed_bits(a: &BitVector, b: &BitVector) -> usize {
        a.iter().zip(b.iter()).filter(|(x, y)| x != y).count()
    }

    #[test]
    fn test_rejects_out_of_range_probability() {
        for p in [-0.1, 1.1, f64::NAN] {
            assert!(
                BlipHardener::new(SelectionMethod::BalancedFlip, p).is_err(),
                "p={} must be rejected",
                p
            );
        }
    }

    #[test]
    fn test_length_preserved_and_input_untouched() {
        let bf = sample_bf(1000);
        let copy = bf.clone();
        let mut hardener = BlipHardener::new(SelectionMethod::BalancedFlip, 0.3).unwrap();
        let hardened = hardener.harden(&bf);
        assert_eq!(hardened.len(), bf.len());
        assert_eq!(bf, copy, "harden must not modify its input");
    }

    #[test]
    fn test_independent_flip_p1_is_complement() {
        let bf = sample_bf(333);
        let mut hardener = BlipHardener::new(SelectionMethod::IndependentFlip, 1.0).unwrap();
        for _ in 0..5 {
            assert_eq!(hardener.harden(&bf), bf.complement());
        }
    }

    #[test]
    fn test_p0_is_identity() {
        let bf = sample_bf(500);
        for method in [SelectionMethod::IndependentFlip, SelectionMethod::BalancedFlip] {
            let mut hardener = BlipHardener::new(method, 0.0).unwrap();
            assert_eq!(hardener.harden(&bf), bf, "{} with p=0 must be identity", method);
        }
    }

    #[test]
    fn test_balanced_flip_changes_about_half_as_many_bits() {
        let bf = sample_bf(20_000);
        let mut ind = BlipHardener::with_seed(SelectionMethod::IndependentFlip, 0.2, 7, 0).unwrap();
        let mut bal = BlipHardener::with_seed(SelectionMethod::BalancedFlip, 0.2, 7, 1).unwrap();

        let ind_rate = changed_bits(&bf, &ind.harden(&bf)) as f64 / 20_000.0;
        let bal_rate = changed_bits(&bf, &bal.harden(&bf)) as f64 / 20_000.0;

        assert!((ind_rate - 0.2).abs() < 0.02, "independent rate {}", ind_rate);
        assert!((bal_rate - 0.1).abs() < 0.02, "balanced rate {}", bal_rate);
        assert_eq!(ind.expected_change_rate(), 0.2);
        assert_eq!(bal.expected_change_rate(), 0.1);
    }

    #[test]
    fn test_repeated_calls_differ() {
        let bf = sample_bf(1000);
        let mut hardener = BlipHardener::new(SelectionMethod::IndependentFlip, 0.5).unwrap();
        assert_ne!(hardener.harden(&bf), hardener.harden(&bf));
    }

    #[test]
    fn test_seeded_streams_reproducible_and_distinct() {
        let bf = sample_bf(1000);
        let run = |stream| {
            BlipHardener::with_seed(SelectionMethod::BalancedFlip, 0.5, 42, stream)
                .unwrap()
                .harden(&bf)
        };
        assert_eq!(run(3), run(3));
        assert_ne!(run(3), run(4));
    }

    #[test]
    fn test_parse_method_aliases() {
        assert_eq!(
            "ala".parse::<SelectionMethod>().unwrap(),
            SelectionMethod::IndependentFlip
        );
        assert_eq!(
            "balanced-flip".parse::<SelectionMethod>().unwrap(),
            SelectionMethod::BalancedFlip
        );
        assert!("flip".parse::<SelectionMethod>().is_err());
    }
}
