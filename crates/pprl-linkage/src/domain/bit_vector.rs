//! Fixed-length bit vector backing encoded and hardened Bloom filters
//!
//! INVARIANTS:
//! - Length never changes after construction
//! - Tail bits of the last storage word beyond `len()` are always zero, so
//!   word-level AND + popcount never count phantom bits

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

/// Bloom filter bit vector
///
/// Stored as `u64` words so that similarity computation runs one word at a
/// time instead of one bit at a time.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitVector {
    #[serde(with = "bitvec_serde")]
    bits: BitVec<u64, Lsb0>,
}

/// Serde support for BitVec
mod bitvec_serde {
    use bitvec::prelude::*;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(bits: &BitVec<u64, Lsb0>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let words: Vec<u64> = bits.as_raw_slice().to_vec();
        (words, bits.len()).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BitVec<u64, Lsb0>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (words, len): (Vec<u64>, usize) = Deserialize::deserialize(deserializer)?;
        if len > words.len() * 64 {
            return Err(serde::de::Error::custom("bit length exceeds stored words"));
        }
        let mut bits = BitVec::<u64, Lsb0>::from_vec(words);
        bits.truncate(len);
        // Re-zero the dead tail so the word-level popcount invariant holds.
        let mut clean = BitVec::<u64, Lsb0>::repeat(false, len);
        for index in bits.iter_ones() {
            clean.set(index, true);
        }
        Ok(clean)
    }
}

impl BitVector {
    /// All-zero vector of `len` bits
    pub fn zeros(len: usize) -> Self {
        Self {
            bits: BitVec::repeat(false, len),
        }
    }

    /// Build a vector from explicit bit values
    pub fn from_bools<I: IntoIterator<Item = bool>>(values: I) -> Self {
        let values: Vec<bool> = values.into_iter().collect();
        let mut out = Self::zeros(values.len());
        for (index, value) in values.into_iter().enumerate() {
            out.bits.set(index, value);
        }
        out
    }

    /// Length in bits
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Value of the bit at `index`
    ///
    /// # Panics
    /// Panics if `index >= len()`.
    pub fn get(&self, index: usize) -> bool {
        self.bits[index]
    }

    /// Set the bit at `index`
    ///
    /// # Panics
    /// Panics if `index >= len()`.
    pub fn set(&mut self, index: usize, value: bool) {
        self.bits.set(index, value);
    }

    /// Number of 1-bits
    pub fn count_ones(&self) -> usize {
        self.bits.count_ones()
    }

    /// Number of positions set in both vectors
    ///
    /// Word-parallel: one AND and one popcount per 64 bits.
    ///
    /// # Panics
    /// Panics if the vectors have different lengths.
    pub fn and_count_ones(&self, other: &BitVector) -> usize {
        assert_eq!(
            self.len(),
            other.len(),
            "Cannot intersect bit vectors of different lengths"
        );
        self.bits
            .as_raw_slice()
            .iter()
            .zip(other.bits.as_raw_slice())
            .map(|(a, b)| (a & b).count_ones() as usize)
            .sum()
    }

    /// Bitwise complement, keeping the tail invariant
    pub fn complement(&self) -> BitVector {
        let mut out = BitVector::zeros(self.len());
        for index in self.bits.iter_zeros() {
            out.bits.set(index, true);
        }
        out
    }

    /// Iterate over bit values in order
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().by_vals()
    }
}
