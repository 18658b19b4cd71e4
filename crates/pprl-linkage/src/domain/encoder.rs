//! Random-hashing Bloom filter encoder
//!
//! Reference: Schnell & Borgs, "Randomized response and balanced Bloom
//! filters for privacy preserving record linkage", ICDM workshops 2016.
//!
//! Each q-gram (optionally salted) is digested; the digest seeds a private
//! generator which draws `k` positions in `[0, L)` with replacement.
//!
//! INVARIANTS:
//! - `encode` output length is always `L`
//! - Identical (hash function, L, k, q-grams, salt) give identical output
//! - Popcount is at most `|q-grams| * k`

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::bit_vector::BitVector;
use super::hash_functions::HashFunction;
use super::qgram::QGramSet;
use crate::error::LinkageError;

/// Positions each q-gram was hashed to
pub type QGramPositions = BTreeMap<String, BTreeSet<usize>>;

/// Bloom filter encoder using per-q-gram seeded random hashing
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomHashingEncoder {
    hash_function: HashFunction,
    /// Filter length (L)
    filter_len: usize,
    /// Positions drawn per q-gram (k)
    hash_count: usize,
}

impl RandomHashingEncoder {
    /// Create an encoder
    ///
    /// Fails if `filter_len <= 1` or `hash_count == 0`.
    pub fn new(
        hash_function: HashFunction,
        filter_len: usize,
        hash_count: usize,
    ) -> Result<Self, LinkageError> {
        if filter_len <= 1 {
            return Err(LinkageError::InvalidFilterLength { len: filter_len });
        }
        if hash_count == 0 {
            return Err(LinkageError::InvalidHashCount { k: hash_count });
        }
        Ok(Self {
            hash_function,
            filter_len,
            hash_count,
        })
    }

    /// Encode a q-gram set into a Bloom filter
    pub fn encode(&self, qgrams: &QGramSet, salt: Option<&str>) -> BitVector {
        let mut bf = BitVector::zeros(self.filter_len);
        for gram in qgrams.iter() {
            self.for_each_position(gram, salt, |pos| bf.set(pos, true));
        }
        bf
    }

    /// Encode and also report the positions of every q-gram
    ///
    /// Position sets are keyed by the unsalted q-gram and hold between 1 and
    /// `k` entries (draws may collide).
    pub fn encode_with_positions(
        &self,
        qgrams: &QGramSet,
        salt: Option<&str>,
    ) -> (BitVector, QGramPositions) {
        let mut bf = BitVector::zeros(self.filter_len);
        let mut positions = QGramPositions::new();
        for gram in qgrams.iter() {
            let entry = positions.entry(gram.to_string()).or_default();
            self.for_each_position(gram, salt, |pos| {
                bf.set(pos, true);
                entry.insert(pos);
            });
        }
        (bf, positions)
    }

    fn for_each_position<F: FnMut(usize)>(&self, gram: &str, salt: Option<&str>, mut f: F) {
        let mut rng = match salt {
            Some(salt) => {
                let mut salted = String::with_capacity(gram.len() + salt.len());
                salted.push_str(gram);
                salted.push_str(salt);
                self.hash_function.seeded_rng(salted.as_bytes())
            }
            None => self.hash_function.seeded_rng(gram.as_bytes()),
        };
        for _ in 0..self.hash_count {
            f(rng.gen_range(0..self.filter_len));
        }
    }

    pub fn hash_function(&self) -> HashFunction {
        self.hash_function
    }

    pub fn filter_len(&self) -> usize {
        self.filter_len
    }

    pub fn hash_count(&self) -> usize {
        self.hash_count
    }
}
