//! Per-subset comparison pool
//!
//! The pool is the candidate side of the linkage: the subset's own records
//! merged with the base pool, shuffled, each member carrying the hardened
//! vector produced by the pool-wide hardening pass.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;

use super::bit_vector::BitVector;
use super::hardening::BlipHardener;
use super::record::{Record, SubsetLabel};
use crate::error::LinkageError;

/// One candidate of the pool
#[derive(Debug)]
pub struct PoolMember<'a> {
    pub record: &'a Record,
    /// Original vector of `record`
    pub original: &'a BitVector,
    /// Vector from the pool hardening pass
    pub hardened: BitVector,
}

/// Candidates for one subset: shuffle(subset ∪ base)
#[derive(Debug)]
pub struct ComparisonPool<'a> {
    label: SubsetLabel,
    members: Vec<PoolMember<'a>>,
    index_by_id: HashMap<&'a str, usize>,
}

impl<'a> ComparisonPool<'a> {
    /// Merge, shuffle and harden
    ///
    /// Fails if any record is not encoded, or if identifiers collide so that
    /// the pool would hold fewer than `|subset| + |base|` distinct records.
    pub fn build<R: Rng + ?Sized>(
        label: SubsetLabel,
        subset: &'a [Record],
        base: &'a [Record],
        shuffle_rng: &mut R,
        hardener: &mut BlipHardener,
    ) -> Result<Self, LinkageError> {
        let expected = subset.len() + base.len();

        let mut records: Vec<&'a Record> = subset.iter().chain(base.iter()).collect();
        records.shuffle(shuffle_rng);

        let mut index_by_id = HashMap::with_capacity(expected);
        let mut members = Vec::with_capacity(expected);
        for record in records {
            if index_by_id.contains_key(record.id()) {
                continue;
            }
            let original = record.original()?;
            index_by_id.insert(record.id(), members.len());
            members.push(PoolMember {
                record,
                original,
                hardened: hardener.harden(original),
            });
        }

        if members.len() != expected {
            return Err(LinkageError::PoolSizeMismatch {
                label,
                expected,
                actual: members.len(),
            });
        }

        Ok(Self {
            label,
            members,
            index_by_id,
        })
    }

    pub fn members(&self) -> &[PoolMember<'a>] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Pool position of the record with identifier `id`
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    /// Fail unless the pool holds exactly `expected` records
    pub fn expect_size(&self, expected: usize) -> Result<(), LinkageError> {
        if self.members.len() != expected {
            return Err(LinkageError::PoolSizeMismatch {
                label: self.label,
                expected,
                actual: self.members.len(),
            });
        }
        Ok(())
    }
}
