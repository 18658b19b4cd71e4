//! Records grouped by subset label
//!
//! INVARIANTS:
//! - An identifier appears at most once per label
//! - Records keep their insertion order within a label

use std::collections::{BTreeMap, HashMap, HashSet};

use rayon::prelude::*;

use super::encoder::RandomHashingEncoder;
use super::qgram::QGramSet;
use super::record::{Record, SubsetLabel};
use crate::error::LinkageError;

/// Number of characteristic subsets linked against the base pool
pub const CHARACTERISTIC_SUBSETS: usize = 12;

/// Loaded record table
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    subsets: BTreeMap<SubsetLabel, Vec<Record>>,
    ids: HashSet<(SubsetLabel, String)>,
    labels_by_id: HashMap<String, Vec<SubsetLabel>>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record under `label`
    ///
    /// A second record with the same identifier under the same label is a
    /// data-integrity violation.
    pub fn insert(&mut self, label: SubsetLabel, record: Record) -> Result<(), LinkageError> {
        let key = (label, record.id().to_string());
        if self.ids.contains(&key) {
            return Err(LinkageError::DuplicateRecord { id: key.1, label });
        }
        self.labels_by_id
            .entry(key.1.clone())
            .or_default()
            .push(label);
        self.ids.insert(key);
        self.subsets.entry(label).or_default().push(record);
        Ok(())
    }

    /// Records of `label`
    pub fn subset(&self, label: SubsetLabel) -> Result<&[Record], LinkageError> {
        self.subsets
            .get(&label)
            .map(Vec::as_slice)
            .ok_or(LinkageError::MissingSubset(label))
    }

    /// Labels present, in table order
    pub fn labels(&self) -> impl Iterator<Item = SubsetLabel> + '_ {
        self.subsets.keys().copied()
    }

    /// Total number of (label, record) entries
    pub fn len(&self) -> usize {
        self.subsets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of distinct identifiers across labels
    pub fn distinct_ids(&self) -> usize {
        self.labels_by_id.len()
    }

    /// Label combinations of identifiers that appear under several labels
    pub fn multi_label_counts(&self) -> BTreeMap<Vec<SubsetLabel>, usize> {
        let mut counts = BTreeMap::new();
        for labels in self.labels_by_id.values().filter(|labels| labels.len() > 1) {
            let mut combo = labels.clone();
            combo.sort();
            *counts.entry(combo).or_insert(0) += 1;
        }
        counts
    }

    /// All q-gram sets, for parameter derivation
    pub fn qgram_sets(&self) -> impl Iterator<Item = &QGramSet> + '_ {
        self.subsets
            .values()
            .flat_map(|records| records.iter().map(Record::qgrams))
    }

    /// Check that every label is present and, optionally, the total size
    pub fn validate(&self, expected_total: Option<usize>) -> Result<(), LinkageError> {
        for label in SubsetLabel::ALL {
            if !self.subsets.contains_key(&label) {
                return Err(LinkageError::MissingSubset(label));
            }
        }
        if let Some(expected) = expected_total {
            let actual = self.len();
            if actual != expected {
                return Err(LinkageError::RecordCountMismatch { expected, actual });
            }
        }
        Ok(())
    }

    /// Encode every record in parallel
    pub fn encode_all(&mut self, encoder: &RandomHashingEncoder) {
        for records in self.subsets.values_mut() {
            records.par_iter_mut().for_each(|record| record.encode(encoder));
        }
    }
}
