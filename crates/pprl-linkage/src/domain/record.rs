//! Records, subset labels and the record lifecycle
//!
//! A record moves `Raw -> Encoded -> Hardened`. The hardened state is
//! produced per hardening pass, so the same source record can exist in
//! several hardened copies at once.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::bit_vector::BitVector;
use super::encoder::RandomHashingEncoder;
use super::hardening::BlipHardener;
use super::qgram::QGramSet;
use crate::error::LinkageError;

/// Provenance of a record: one of the twelve characteristic subsets or the
/// base pool
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SubsetLabel {
    #[serde(rename = "f_h")]
    HighestFrequencyScore,
    #[serde(rename = "f_l")]
    LowestFrequencyScore,
    #[serde(rename = "f_a")]
    AverageFrequencyScore,
    #[serde(rename = "q_f")]
    MostFrequentQGram,
    #[serde(rename = "q_r")]
    RarestQGram,
    #[serde(rename = "q_a")]
    AverageFrequencyQGram,
    #[serde(rename = "l_h")]
    LongestQGramSet,
    #[serde(rename = "l_s")]
    ShortestQGramSet,
    #[serde(rename = "l_a")]
    AverageLengthQGramSet,
    #[serde(rename = "r1")]
    Random1,
    #[serde(rename = "r2")]
    Random2,
    #[serde(rename = "r3")]
    Random3,
    #[serde(rename = "b")]
    Base,
}

impl SubsetLabel {
    /// All labels in table order
    pub const ALL: [SubsetLabel; 13] = [
        SubsetLabel::HighestFrequencyScore,
        SubsetLabel::LowestFrequencyScore,
        SubsetLabel::AverageFrequencyScore,
        SubsetLabel::MostFrequentQGram,
        SubsetLabel::RarestQGram,
        SubsetLabel::AverageFrequencyQGram,
        SubsetLabel::LongestQGramSet,
        SubsetLabel::ShortestQGramSet,
        SubsetLabel::AverageLengthQGramSet,
        SubsetLabel::Random1,
        SubsetLabel::Random2,
        SubsetLabel::Random3,
        SubsetLabel::Base,
    ];

    /// Tag used in the record table
    pub fn tag(&self) -> &'static str {
        match self {
            SubsetLabel::HighestFrequencyScore => "f_h",
            SubsetLabel::LowestFrequencyScore => "f_l",
            SubsetLabel::AverageFrequencyScore => "f_a",
            SubsetLabel::MostFrequentQGram => "q_f",
            SubsetLabel::RarestQGram => "q_r",
            SubsetLabel::AverageFrequencyQGram => "q_a",
            SubsetLabel::LongestQGramSet => "l_h",
            SubsetLabel::ShortestQGramSet => "l_s",
            SubsetLabel::AverageLengthQGramSet => "l_a",
            SubsetLabel::Random1 => "r1",
            SubsetLabel::Random2 => "r2",
            SubsetLabel::Random3 => "r3",
            SubsetLabel::Base => "b",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SubsetLabel::HighestFrequencyScore => "highest weighted frequency scores",
            SubsetLabel::LowestFrequencyScore => "lowest weighted frequency scores",
            SubsetLabel::AverageFrequencyScore => "closest to average weighted frequency score",
            SubsetLabel::MostFrequentQGram => "containing the most frequent q-gram",
            SubsetLabel::RarestQGram => "containing the least frequent q-gram",
            SubsetLabel::AverageFrequencyQGram => "containing q-grams of average frequency",
            SubsetLabel::LongestQGramSet => "longest q-gram sets",
            SubsetLabel::ShortestQGramSet => "shortest q-gram sets",
            SubsetLabel::AverageLengthQGramSet => "closest to average q-gram set length",
            SubsetLabel::Random1 => "random sample 1",
            SubsetLabel::Random2 => "random sample 2",
            SubsetLabel::Random3 => "random sample 3",
            SubsetLabel::Base => "base pool",
        }
    }

    pub fn is_base(&self) -> bool {
        matches!(self, SubsetLabel::Base)
    }

    /// Position in [`SubsetLabel::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// The twelve labels that are linked against the base pool
    pub fn characteristic() -> impl Iterator<Item = SubsetLabel> {
        Self::ALL.into_iter().filter(|label| !label.is_base())
    }
}

impl FromStr for SubsetLabel {
    type Err = LinkageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|label| label.tag() == s)
            .ok_or_else(|| LinkageError::UnknownSubsetLabel(s.to_string()))
    }
}

impl std::fmt::Display for SubsetLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Lifecycle state of a record's bit vectors
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordState {
    Raw,
    Encoded {
        original: BitVector,
    },
    Hardened {
        original: BitVector,
        hardened: BitVector,
    },
}

/// A record of one subset
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    id: String,
    qgrams: QGramSet,
    state: RecordState,
}

impl Record {
    /// New record in the `Raw` state
    pub fn new(id: impl Into<String>, qgrams: QGramSet) -> Self {
        Self {
            id: id.into(),
            qgrams,
            state: RecordState::Raw,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn qgrams(&self) -> &QGramSet {
        &self.qgrams
    }

    pub fn state(&self) -> &RecordState {
        &self.state
    }

    /// Encode the q-gram set, moving the record to `Encoded`
    ///
    /// Re-encoding discards any hardened vector.
    pub fn encode(&mut self, encoder: &RandomHashingEncoder) {
        self.state = RecordState::Encoded {
            original: encoder.encode(&self.qgrams, None),
        };
    }

    /// Original Bloom filter
    pub fn original(&self) -> Result<&BitVector, LinkageError> {
        match &self.state {
            RecordState::Encoded { original } | RecordState::Hardened { original, .. } => {
                Ok(original)
            }
            RecordState::Raw => Err(self.missing("original bit vector")),
        }
    }

    /// Hardened Bloom filter
    pub fn hardened(&self) -> Result<&BitVector, LinkageError> {
        match &self.state {
            RecordState::Hardened { hardened, .. } => Ok(hardened),
            _ => Err(self.missing("hardened bit vector")),
        }
    }

    /// Copy of this record hardened by `hardener`
    ///
    /// Fails if the record has not been encoded.
    pub fn harden_with(&self, hardener: &mut BlipHardener) -> Result<Record, LinkageError> {
        let original = self.original()?.clone();
        let hardened = hardener.harden(&original);
        Ok(Record {
            id: self.id.clone(),
            qgrams: self.qgrams.clone(),
            state: RecordState::Hardened { original, hardened },
        })
    }

    /// Fail unless the record carries both bit vectors
    ///
    /// An empty q-gram set is complete: it encodes to an all-zero filter.
    pub fn require_complete(&self) -> Result<(), LinkageError> {
        self.original()?;
        self.hardened()?;
        Ok(())
    }

    fn missing(&self, field: &'static str) -> LinkageError {
        LinkageError::MissingField {
            record: self.id.clone(),
            field,
        }
    }
}
