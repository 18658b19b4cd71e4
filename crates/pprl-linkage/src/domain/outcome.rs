//! Linkage outcomes and the result table
//!
//! INVARIANT: for a processed subset of size N, the four counters of each
//! variant sum to exactly N.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::record::SubsetLabel;
use crate::error::LinkageError;

/// Classification of one query record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Single best match, and it is the query itself
    OneToOneCorrect,
    /// Single best match, another record
    OneToOneWrong,
    /// Tied best matches including the query
    OneToManyCorrect,
    /// Tied best matches excluding the query
    OneToManyWrong,
}

impl Outcome {
    /// Classify from the set of maximal candidates
    ///
    /// `maximal` must be non-empty.
    pub fn classify<T: PartialEq>(query: &T, maximal: &[T]) -> Outcome {
        let found = maximal.contains(query);
        match (maximal.len() == 1, found) {
            (true, true) => Outcome::OneToOneCorrect,
            (true, false) => Outcome::OneToOneWrong,
            (false, true) => Outcome::OneToManyCorrect,
            (false, false) => Outcome::OneToManyWrong,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Outcome::OneToOneCorrect => "1-1-correct",
            Outcome::OneToOneWrong => "1-1-wrong",
            Outcome::OneToManyCorrect => "1-n-correct",
            Outcome::OneToManyWrong => "1-n-wrong",
        }
    }

    pub const ALL: [Outcome; 4] = [
        Outcome::OneToOneCorrect,
        Outcome::OneToOneWrong,
        Outcome::OneToManyCorrect,
        Outcome::OneToManyWrong,
    ];
}

/// Which vectors were compared
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimilarityVariant {
    /// Original Bloom filters
    Original,
    /// BLIP-hardened Bloom filters
    Hardened,
}

impl SimilarityVariant {
    pub fn column_prefix(&self) -> &'static str {
        match self {
            SimilarityVariant::Original => "og_bf_dice",
            SimilarityVariant::Hardened => "blip_bf_dice",
        }
    }

    pub const ALL: [SimilarityVariant; 2] =
        [SimilarityVariant::Original, SimilarityVariant::Hardened];
}

/// Outcome tallies for one (subset, variant)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounters {
    pub one_to_one_correct: u64,
    pub one_to_one_wrong: u64,
    pub one_to_many_correct: u64,
    pub one_to_many_wrong: u64,
}

impl OutcomeCounters {
    pub fn record(&mut self, outcome: Outcome) {
        *self.slot(outcome) += 1;
    }

    pub fn get(&self, outcome: Outcome) -> u64 {
        match outcome {
            Outcome::OneToOneCorrect => self.one_to_one_correct,
            Outcome::OneToOneWrong => self.one_to_one_wrong,
            Outcome::OneToManyCorrect => self.one_to_many_correct,
            Outcome::OneToManyWrong => self.one_to_many_wrong,
        }
    }

    pub fn total(&self) -> u64 {
        Outcome::ALL.iter().map(|o| self.get(*o)).sum()
    }

    /// Add another tally into this one
    pub fn merge(&mut self, other: &OutcomeCounters) {
        for outcome in Outcome::ALL {
            *self.slot(outcome) += other.get(outcome);
        }
    }

    fn slot(&mut self, outcome: Outcome) -> &mut u64 {
        match outcome {
            Outcome::OneToOneCorrect => &mut self.one_to_one_correct,
            Outcome::OneToOneWrong => &mut self.one_to_one_wrong,
            Outcome::OneToManyCorrect => &mut self.one_to_many_correct,
            Outcome::OneToManyWrong => &mut self.one_to_many_wrong,
        }
    }
}

/// Both variants' tallies for one subset
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsetOutcome {
    pub original: OutcomeCounters,
    pub hardened: OutcomeCounters,
}

impl SubsetOutcome {
    pub fn counters(&self, variant: SimilarityVariant) -> &OutcomeCounters {
        match variant {
            SimilarityVariant::Original => &self.original,
            SimilarityVariant::Hardened => &self.hardened,
        }
    }

    pub fn merge(&mut self, other: &SubsetOutcome) {
        self.original.merge(&other.original);
        self.hardened.merge(&other.hardened);
    }

    /// Check both variants account for every query
    pub fn verify_total(&self, label: SubsetLabel, expected: u64) -> Result<(), LinkageError> {
        for variant in SimilarityVariant::ALL {
            let total = self.counters(variant).total();
            if total != expected {
                return Err(LinkageError::OutcomeTotalMismatch {
                    label,
                    expected,
                    total,
                });
            }
        }
        Ok(())
    }
}

/// Result table: one row per linked subset
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkageReport {
    rows: BTreeMap<SubsetLabel, SubsetOutcome>,
}

impl LinkageReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a subset's tallies into the table
    pub fn insert(&mut self, label: SubsetLabel, outcome: SubsetOutcome) {
        self.rows.entry(label).or_default().merge(&outcome);
    }

    pub fn get(&self, label: SubsetLabel) -> Option<&SubsetOutcome> {
        self.rows.get(&label)
    }

    /// Rows in label order
    pub fn rows(&self) -> impl Iterator<Item = (SubsetLabel, &SubsetOutcome)> + '_ {
        self.rows.iter().map(|(label, outcome)| (*label, outcome))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header row column names
    pub fn header() -> Vec<String> {
        let mut columns = vec!["id".to_string()];
        for variant in SimilarityVariant::ALL {
            for outcome in Outcome::ALL {
                columns.push(format!("{}_{}", variant.column_prefix(), outcome.name()));
            }
        }
        columns
    }

    /// Render as delimited text with a header row
    pub fn to_delimited(&self, delimiter: char) -> String {
        let sep = delimiter.to_string();
        let mut out = Self::header().join(&sep);
        out.push('\n');
        for (label, outcome) in self.rows() {
            let mut fields = vec![label.tag().to_string()];
            for variant in SimilarityVariant::ALL {
                let counters = outcome.counters(variant);
                fields.extend(Outcome::ALL.iter().map(|o| counters.get(*o).to_string()));
            }
            out.push_str(&fields.join(&sep));
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_all_four_cases() {
        assert_eq!(Outcome::classify(&1, &[1]), Outcome::OneToOneCorrect);
        assert_eq!(Outcome::classify(&1, &[2]), Outcome::OneToOneWrong);
        assert_eq!(Outcome::classify(&1, &[2, 1]), Outcome::OneToManyCorrect);
        assert_eq!(Outcome::classify(&1, &[2, 3]), Outcome::OneToManyWrong);
    }

    #[test]
    fn test_counters_total_and_merge() {
        let mut a = OutcomeCounters::default();
        a.record(Outcome::OneToOneCorrect);
        a.record(Outcome::OneToOneCorrect);
        a.record(Outcome::OneToManyWrong);
        let mut b = OutcomeCounters::default();
        b.record(Outcome::OneToOneWrong);

        a.merge(&b);
        assert_eq!(a.total(), 4);
        assert_eq!(a.one_to_one_correct, 2);
        assert_eq!(a.one_to_one_wrong, 1);
    }

    #[test]
    fn test_verify_total() {
        let mut outcome = SubsetOutcome::default();
        outcome.original.record(Outcome::OneToOneCorrect);
        outcome.hardened.record(Outcome::OneToManyCorrect);
        assert!(outcome.verify_total(SubsetLabel::Random1, 1).is_ok());

        outcome.hardened.record(Outcome::OneToManyCorrect);
        assert!(matches!(
            outcome.verify_total(SubsetLabel::Random1, 1),
            Err(LinkageError::OutcomeTotalMismatch { total: 2, .. })
        ));
    }

    #[test]
    fn test_delimited_rendering() {
        let mut report = LinkageReport::new();
        let mut outcome = SubsetOutcome::default();
        outcome.original.one_to_one_correct = 990;
        outcome.original.one_to_many_correct = 10;
        outcome.hardened.one_to_one_correct = 700;
        outcome.hardened.one_to_one_wrong = 300;
        report.insert(SubsetLabel::Random2, outcome);
        report.insert(SubsetLabel::HighestFrequencyScore, SubsetOutcome::default());

        let text = report.to_delimited(',');
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "id,og_bf_dice_1-1-correct,og_bf_dice_1-1-wrong,og_bf_dice_1-n-correct,\
             og_bf_dice_1-n-wrong,blip_bf_dice_1-1-correct,blip_bf_dice_1-1-wrong,\
             blip_bf_dice_1-n-correct,blip_bf_dice_1-n-wrong"
        );
        assert_eq!(lines[1], "f_h,0,0,0,0,0,0,0,0", "rows follow label order");
        assert_eq!(lines[2], "r2,990,0,10,0,700,300,0,0");
    }
}
