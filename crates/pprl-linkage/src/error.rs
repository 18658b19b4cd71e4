//! Error types for the linkage pipeline
//!
//! Every failure is fatal: the pipeline is an offline validation tool and
//! never produces partial or degraded output.

use thiserror::Error;

use crate::domain::SubsetLabel;

/// Broad classification of a [`LinkageError`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed input or configuration
    PreconditionViolation,
    /// Input that parses but contradicts the dataset invariants
    DataIntegrityViolation,
    /// Reading the record table or writing the report failed
    Io,
}

/// Errors that can occur while encoding, hardening or linking records
#[derive(Debug, Error)]
pub enum LinkageError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid Bloom filter length: {len} (must be > 1)")]
    InvalidFilterLength { len: usize },

    #[error("Invalid hash count: {k} (must be > 0)")]
    InvalidHashCount { k: usize },

    #[error("Invalid hash count ratio: {ratio} (must be 0.5, 1.0 or 2.0)")]
    InvalidHashCountRatio { ratio: f64 },

    #[error("Invalid flip probability: {p} (must be within [0, 1])")]
    InvalidFlipProbability { p: f64 },

    #[error("Unknown hash function: {0}")]
    UnknownHashFunction(String),

    #[error("Unknown BLIP selection method: {0}")]
    UnknownSelectionMethod(String),

    #[error("Unknown subset label: {0}")]
    UnknownSubsetLabel(String),

    #[error("Record {record}: missing {field}")]
    MissingField { record: String, field: &'static str },

    #[error("Subset {0} not present in dataset")]
    MissingSubset(SubsetLabel),

    #[error("Malformed header: expected rec_id,q_gram_set,type, found {found:?}")]
    MalformedHeader { found: String },

    #[error("Malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("Invalid q-gram set literal: {0}")]
    SetLiteral(#[from] SetLiteralError),

    #[error("Duplicate record {id} in subset {label}")]
    DuplicateRecord { id: String, label: SubsetLabel },

    #[error("Comparison pool for {label} has {actual} records, expected {expected}")]
    PoolSizeMismatch {
        label: SubsetLabel,
        expected: usize,
        actual: usize,
    },

    #[error("Dataset has {actual} records, expected {expected}")]
    RecordCountMismatch { expected: usize, actual: usize },

    #[error("Outcome counters for {label} sum to {total}, expected {expected}")]
    OutcomeTotalMismatch {
        label: SubsetLabel,
        expected: u64,
        total: u64,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl LinkageError {
    /// Classify the error
    pub fn category(&self) -> ErrorCategory {
        match self {
            LinkageError::DuplicateRecord { .. }
            | LinkageError::PoolSizeMismatch { .. }
            | LinkageError::RecordCountMismatch { .. }
            | LinkageError::OutcomeTotalMismatch { .. } => ErrorCategory::DataIntegrityViolation,
            LinkageError::Io(_) | LinkageError::Serialization(_) => ErrorCategory::Io,
            _ => ErrorCategory::PreconditionViolation,
        }
    }
}

/// Errors from the q-gram set literal decoder
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SetLiteralError {
    #[error("empty input")]
    Empty,

    #[error("expected {expected} at offset {offset}")]
    Expected {
        expected: &'static str,
        offset: usize,
    },

    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("unsupported escape \\{escape} at offset {offset}")]
    UnsupportedEscape { escape: char, offset: usize },

    #[error("trailing characters at offset {offset}")]
    TrailingCharacters { offset: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(
            LinkageError::InvalidFilterLength { len: 1 }.category(),
            ErrorCategory::PreconditionViolation
        );
        assert_eq!(
            LinkageError::DuplicateRecord {
                id: "r1".into(),
                label: SubsetLabel::Base
            }
            .category(),
            ErrorCategory::DataIntegrityViolation
        );
        assert_eq!(
            LinkageError::from(SetLiteralError::Empty).category(),
            ErrorCategory::PreconditionViolation
        );
    }

    #[test]
    fn test_messages_name_offending_record() {
        let err = LinkageError::MissingField {
            record: "voter_17".into(),
            field: "original bit vector",
        };
        assert_eq!(err.to_string(), "Record voter_17: missing original bit vector");
    }
}
