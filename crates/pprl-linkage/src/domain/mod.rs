//! Domain Layer - Pure linkage logic
//!
//! This layer contains:
//! - Bit vectors and q-gram sets
//! - Hash functions and the random-hashing Bloom filter encoder
//! - Parameter derivation (optimal hash count)
//! - BLIP hardening
//! - Dice similarity
//! - Records, datasets and comparison pools
//! - Linkage outcomes and the result table
//! - Run configuration
//!
//! RULES:
//! - No I/O operations
//! - No async code
//! - Randomness only through generators owned by the caller or the hardener

pub mod bit_vector;
pub mod config;
pub mod dataset;
pub mod encoder;
pub mod hardening;
pub mod hash_functions;
pub mod outcome;
pub mod parameters;
pub mod pool;
pub mod qgram;
pub mod record;
pub mod similarity;

pub use bit_vector::BitVector;
pub use config::{LinkageConfig, LinkageConfigBuilder};
pub use dataset::{Dataset, CHARACTERISTIC_SUBSETS};
pub use encoder::{QGramPositions, RandomHashingEncoder};
pub use hardening::{validate_flip_probability, BlipHardener, SelectionMethod};
pub use hash_functions::HashFunction;
pub use outcome::{LinkageReport, Outcome, OutcomeCounters, SimilarityVariant, SubsetOutcome};
pub use parameters::{
    effective_hash_count, expected_false_positive_rate, mean_qgram_set_length,
    optimal_hash_count, HashCountRatio,
};
pub use pool::{ComparisonPool, PoolMember};
pub use qgram::{QGramSet, DEFAULT_Q};
pub use record::{Record, RecordState, SubsetLabel};
pub use similarity::{dice_coefficient, dice_score, DiceScore};
