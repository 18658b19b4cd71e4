//! # PPRL Linkage
//!
//! Privacy-preserving record linkage experiment: q-gram sets are encoded as
//! random-hashing Bloom filters, hardened with BLIP bit flipping, and linked
//! by Dice similarity to measure how often a record is still re-identified.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure logic, no I/O
//!   - `RandomHashingEncoder`: Bloom filter construction
//!   - `BlipHardener`: Independent-flip and balanced-flip hardening
//!   - `ComparisonPool`: Shuffled subset ∪ base candidates
//!   - `LinkageConfig` / `LinkageConfigBuilder`: Run configuration
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `LinkageApi`: Driving port (inbound API)
//!   - `RecordSource`, `ReportSink`: Driven ports
//!
//! - **Service Layer** (`service/`): Orchestration
//!   - `LinkageService`: Implements `LinkageApi`
//!
//! - **Adapters Layer** (`adapters/`): CSV input, delimited/JSON output
//!
//! ## Invariants
//!
//! - **Determinism**: `encode` is a pure function of (hash, L, k, q-grams, salt)
//! - **Length**: every bit vector of a run has length L, before and after hardening
//! - **Totals**: per subset and variant, the four outcome counters sum to |S|
//!
//! ## Usage Example
//!
//! ```ignore
//! use pprl_linkage::{CsvRecordSource, LinkageApi, LinkageConfigBuilder, LinkageService};
//! use pprl_linkage::ports::RecordSource;
//!
//! let config = LinkageConfigBuilder::new()
//!     .filter_len(1000)
//!     .flip_probability(0.05)
//!     .build()?;
//!
//! let dataset = CsvRecordSource::new("records.csv").load()?;
//! let report = LinkageService::new(config).run(dataset)?;
//! print!("{}", report.to_delimited(','));
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports for convenience
pub use adapters::{CsvRecordSource, DelimitedReportSink, JsonReportSink};
pub use domain::{
    BitVector, BlipHardener, Dataset, HashCountRatio, HashFunction, LinkageConfig,
    LinkageConfigBuilder, LinkageReport, QGramSet, RandomHashingEncoder, Record,
    SelectionMethod, SubsetLabel, SubsetOutcome,
};
pub use error::{ErrorCategory, LinkageError, SetLiteralError};
pub use metrics::{Metrics, MetricsRecorder, MetricsSnapshot, NoOpMetrics};
pub use ports::{LinkageApi, RecordSource, ReportSink};
pub use service::LinkageService;
