//! Inbound Ports (Driving Ports)
//!
//! The API that callers use to encode datasets and link subsets.

use crate::domain::{Dataset, LinkageReport, RandomHashingEncoder, SubsetLabel, SubsetOutcome};
use crate::error::LinkageError;

/// Primary linkage API (Driving Port)
pub trait LinkageApi: Send + Sync {
    /// Build the encoder for `dataset`
    ///
    /// The hash count is derived from the mean q-gram set length over every
    /// record of every label and the configured ratio.
    fn prepare_encoder(&self, dataset: &Dataset) -> Result<RandomHashingEncoder, LinkageError>;

    /// Encode every record of `dataset` with `encoder`
    fn encode(&self, dataset: &mut Dataset, encoder: &RandomHashingEncoder);

    /// Link one characteristic subset against the base pool
    ///
    /// Requires an encoded dataset. Returns the outcome tallies of both
    /// similarity variants; each variant sums to the subset size.
    fn link_subset(
        &self,
        dataset: &Dataset,
        label: SubsetLabel,
    ) -> Result<SubsetOutcome, LinkageError>;

    /// Validate, encode and link every characteristic subset
    fn run(&self, dataset: Dataset) -> Result<LinkageReport, LinkageError>;
}
