//! Run configuration and validation
//!
//! # Example
//!
//! ```ignore
//! use pprl_linkage::domain::{LinkageConfigBuilder, HashCountRatio, SelectionMethod};
//!
//! let config = LinkageConfigBuilder::new()
//!     .filter_len(1000)
//!     .hash_count_ratio(HashCountRatio::Unit)
//!     .selection_method(SelectionMethod::BalancedFlip)
//!     .flip_probability(0.05)
//!     .build()?;
//! ```

use serde::{Deserialize, Serialize};

use super::dataset::CHARACTERISTIC_SUBSETS;
use super::hardening::{validate_flip_probability, SelectionMethod};
use super::hash_functions::HashFunction;
use super::parameters::HashCountRatio;
use crate::error::LinkageError;

/// Linkage run configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkageConfig {
    /// Bloom filter length (L)
    pub filter_len: usize,
    /// Multiplier applied to k_opt
    pub hash_count_ratio: HashCountRatio,
    /// Digest used to seed position draws
    pub hash_function: HashFunction,
    /// BLIP selection method
    pub selection_method: SelectionMethod,
    /// BLIP flip probability
    pub flip_probability: f64,
    /// Expected size of the base pool, checked when set
    pub expected_base_size: Option<usize>,
    /// Expected size of each characteristic subset, checked when set
    pub expected_subset_size: Option<usize>,
    /// Seed for shuffling and hardening; entropy when unset
    pub seed: Option<u64>,
    /// Queries per subset whose top matches are logged at debug level
    pub diagnostic_queries: usize,
}

impl Default for LinkageConfig {
    fn default() -> Self {
        Self {
            filter_len: 1000,
            hash_count_ratio: HashCountRatio::Unit,
            hash_function: HashFunction::Sha256,
            selection_method: SelectionMethod::BalancedFlip,
            flip_probability: 0.05,
            expected_base_size: None,
            expected_subset_size: None,
            seed: None,
            diagnostic_queries: 0,
        }
    }
}

impl LinkageConfig {
    /// Validate parameter ranges
    pub fn validate(&self) -> Result<(), LinkageError> {
        if self.filter_len <= 1 {
            return Err(LinkageError::InvalidFilterLength {
                len: self.filter_len,
            });
        }
        validate_flip_probability(self.flip_probability)?;
        Ok(())
    }

    /// Expected total record count, if both sizes are configured
    pub fn expected_total(&self) -> Option<usize> {
        match (self.expected_base_size, self.expected_subset_size) {
            (Some(base), Some(subset)) => Some(base + CHARACTERISTIC_SUBSETS * subset),
            _ => None,
        }
    }

    /// Expected comparison pool size, if both sizes are configured
    pub fn expected_pool_size(&self) -> Option<usize> {
        match (self.expected_base_size, self.expected_subset_size) {
            (Some(base), Some(subset)) => Some(base + subset),
            _ => None,
        }
    }
}

/// Builder for [`LinkageConfig`] with validation
#[derive(Default)]
pub struct LinkageConfigBuilder {
    filter_len: Option<usize>,
    hash_count_ratio: Option<HashCountRatio>,
    hash_function: Option<HashFunction>,
    selection_method: Option<SelectionMethod>,
    flip_probability: Option<f64>,
    expected_base_size: Option<usize>,
    expected_subset_size: Option<usize>,
    seed: Option<u64>,
    diagnostic_queries: Option<usize>,
}

impl LinkageConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter_len(mut self, len: usize) -> Self {
        self.filter_len = Some(len);
        self
    }

    pub fn hash_count_ratio(mut self, ratio: HashCountRatio) -> Self {
        self.hash_count_ratio = Some(ratio);
        self
    }

    pub fn hash_function(mut self, hash: HashFunction) -> Self {
        self.hash_function = Some(hash);
        self
    }

    pub fn selection_method(mut self, method: SelectionMethod) -> Self {
        self.selection_method = Some(method);
        self
    }

    pub fn flip_probability(mut self, p: f64) -> Self {
        self.flip_probability = Some(p);
        self
    }

    /// Expect `base` base records and `subset` records per characteristic subset
    pub fn expected_sizes(mut self, base: usize, subset: usize) -> Self {
        self.expected_base_size = Some(base);
        self.expected_subset_size = Some(subset);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn diagnostic_queries(mut self, count: usize) -> Self {
        self.diagnostic_queries = Some(count);
        self
    }

    /// Build the configuration, validating all parameters
    pub fn build(self) -> Result<LinkageConfig, LinkageError> {
        let defaults = LinkageConfig::default();

        let config = LinkageConfig {
            filter_len: self.filter_len.unwrap_or(defaults.filter_len),
            hash_count_ratio: self.hash_count_ratio.unwrap_or(defaults.hash_count_ratio),
            hash_function: self.hash_function.unwrap_or(defaults.hash_function),
            selection_method: self.selection_method.unwrap_or(defaults.selection_method),
            flip_probability: self.flip_probability.unwrap_or(defaults.flip_probability),
            expected_base_size: self.expected_base_size.or(defaults.expected_base_size),
            expected_subset_size: self.expected_subset_size.or(defaults.expected_subset_size),
            seed: self.seed.or(defaults.seed),
            diagnostic_queries: self.diagnostic_queries.unwrap_or(defaults.diagnostic_queries),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(LinkageConfig::default().validate().is_ok());
    }

    #[test]
    fn test_builder_rejects_short_filter() {
        let result = LinkageConfigBuilder::new().filter_len(1).build();
        assert!(matches!(result, Err(LinkageError::InvalidFilterLength { len: 1 })));
    }

    #[test]
    fn test_builder_rejects_bad_probability() {
        let result = LinkageConfigBuilder::new().flip_probability(1.5).build();
        assert!(matches!(result, Err(LinkageError::InvalidFlipProbability { .. })));
    }

    #[test]
    fn test_builder_sets_fields() {
        let config = LinkageConfigBuilder::new()
            .filter_len(500)
            .hash_count_ratio(HashCountRatio::Double)
            .hash_function(HashFunction::Keccak256)
            .selection_method(SelectionMethod::IndependentFlip)
            .flip_probability(0.1)
            .expected_sizes(1_000_000, 1000)
            .seed(42)
            .diagnostic_queries(25)
            .build()
            .expect("Should create valid config");

        assert_eq!(config.filter_len, 500);
        assert_eq!(config.hash_count_ratio, HashCountRatio::Double);
        assert_eq!(config.hash_function, HashFunction::Keccak256);
        assert_eq!(config.selection_method, SelectionMethod::IndependentFlip);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.expected_total(), Some(1_012_000));
        assert_eq!(config.expected_pool_size(), Some(1_001_000));
    }

    #[test]
    fn test_sizes_unchecked_by_default() {
        let config = LinkageConfigBuilder::new().build().unwrap();
        assert_eq!(config.expected_total(), None);
        assert_eq!(config.expected_pool_size(), None);
    }
}
