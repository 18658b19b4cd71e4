//! Bloom filter parameter derivation
//!
//! Formulas:
//! - k_opt = floor((L / mean_len) * ln(2))  -- optimal positions per q-gram
//! - k     = floor(ratio * k_opt)           -- effective k for a run
//! - FPR   = (1 - e^(-kn/L))^k              -- expected false positive rate

use std::f64::consts::LN_2;

use serde::{Deserialize, Serialize};

use super::qgram::QGramSet;
use crate::error::LinkageError;

/// Multiplier applied to k_opt
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashCountRatio {
    Half,
    Unit,
    Double,
}

impl HashCountRatio {
    /// Parse a ratio; only 0.5, 1.0 and 2.0 are accepted
    pub fn from_f64(ratio: f64) -> Result<Self, LinkageError> {
        if ratio == 0.5 {
            Ok(HashCountRatio::Half)
        } else if ratio == 1.0 {
            Ok(HashCountRatio::Unit)
        } else if ratio == 2.0 {
            Ok(HashCountRatio::Double)
        } else {
            Err(LinkageError::InvalidHashCountRatio { ratio })
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            HashCountRatio::Half => 0.5,
            HashCountRatio::Unit => 1.0,
            HashCountRatio::Double => 2.0,
        }
    }
}

/// Mean q-gram set size over all `sets`
pub fn mean_qgram_set_length<'a, I>(sets: I) -> Result<f64, LinkageError>
where
    I: IntoIterator<Item = &'a QGramSet>,
{
    let (count, total) = sets
        .into_iter()
        .fold((0usize, 0usize), |(count, total), qs| (count + 1, total + qs.len()));
    if count == 0 {
        return Err(LinkageError::InvalidParameter(
            "cannot derive mean q-gram set length from an empty dataset".to_string(),
        ));
    }
    Ok(total as f64 / count as f64)
}

/// Optimal number of positions per q-gram
///
/// Fails (never clamps) when the result is 0.
pub fn optimal_hash_count(mean_len: f64, filter_len: usize) -> Result<usize, LinkageError> {
    if !mean_len.is_finite() || mean_len <= 0.0 {
        return Err(LinkageError::InvalidParameter(format!(
            "mean q-gram set length must be positive, got {}",
            mean_len
        )));
    }
    let k_opt = ((filter_len as f64 / mean_len) * LN_2).floor();
    if k_opt < 1.0 {
        return Err(LinkageError::InvalidParameter(format!(
            "calculated k_opt ({}) is not greater than 0 for L={} and mean length {:.3}",
            k_opt, filter_len, mean_len
        )));
    }
    Ok(k_opt as usize)
}

/// Effective k for a run
pub fn effective_hash_count(k_opt: usize, ratio: HashCountRatio) -> Result<usize, LinkageError> {
    let k = (ratio.as_f64() * k_opt as f64).floor() as usize;
    if k == 0 {
        return Err(LinkageError::InvalidHashCount { k });
    }
    Ok(k)
}

/// Expected false positive rate for `n` elements in an `m`-bit filter
///
/// Formula: FPR = (1 - e^(-kn/m))^k
pub fn expected_false_positive_rate(m: usize, n: f64, k: usize) -> f64 {
    if m == 0 {
        return 1.0;
    }
    let exponent = -(k as f64) * n / (m as f64);
    (1.0 - exponent.exp()).powi(k as i32)
}
