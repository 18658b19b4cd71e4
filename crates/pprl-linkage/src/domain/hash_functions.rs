//! Cryptographic hash functions for random hashing
//!
//! The digest of a (salted) q-gram seeds the generator that draws its bit
//! positions, so each q-gram always lands on the same positions.

use std::str::FromStr;

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sha3::{Keccak256, Sha3_256};

use crate::error::LinkageError;

/// Supported digest functions (all produce 32 bytes)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashFunction {
    #[default]
    Sha256,
    Sha3_256,
    Keccak256,
}

impl HashFunction {
    /// Digest `input`
    pub fn digest(&self, input: &[u8]) -> [u8; 32] {
        let mut out = [0u8; 32];
        match self {
            HashFunction::Sha256 => out.copy_from_slice(&Sha256::digest(input)),
            HashFunction::Sha3_256 => out.copy_from_slice(&Sha3_256::digest(input)),
            HashFunction::Keccak256 => out.copy_from_slice(&Keccak256::digest(input)),
        }
        out
    }

    /// Fresh generator seeded from the digest of `input`
    pub fn seeded_rng(&self, input: &[u8]) -> ChaCha20Rng {
        ChaCha20Rng::from_seed(self.digest(input))
    }

    pub fn name(&self) -> &'static str {
        match self {
            HashFunction::Sha256 => "sha256",
            HashFunction::Sha3_256 => "sha3-256",
            HashFunction::Keccak256 => "keccak256",
        }
    }
}

impl FromStr for HashFunction {
    type Err = LinkageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha256" | "sha2" => Ok(HashFunction::Sha256),
            "sha3-256" | "sha3" => Ok(HashFunction::Sha3_256),
            "keccak256" | "keccak" => Ok(HashFunction::Keccak256),
            other => Err(LinkageError::UnknownHashFunction(other.to_string())),
        }
    }
}

impl std::fmt::Display for HashFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_digest_deterministic() {
        for hash in [HashFunction::Sha256, HashFunction::Sha3_256, HashFunction::Keccak256] {
            assert_eq!(
                hash.digest(b"he"),
                hash.digest(b"he"),
                "Same input must produce same digest for {}",
                hash
            );
        }
    }

    #[test]
    fn test_functions_differ() {
        let a = HashFunction::Sha256.digest(b"he");
        let b = HashFunction::Sha3_256.digest(b"he");
        let c = HashFunction::Keccak256.digest(b"he");
        assert_ne!(a, b);
        assert_ne!(b, c);
    }

    #[test]
    fn test_seeded_rng_reproducible() {
        let mut r1 = HashFunction::Sha256.seeded_rng(b"ll");
        let mut r2 = HashFunction::Sha256.seeded_rng(b"ll");
        let d1: Vec<usize> = (0..10).map(|_| r1.gen_range(0..1000)).collect();
        let d2: Vec<usize> = (0..10).map(|_| r2.gen_range(0..1000)).collect();
        assert_eq!(d1, d2);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("SHA256".parse::<HashFunction>().unwrap(), HashFunction::Sha256);
        assert_eq!("sha3-256".parse::<HashFunction>().unwrap(), HashFunction::Sha3_256);
        assert_eq!("keccak256".parse::<HashFunction>().unwrap(), HashFunction::Keccak256);
        assert!(matches!(
            "md4".parse::<HashFunction>(),
            Err(LinkageError::UnknownHashFunction(_))
        ));
    }
}
