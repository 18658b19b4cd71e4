//! Command line arguments

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Result table rendering
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
}

/// BLIP linkage experiment over a pre-sampled record table
#[derive(Parser, Debug)]
#[command(name = "pprl-runtime")]
#[command(about = "Encode, harden and re-identify records with Bloom filters")]
pub struct Args {
    /// Record table with header rec_id,q_gram_set,type
    pub records: PathBuf,

    /// Encoding method (only "bf" is supported)
    pub encoding: String,

    /// Encoding parameters: L,k_ratio (e.g. 1000,1.0)
    pub encoding_params: String,

    /// Hardening method (only "blip" is supported)
    pub hardening: String,

    /// Hardening parameters: method,p (e.g. balanced-flip,0.05)
    pub hardening_params: String,

    /// Digest seeding the position generator
    #[arg(long, default_value = "sha256")]
    pub hash: String,

    /// Expected base pool size
    #[arg(long, default_value = "1000000")]
    pub base_size: usize,

    /// Expected size of each characteristic subset
    #[arg(long, default_value = "1000")]
    pub subset_size: usize,

    /// Seed for reproducible shuffling and hardening
    #[arg(long)]
    pub seed: Option<u64>,

    /// Worker threads for encoding and the scan (default: all cores)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Queries per subset whose top matches are logged at debug level
    #[arg(long, default_value = "25")]
    pub diagnostic_queries: usize,

    /// Output file (stdout when absent)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    pub format: OutputFormat,
}
