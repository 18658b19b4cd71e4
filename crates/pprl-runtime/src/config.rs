//! # Run Configuration
//!
//! Turns command line arguments plus environment overrides into the
//! library's `LinkageConfig`.
//!
//! ## Environment
//!
//! - `PPRL_SEED` - overrides `--seed`
//! - `PPRL_WORKERS` - overrides `--workers`

use std::path::PathBuf;

use pprl_linkage::{
    HashCountRatio, HashFunction, LinkageConfig, LinkageConfigBuilder, LinkageError,
    SelectionMethod,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::cli::{Args, OutputFormat};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Encoding method {0:?} is not supported by this tool (only \"bf\")")]
    UnsupportedEncoding(String),

    #[error("Unknown encoding method {0:?} (expected \"bf\")")]
    UnknownEncoding(String),

    #[error("Unknown hardening method {0:?} (expected \"blip\")")]
    UnknownHardening(String),

    #[error("Malformed {what} {value:?}: expected {expected}")]
    MalformedParams {
        what: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error(transparent)]
    Linkage(#[from] LinkageError),
}

/// Everything the driver needs for one run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub records: PathBuf,
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    pub workers: usize,
    pub linkage: LinkageConfig,
}

/// `L,k_ratio`
fn parse_encoding_params(value: &str) -> Result<(usize, HashCountRatio), ConfigError> {
    let malformed = || ConfigError::MalformedParams {
        what: "encoding parameters",
        value: value.to_string(),
        expected: "L,k_ratio",
    };
    let (len, ratio) = value.split_once(',').ok_or_else(malformed)?;
    let len: usize = len.trim().parse().map_err(|_| malformed())?;
    let ratio: f64 = ratio.trim().parse().map_err(|_| malformed())?;
    Ok((len, HashCountRatio::from_f64(ratio)?))
}

/// `method,p`
fn parse_hardening_params(value: &str) -> Result<(SelectionMethod, f64), ConfigError> {
    let malformed = || ConfigError::MalformedParams {
        what: "hardening parameters",
        value: value.to_string(),
        expected: "method,p",
    };
    let (method, p) = value.split_once(',').ok_or_else(malformed)?;
    let method: SelectionMethod = method.trim().parse()?;
    let p: f64 = p.trim().parse().map_err(|_| malformed())?;
    Ok((method, p))
}

fn check_encoding(name: &str) -> Result<(), ConfigError> {
    match name {
        "bf" => Ok(()),
        "rse" | "federal" => Err(ConfigError::UnsupportedEncoding(name.to_string())),
        other => Err(ConfigError::UnknownEncoding(other.to_string())),
    }
}

fn check_hardening(name: &str) -> Result<(), ConfigError> {
    match name {
        "blip" => Ok(()),
        other => Err(ConfigError::UnknownHardening(other.to_string())),
    }
}

/// Build settings from `args` and the process environment.
pub fn load_config(args: &Args) -> Result<RunSettings, ConfigError> {
    load_config_with(args, |key| std::env::var(key).ok())
}

/// Build settings from `args` and an environment lookup.
pub fn load_config_with<F>(args: &Args, env: F) -> Result<RunSettings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    check_encoding(&args.encoding)?;
    check_hardening(&args.hardening)?;

    let (filter_len, ratio) = parse_encoding_params(&args.encoding_params)?;
    let (method, p) = parse_hardening_params(&args.hardening_params)?;
    let hash: HashFunction = args.hash.parse()?;

    let mut seed = args.seed;
    if let Some(value) = env("PPRL_SEED") {
        match value.parse() {
            Ok(s) => {
                seed = Some(s);
                info!(seed = s, "Loaded seed from environment");
            }
            Err(_) => warn!(value = %value, "PPRL_SEED must be an unsigned integer"),
        }
    }

    let mut workers = args.workers.unwrap_or_else(num_cpus::get);
    if let Some(value) = env("PPRL_WORKERS") {
        match value.parse::<usize>() {
            Ok(w) if w > 0 => workers = w,
            _ => warn!(value = %value, "PPRL_WORKERS must be a positive integer"),
        }
    }

    let mut builder = LinkageConfigBuilder::new()
        .filter_len(filter_len)
        .hash_count_ratio(ratio)
        .hash_function(hash)
        .selection_method(method)
        .flip_probability(p)
        .expected_sizes(args.base_size, args.subset_size)
        .diagnostic_queries(args.diagnostic_queries);
    if let Some(seed) = seed {
        builder = builder.seed(seed);
    }

    Ok(RunSettings {
        records: args.records.clone(),
        output: args.output.clone(),
        format: args.format,
        workers: workers.max(1),
        linkage: builder.build()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec![
            "pprl-runtime",
            "records.csv",
            "bf",
            "1000,1.0",
            "blip",
            "balanced-flip,0.05",
        ];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).expect("valid arguments")
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults() {
        let settings = load_config_with(&args(&[]), no_env).unwrap();

        assert_eq!(settings.linkage.filter_len, 1000);
        assert_eq!(settings.linkage.hash_count_ratio, HashCountRatio::Unit);
        assert_eq!(settings.linkage.selection_method, SelectionMethod::BalancedFlip);
        assert_eq!(settings.linkage.hash_function, HashFunction::Sha256);
        assert_eq!(settings.linkage.expected_base_size, Some(1_000_000));
        assert_eq!(settings.linkage.expected_subset_size, Some(1000));
        assert_eq!(settings.linkage.diagnostic_queries, 25);
        assert_eq!(settings.linkage.seed, None);
        assert_eq!(settings.format, OutputFormat::Csv);
        assert!(settings.workers >= 1);
    }

    #[test]
    fn test_options() {
        let settings = load_config_with(
            &args(&["--hash", "keccak256", "--seed", "9", "--workers", "3", "--format", "json"]),
            no_env,
        )
        .unwrap();

        assert_eq!(settings.linkage.hash_function, HashFunction::Keccak256);
        assert_eq!(settings.linkage.seed, Some(9));
        assert_eq!(settings.workers, 3);
        assert_eq!(settings.format, OutputFormat::Json);
    }

    #[test]
    fn test_environment_overrides() {
        let env = |key: &str| match key {
            "PPRL_SEED" => Some("42".to_string()),
            "PPRL_WORKERS" => Some("2".to_string()),
            _ => None,
        };
        let settings = load_config_with(&args(&["--seed", "1"]), env).unwrap();

        assert_eq!(settings.linkage.seed, Some(42));
        assert_eq!(settings.workers, 2);
    }

    #[test]
    fn test_invalid_environment_ignored() {
        let env = |key: &str| match key {
            "PPRL_WORKERS" => Some("0".to_string()),
            _ => Some("not-a-number".to_string()),
        };
        let settings = load_config_with(&args(&["--seed", "5", "--workers", "4"]), env).unwrap();

        assert_eq!(settings.linkage.seed, Some(5));
        assert_eq!(settings.workers, 4);
    }

    #[test]
    fn test_other_encodings_rejected() {
        for name in ["rse", "federal"] {
            let mut a = args(&[]);
            a.encoding = name.to_string();
            assert!(matches!(
                load_config_with(&a, no_env),
                Err(ConfigError::UnsupportedEncoding(_))
            ));
        }
        let mut a = args(&[]);
        a.encoding = "tmh".to_string();
        assert!(matches!(load_config_with(&a, no_env), Err(ConfigError::UnknownEncoding(_))));
    }

    #[test]
    fn test_only_blip_hardening() {
        let mut a = args(&[]);
        a.hardening = "wxor".to_string();
        assert!(matches!(load_config_with(&a, no_env), Err(ConfigError::UnknownHardening(_))));
    }

    #[test]
    fn test_parameter_parsing() {
        assert_eq!(parse_encoding_params("500, 2.0").unwrap(), (500, HashCountRatio::Double));
        assert!(matches!(
            parse_encoding_params("500"),
            Err(ConfigError::MalformedParams { .. })
        ));
        assert!(matches!(
            parse_encoding_params("500,0.75"),
            Err(ConfigError::Linkage(LinkageError::InvalidHashCountRatio { .. }))
        ));

        assert_eq!(
            parse_hardening_params("ala,0.1").unwrap(),
            (SelectionMethod::IndependentFlip, 0.1)
        );
        assert!(matches!(
            parse_hardening_params("coin,0.1"),
            Err(ConfigError::Linkage(LinkageError::UnknownSelectionMethod(_)))
        ));
        assert!(matches!(
            parse_hardening_params("sch,abc"),
            Err(ConfigError::MalformedParams { .. })
        ));
    }

    #[test]
    fn test_invalid_values_rejected_by_builder() {
        let mut a = args(&[]);
        a.encoding_params = "1,1.0".to_string();
        assert!(matches!(
            load_config_with(&a, no_env),
            Err(ConfigError::Linkage(LinkageError::InvalidFilterLength { len: 1 }))
        ));

        let mut a = args(&[]);
        a.hardening_params = "sch,1.5".to_string();
        assert!(matches!(
            load_config_with(&a, no_env),
            Err(ConfigError::Linkage(LinkageError::InvalidFlipProbability { .. }))
        ));
    }
}
