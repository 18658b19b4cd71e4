//! # PPRL Runtime
//!
//! ```text
//! pprl-runtime <records.csv> bf <L,k_ratio> blip <method,p> [OPTIONS]
//! ```
//!
//! Logs go to stderr (filter from `PPRL_LOG` or `RUST_LOG`, default `info`);
//! the outcome table goes to stdout unless `--output` is given.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use pprl_linkage::{LinkageError, Metrics};
use pprl_runtime::{execute, load_config, Args};

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_env("PPRL_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging()?;

    let settings = load_config(&args).context("Invalid configuration")?;

    rayon::ThreadPoolBuilder::new()
        .num_threads(settings.workers)
        .build_global()
        .context("Failed to initialise worker pool")?;

    info!("===========================================");
    info!("  BLIP Linkage Runtime v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");
    info!(
        records = %settings.records.display(),
        workers = settings.workers,
        filter_len = settings.linkage.filter_len,
        k_ratio = settings.linkage.hash_count_ratio.as_f64(),
        method = %settings.linkage.selection_method,
        flip_probability = settings.linkage.flip_probability,
        seed = ?settings.linkage.seed,
        "Configuration loaded"
    );

    let metrics = Arc::new(Metrics::new());
    if let Err(e) = execute(&settings, metrics.clone()) {
        if let Some(linkage) = e.downcast_ref::<LinkageError>() {
            error!(category = ?linkage.category(), "{:#}", e);
        } else {
            error!("{:#}", e);
        }
        return Err(e);
    }

    let snapshot = metrics.snapshot();
    info!(
        records_encoded = snapshot.records_encoded,
        vectors_hardened = snapshot.vectors_hardened,
        comparisons = snapshot.comparisons,
        subsets_linked = snapshot.subsets_linked,
        avg_encode_ns = snapshot.avg_encode_ns,
        avg_harden_ns = snapshot.avg_harden_ns,
        avg_scan_ms = snapshot.avg_scan_ms,
        "Run complete"
    );
    Ok(())
}
