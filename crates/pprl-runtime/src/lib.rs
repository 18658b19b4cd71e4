//! # PPRL Runtime
//!
//! Command line driver for the linkage experiment.
//!
//! ## Run Sequence
//!
//! 1. Parse arguments, apply environment overrides
//! 2. Size the rayon pool
//! 3. Load the record table
//! 4. Derive k, encode, harden and link every characteristic subset
//! 5. Write the outcome table (only after every subset succeeded)

pub mod cli;
pub mod config;

use std::fs::File;
use std::io::{self, BufWriter};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use pprl_linkage::{
    CsvRecordSource, DelimitedReportSink, JsonReportSink, LinkageApi, LinkageReport,
    LinkageService, Metrics, RecordSource, ReportSink,
};

pub use cli::{Args, OutputFormat};
pub use config::{load_config, load_config_with, ConfigError, RunSettings};

/// Load, link and report.
pub fn execute(settings: &RunSettings, metrics: Arc<Metrics>) -> Result<LinkageReport> {
    let dataset = CsvRecordSource::new(&settings.records)
        .load()
        .with_context(|| format!("Failed to load {}", settings.records.display()))?;

    let service = LinkageService::with_metrics(settings.linkage.clone(), metrics);
    let report = service.run(dataset).context("Linkage run failed")?;

    write_report(settings, &report)?;
    Ok(report)
}

/// Write `report` to the configured destination and format.
pub fn write_report(settings: &RunSettings, report: &LinkageReport) -> Result<()> {
    let writer: Box<dyn io::Write> = match &settings.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    let mut sink: Box<dyn ReportSink> = match settings.format {
        OutputFormat::Csv => Box::new(DelimitedReportSink::csv(writer)),
        OutputFormat::Json => Box::new(JsonReportSink::new(writer)),
    };
    sink.write(report).context("Failed to write report")?;

    if let Some(path) = &settings.output {
        info!(path = %path.display(), rows = report.len(), "Report written");
    }
    Ok(())
}
