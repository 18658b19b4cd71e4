//! Outbound Ports (Driven Ports)
//!
//! Where records come from and where the result table goes.

use crate::domain::{Dataset, LinkageReport};
use crate::error::LinkageError;

/// Record table provider (Driven Port)
pub trait RecordSource {
    /// Load every record, grouped by subset label
    fn load(&self) -> Result<Dataset, LinkageError>;
}

/// Result table consumer (Driven Port)
pub trait ReportSink {
    /// Write the complete table
    ///
    /// Called once, after every subset has been linked.
    fn write(&mut self, report: &LinkageReport) -> Result<(), LinkageError>;
}
