//! Ports Layer
//!
//! Defines the interfaces (traits) for:
//! - Driving Ports (inbound) - API for the runtime and tests
//! - Driven Ports (outbound) - Record input and report output

pub mod inbound;
pub mod outbound;

pub use inbound::LinkageApi;
pub use outbound::{RecordSource, ReportSink};
