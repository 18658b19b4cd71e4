//! Adapters Layer (Driven Adapters)
//!
//! Implementations of the driven ports that touch the filesystem.
//!
//! ## Adapters
//!
//! - `CsvRecordSource` - Reads the `rec_id,q_gram_set,type` record table
//! - `DelimitedReportSink` / `JsonReportSink` - Write the result table
//! - `parse_set_literal` - Restrictive q-gram set literal decoder

pub mod record_table;
pub mod report_writer;
pub mod set_literal;

pub use record_table::{read_records, CsvRecordSource};
pub use report_writer::{DelimitedReportSink, JsonReportSink};
pub use set_literal::parse_set_literal;
