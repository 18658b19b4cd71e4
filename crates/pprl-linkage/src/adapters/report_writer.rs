//! Report sinks: delimited text and JSON

use std::io::Write;

use crate::domain::LinkageReport;
use crate::error::LinkageError;
use crate::ports::ReportSink;

/// Writes the result table as delimited text with a header row
pub struct DelimitedReportSink<W: Write> {
    writer: W,
    delimiter: char,
}

impl<W: Write> DelimitedReportSink<W> {
    /// Comma-separated output
    pub fn csv(writer: W) -> Self {
        Self::new(writer, ',')
    }

    pub fn new(writer: W, delimiter: char) -> Self {
        Self { writer, delimiter }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportSink for DelimitedReportSink<W> {
    fn write(&mut self, report: &LinkageReport) -> Result<(), LinkageError> {
        self.writer
            .write_all(report.to_delimited(self.delimiter).as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes the result table as pretty-printed JSON keyed by subset tag
pub struct JsonReportSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonReportSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportSink for JsonReportSink<W> {
    fn write(&mut self, report: &LinkageReport) -> Result<(), LinkageError> {
        serde_json::to_writer_pretty(&mut self.writer, report)
            .map_err(|e| LinkageError::Serialization(e.to_string()))?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Outcome, SubsetLabel, SubsetOutcome};

    fn report() -> LinkageReport {
        let mut outcome = SubsetOutcome::default();
        outcome.original.record(Outcome::OneToOneCorrect);
        outcome.hardened.record(Outcome::OneToManyWrong);
        let mut report = LinkageReport::new();
        report.insert(SubsetLabel::ShortestQGramSet, outcome);
        report
    }

    #[test]
    fn test_csv_sink() {
        let mut sink = DelimitedReportSink::csv(Vec::new());
        sink.write(&report()).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();

        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("id,og_bf_dice_1-1-correct,"));
        assert_eq!(lines.next(), Some("l_s,1,0,0,0,0,0,0,1"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_tab_delimited_sink() {
        let mut sink = DelimitedReportSink::new(Vec::new(), '\t');
        sink.write(&report()).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert!(text.contains("l_s\t1\t0"));
    }

    #[test]
    fn test_json_sink_round_trip() {
        let mut sink = JsonReportSink::new(Vec::new());
        sink.write(&report()).unwrap();
        let bytes = sink.into_inner();

        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["rows"]["l_s"]["original"]["one_to_one_correct"], 1);

        let parsed: LinkageReport = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed, report());
    }
}
