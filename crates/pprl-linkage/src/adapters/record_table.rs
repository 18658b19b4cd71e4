//! Record table source
//!
//! Reads `rec_id,q_gram_set,type` rows. Fields follow CSV quoting: a field
//! may be wrapped in double quotes, with `""` standing for one quote inside.
//! A quoted field may span lines; the row keeps the line number it starts on.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::set_literal::parse_set_literal;
use crate::domain::{Dataset, Record, SubsetLabel};
use crate::error::LinkageError;
use crate::ports::RecordSource;

/// Expected header columns
pub const HEADER: [&str; 3] = ["rec_id", "q_gram_set", "type"];

/// [`RecordSource`] reading a CSV file
#[derive(Clone, Debug)]
pub struct CsvRecordSource {
    path: PathBuf,
}

impl CsvRecordSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for CsvRecordSource {
    fn load(&self) -> Result<Dataset, LinkageError> {
        info!(path = %self.path.display(), "Loading record table");
        let file = File::open(&self.path)?;
        read_records(BufReader::new(file))
    }
}

/// Read a record table from any buffered reader
pub fn read_records<R: BufRead>(reader: R) -> Result<Dataset, LinkageError> {
    let mut lines = reader.lines().enumerate();

    let header = match lines.next() {
        Some((_, line)) => line?,
        None => {
            return Err(LinkageError::MalformedHeader {
                found: String::new(),
            })
        }
    };
    let header = header.trim_start_matches('\u{feff}').trim_end_matches('\r');
    let columns = split_fields(header).map_err(|_| LinkageError::MalformedHeader {
        found: header.to_string(),
    })?;
    if columns != HEADER {
        return Err(LinkageError::MalformedHeader {
            found: header.to_string(),
        });
    }

    let mut dataset = Dataset::new();
    let mut open_row: Option<(usize, String)> = None;
    for (index, line) in lines {
        let line = line?;
        let line = line.trim_end_matches('\r');

        let (line_no, row) = match open_row.take() {
            Some((start, mut row)) => {
                row.push('\n');
                row.push_str(line);
                (start, row)
            }
            None if line.trim().is_empty() => continue,
            None => (index + 1, line.to_string()),
        };
        if ends_inside_quotes(&row) {
            open_row = Some((line_no, row));
            continue;
        }

        let (label, record) = parse_row(line_no, &row)?;
        dataset.insert(label, record)?;
    }
    if let Some((line_no, _)) = open_row {
        return Err(LinkageError::MalformedRecord {
            line: line_no,
            reason: "unterminated quoted field".to_string(),
        });
    }

    let multi = dataset.multi_label_counts();
    if !multi.is_empty() {
        warn!(
            ids = multi.values().sum::<usize>(),
            "Records appear under several subset labels"
        );
        for (labels, count) in &multi {
            warn!(labels = %format_labels(labels), count, "Label combination");
        }
    }
    let sizes: BTreeMap<String, usize> = SubsetLabel::ALL
        .into_iter()
        .filter_map(|label| Some((label.tag().to_string(), dataset.subset(label).ok()?.len())))
        .collect();
    info!(
        records = dataset.len(),
        distinct_ids = dataset.distinct_ids(),
        sizes = ?sizes,
        "Record table loaded"
    );

    Ok(dataset)
}

fn parse_row(line_no: usize, line: &str) -> Result<(SubsetLabel, Record), LinkageError> {
    let malformed = |reason: String| LinkageError::MalformedRecord {
        line: line_no,
        reason,
    };

    let fields = split_fields(line).map_err(malformed)?;
    let [id, literal, tag]: [String; 3] = fields.try_into().map_err(|fields: Vec<String>| {
        malformed(format!("expected 3 fields, found {}", fields.len()))
    })?;

    if id.is_empty() {
        return Err(malformed("empty rec_id".to_string()));
    }
    let label: SubsetLabel = tag.parse()?;
    let qgrams = parse_set_literal(&literal)
        .map_err(|e| malformed(format!("q_gram_set of record {}: {}", id, e)))?;

    Ok((label, Record::new(id, qgrams)))
}

/// Split one CSV row into fields
fn split_fields(line: &str) -> Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        let mut field = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            loop {
                match chars.next() {
                    Some('"') if chars.peek() == Some(&'"') => {
                        chars.next();
                        field.push('"');
                    }
                    Some('"') => break,
                    Some(c) => field.push(c),
                    None => return Err("unterminated quoted field".to_string()),
                }
            }
            match chars.next() {
                None => {
                    fields.push(field);
                    return Ok(fields);
                }
                Some(',') => fields.push(field),
                Some(c) => return Err(format!("unexpected {:?} after quoted field", c)),
            }
        } else {
            loop {
                match chars.next() {
                    None => {
                        fields.push(field);
                        return Ok(fields);
                    }
                    Some(',') => break,
                    Some(c) => field.push(c),
                }
            }
            fields.push(field);
        }
    }
}

/// Whether a quoted field is still open at the end of `row`
fn ends_inside_quotes(row: &str) -> bool {
    let mut in_quotes = false;
    let mut field_start = true;
    let mut chars = row.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                chars.next();
            }
            '"' if in_quotes => in_quotes = false,
            '"' if field_start => in_quotes = true,
            ',' if !in_quotes => {
                field_start = true;
                continue;
            }
            _ => {}
        }
        field_start = false;
    }
    in_quotes
}

fn format_labels(labels: &[SubsetLabel]) -> String {
    labels
        .iter()
        .map(SubsetLabel::tag)
        .collect::<Vec<_>>()
        .join("+")
}
