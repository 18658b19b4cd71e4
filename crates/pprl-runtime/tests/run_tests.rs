//! Runtime wiring tests: arguments in, report file out.

use std::io::Write;
use std::sync::Arc;

use clap::Parser;
use pprl_linkage::{LinkageError, Metrics, SubsetLabel};
use pprl_runtime::{execute, load_config_with, Args};

fn write_table(file: &mut impl Write, subset_size: usize) {
    writeln!(file, "rec_id,q_gram_set,type").unwrap();
    for label in SubsetLabel::characteristic() {
        for j in 0..subset_size {
            writeln!(file, "{}{},\"{{'{}', 'x{}', '{}y'}}\",{}", label, j, label, j, j, label).unwrap();
        }
    }
    for i in 0..3 {
        writeln!(file, "base{},\"{{'b{}', 'zz', 'q{}'}}\",b", i, i, i).unwrap();
    }
}

fn args(records: &str, output: &str, extra: &[&str]) -> Args {
    let mut argv = vec![
        "pprl-runtime",
        records,
        "bf",
        "200,1.0",
        "blip",
        "sch,0.0",
        "--base-size",
        "3",
        "--subset-size",
        "1",
        "--seed",
        "3",
        "--output",
        output,
    ];
    argv.extend_from_slice(extra);
    Args::try_parse_from(argv).unwrap()
}

#[test]
fn test_csv_report_written() {
    let dir = tempfile::tempdir().unwrap();
    let records = dir.path().join("records.csv");
    let output = dir.path().join("report.csv");
    write_table(&mut std::fs::File::create(&records).unwrap(), 1);

    let args = args(records.to_str().unwrap(), output.to_str().unwrap(), &[]);
    let settings = load_config_with(&args, |_| None).unwrap();
    let metrics = Arc::new(Metrics::new());
    let report = execute(&settings, metrics.clone()).unwrap();

    assert_eq!(report.len(), 12);
    let text = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 13);
    assert!(lines[0].starts_with("id,og_bf_dice_1-1-correct"));
    assert!(lines.contains(&"f_h,1,0,0,0,1,0,0,0"));
    assert_eq!(metrics.snapshot().subsets_linked, 12);
}

#[test]
fn test_json_report_written() {
    let dir = tempfile::tempdir().unwrap();
    let records = dir.path().join("records.csv");
    let output = dir.path().join("report.json");
    write_table(&mut std::fs::File::create(&records).unwrap(), 1);

    let args = args(
        records.to_str().unwrap(),
        output.to_str().unwrap(),
        &["--format", "json"],
    );
    let settings = load_config_with(&args, |_| None).unwrap();
    execute(&settings, Arc::new(Metrics::new())).unwrap();

    let text = std::fs::read_to_string(&output).unwrap();
    assert!(text.contains("\"r1\""));
    assert!(text.contains("\"one_to_one_correct\": 1"));
}

#[test]
fn test_size_mismatch_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let records = dir.path().join("records.csv");
    let output = dir.path().join("report.csv");
    write_table(&mut std::fs::File::create(&records).unwrap(), 2);

    let args = args(records.to_str().unwrap(), output.to_str().unwrap(), &[]);
    let settings = load_config_with(&args, |_| None).unwrap();
    let err = execute(&settings, Arc::new(Metrics::new())).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<LinkageError>(),
        Some(LinkageError::RecordCountMismatch { expected: 15, actual: 27 })
    ));
    assert!(!output.exists(), "no partial output on failure");
}
