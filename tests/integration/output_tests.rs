//! Output formatting integration tests.
//!
//! Tests that the JSON and CSV artifacts written by a run describe the same
//! results, and that the terminal formatter handles real reports.

use crate::mocks::MockDataset;
use po_quality::cli::output::{
    write_reports, CsvFormatter, JsonFormatter, OutputFormatter, TerminalFormatter,
    CSV_REPORT_FILE, JSON_REPORT_FILE,
};
use po_quality::data::loader::parse_csv;
use po_quality::data::TableName;
use po_quality::engine::result::ValidationReport;
use po_quality::validate_tables;
use serde_json::Value as Json;
use std::fs;

fn broken_report() -> ValidationReport {
    let tables = MockDataset::clean()
        .with_row(TableName::PoLines, "9000001,1002,101,1,0.00,0.00")
        .with_row(TableName::PoLines, "9000001,1009,777,0,-1.00,\"3,5\"")
        .with_replaced(TableName::Suppliers, "INACTIVE", "\"dormant, \"\"maybe\"\"\"")
        .to_tables();
    validate_tables(&tables, false)
}

#[test]
fn test_json_and_csv_artifacts_agree() {
    let report = broken_report();
    let dir = tempfile::tempdir().unwrap();
    write_reports(&report, dir.path()).unwrap();

    let json: Json = serde_json::from_str(&fs::read_to_string(dir.path().join(JSON_REPORT_FILE)).unwrap()).unwrap();
    let json = json.as_array().unwrap();

    let csv = parse_csv(&fs::read_to_string(dir.path().join(CSV_REPORT_FILE)).unwrap()).unwrap();
    let (header, rows) = csv.split_first().unwrap();
    assert_eq!(
        header.fields,
        vec!["check_name", "table", "severity", "passed", "failed_count", "sample_failures"]
    );

    assert_eq!(json.len(), 27);
    assert_eq!(rows.len(), json.len());

    for (object, row) in json.iter().zip(rows) {
        let f = &row.fields;
        assert_eq!(object["check_name"], Json::String(f[0].clone()));
        assert_eq!(object["table"], Json::String(f[1].clone()));
        assert_eq!(object["severity"], Json::String(f[2].clone()));
        assert_eq!(object["passed"], Json::Bool(f[3] == "true"));
        assert_eq!(object["failed_count"].as_u64().unwrap(), f[4].parse::<u64>().unwrap());

        let samples: Json = serde_json::from_str(&f[5]).unwrap();
        assert_eq!(object["sample_failures"], samples);
    }
}

#[test]
fn test_json_report_shape() {
    let report = broken_report();
    let rendered = JsonFormatter::new(true).format(&report).unwrap();
    assert!(rendered.starts_with("[\n  {\n    \"check_name\""));

    let parsed: Json = serde_json::from_str(&rendered).unwrap();
    for object in parsed.as_array().unwrap() {
        let mut keys: Vec<_> = object.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec!["check_name", "failed_count", "passed", "sample_failures", "severity", "table"]
        );

        let count = object["failed_count"].as_u64().unwrap();
        let samples = object["sample_failures"].as_array().unwrap().len() as u64;
        assert_eq!(samples, count.min(5));
        if object["check_name"] != "required_columns" {
            assert_eq!(object["passed"].as_bool().unwrap(), count == 0);
        }
    }
}

#[test]
fn test_text_values_survive_in_samples() {
    let report = broken_report();
    let rendered = JsonFormatter::new(false).format(&report).unwrap();
    assert!(rendered.contains(r#"{"status":"dormant, \"maybe\""}"#));
    assert!(rendered.contains(r#"{"part_id":777}"#));
}

#[test]
fn test_csv_quotes_sample_cells() {
    let csv = CsvFormatter.format(&broken_report()).unwrap();
    let pk_row = csv
        .lines()
        .find(|line| line.starts_with("primary_key_unique,po_lines,"))
        .unwrap();
    assert_eq!(
        pk_row,
        r#"primary_key_unique,po_lines,CRITICAL,false,2,"[{""po_line_id"":9000001},{""po_line_id"":9000001}]""#
    );
}

#[test]
fn test_terminal_output_for_clean_run() {
    let report = validate_tables(&MockDataset::clean().to_tables(), false);
    let output = TerminalFormatter::new(false, false).format(&report).unwrap();

    assert_eq!(output.matches("[PASS]").count(), 27);
    assert!(!output.contains("[FAIL]"));
    assert!(output.contains("SUMMARY: 27 checks, 27 passed, 0 failed, 0 critical"));
    assert!(output.contains("Exit code: 0"));
}

#[test]
fn test_terminal_output_marks_warn_and_fail() {
    let output = TerminalFormatter::new(true, false).format(&broken_report()).unwrap();
    assert!(output.contains("\x1b[31m[FAIL]\x1b[0m po_lines.primary_key_unique (2 rows)"));
    assert!(output.contains("\x1b[33m[WARN]\x1b[0m suppliers.allowed_values:status (1 row)"));
    assert!(output.contains("Exit code: 1"));
}
