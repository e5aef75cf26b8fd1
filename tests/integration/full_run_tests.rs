//! Full run integration tests.
//!
//! Tests for complete validation runs over fixture datasets, including the
//! acceptance scenarios, ordering independence and the on-disk entry point.

use crate::mocks::MockDataset;
use po_quality::checks::create_catalog;
use po_quality::cli::output::{
    CsvFormatter, JsonFormatter, OutputFormatter, CSV_REPORT_FILE, JSON_REPORT_FILE,
};
use po_quality::data::{TableName, Value};
use po_quality::engine::orchestrator::{CheckOrchestrator, OrchestratorConfig};
use po_quality::engine::result::{CheckResult, ValidationReport};
use po_quality::{
    run_checks, run_validation, validate_tables, ExitStatus, QualityConfig, QualityError,
    Severity,
};
use std::fs;

fn find<'r>(report: &'r ValidationReport, table: TableName, check_name: &str) -> &'r CheckResult {
    report
        .results
        .iter()
        .find(|r| r.table == table && r.check_name == check_name)
        .unwrap_or_else(|| panic!("no result for {}.{}", table, check_name))
}

fn failing_names(report: &ValidationReport) -> Vec<String> {
    report
        .results
        .iter()
        .filter(|r| !r.passed)
        .map(|r| format!("{}.{}", r.table, r.check_name))
        .collect()
}

// Acceptance scenarios

#[test]
fn test_clean_dataset_passes_every_check() {
    let report = validate_tables(&MockDataset::clean().to_tables(), false);
    let summary = report.summary();

    assert!(failing_names(&report).is_empty(), "{:?}", failing_names(&report));
    assert_eq!(summary.total_checks, 27);
    assert_eq!(summary.passed, 27);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.critical_failed, 0);
    assert_eq!(report.exit_status(), ExitStatus::Success);
    assert_eq!(report.exit_status().code(), 0);
}

#[test]
fn test_missing_required_column_is_critical() {
    let dataset = MockDataset::clean().with_csv(
        TableName::Suppliers,
        "supplier_id,supplier_name,status\n1,Acme Metals,ACTIVE\n2,Borealis Plastics,INACTIVE\n3,Cobalt Fasteners,BLOCKED\n",
    );
    let report = validate_tables(&dataset.to_tables(), false);

    let schema = find(&report, TableName::Suppliers, "required_columns");
    assert!(!schema.passed);
    assert_eq!(schema.failed_count, 0);
    assert!(schema.sample_failures.is_empty());
    assert_eq!(schema.severity, Severity::Critical);

    assert_eq!(failing_names(&report), vec!["suppliers.required_columns"]);
    assert_eq!(report.exit_status().code(), 1);
}

#[test]
fn test_duplicate_line_ids_are_both_counted() {
    let dataset = MockDataset::clean()
        .with_row(TableName::PoLines, "9000001,1002,101,1,0.00,0.00")
        .with_row(TableName::PoLines, "9000001,1002,102,2,0.00,0.00");
    let report = validate_tables(&dataset.to_tables(), false);

    let pk = find(&report, TableName::PoLines, "primary_key_unique");
    assert!(!pk.passed);
    assert_eq!(pk.failed_count, 2);
    assert_eq!(pk.sample_failures.len(), 2);
    for sample in &pk.sample_failures {
        assert_eq!(sample["po_line_id"], Value::Integer(9000001));
    }
    assert_eq!(failing_names(&report), vec!["po_lines.primary_key_unique"]);
    assert_eq!(report.exit_status(), ExitStatus::CriticalFailure);
}

#[test]
fn test_line_amount_mismatch() {
    let dataset = MockDataset::clean()
        .with_replaced(TableName::PoLines, "5001,1001,101,10,50.00,500.00", "5001,1001,101,10,50.00,501.00")
        .with_replaced(TableName::PurchaseOrders, "1001,1,2024-01-15,USD,1000.00", "1001,1,2024-01-15,USD,1001.00");
    let report = validate_tables(&dataset.to_tables(), false);

    let math = find(&report, TableName::PoLines, "line_amount_math");
    assert!(!math.passed);
    assert_eq!(math.failed_count, 1);
    let sample = &math.sample_failures[0];
    assert_eq!(sample["po_line_id"], Value::Integer(5001));
    assert_eq!(sample["expected"], Value::Decimal(500.0));
    assert_eq!(sample["line_amount"], Value::Decimal(501.0));
    assert_eq!(sample["diff"], Value::Decimal(1.0));

    assert_eq!(failing_names(&report), vec!["po_lines.line_amount_math"]);
    assert_eq!(report.exit_status().code(), 1);
}

#[test]
fn test_reconcile_diff_at_tolerance_passes() {
    let dataset = MockDataset::clean()
        .with_row(TableName::PurchaseOrders, "1004,1,2024-04-01,USD,1000.00,OPEN")
        .with_row(TableName::PoLines, "5004,1004,101,1,999.99,999.99");
    let report = validate_tables(&dataset.to_tables(), false);

    assert!(find(&report, TableName::PurchaseOrders, "po_totals_reconcile").passed);
    assert_eq!(report.summary().passed, 27);
}

#[test]
fn test_reconcile_diff_over_tolerance_warns_only() {
    let dataset = MockDataset::clean()
        .with_row(TableName::PurchaseOrders, "1004,1,2024-04-01,USD,1000.00,OPEN")
        .with_row(TableName::PoLines, "5004,1004,101,1,999.98,999.98");
    let report = validate_tables(&dataset.to_tables(), false);

    let reconcile = find(&report, TableName::PurchaseOrders, "po_totals_reconcile");
    assert!(!reconcile.passed);
    assert_eq!(reconcile.severity, Severity::Warn);
    assert_eq!(reconcile.failed_count, 1);
    assert_eq!(reconcile.sample_failures[0]["po_id"], Value::Integer(1004));
    assert_eq!(reconcile.sample_failures[0]["diff"], Value::Decimal(0.02));

    let summary = report.summary();
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.critical_failed, 0);
    assert_eq!(report.exit_status(), ExitStatus::Success);
}

// Other rule behavior over whole datasets

#[test]
fn test_orphan_and_null_foreign_keys() {
    let dataset = MockDataset::clean()
        .with_row(TableName::PurchaseOrders, "1004,42,2024-04-01,USD,0.00,OPEN")
        .with_row(TableName::PurchaseOrders, "1005,,2024-04-02,USD,0.00,OPEN");
    let report = validate_tables(&dataset.to_tables(), false);

    let fk = find(&report, TableName::PurchaseOrders, "fk_exists:supplier_id->supplier_id");
    assert_eq!(fk.failed_count, 1);
    assert_eq!(fk.sample_failures[0]["supplier_id"], Value::Integer(42));

    let not_null = find(&report, TableName::PurchaseOrders, "not_null:supplier_id");
    assert_eq!(not_null.failed_count, 1);

    let mut names = failing_names(&report);
    names.sort();
    assert_eq!(
        names,
        vec![
            "purchase_orders.fk_exists:supplier_id->supplier_id",
            "purchase_orders.not_null:supplier_id"
        ]
    );
}

#[test]
fn test_warn_only_value_problems() {
    let dataset = MockDataset::clean()
        .with_replaced(TableName::Suppliers, "Acme Metals,ACTIVE", "Acme Metals,active")
        .with_replaced(TableName::PurchaseOrders, "2024-02-03,EUR", "2024-02-03,XXX")
        .with_row(TableName::PurchaseOrders, "1004,1,2024-04-01,USD,-5.00,PENDING");
    let report = validate_tables(&dataset.to_tables(), false);

    let mut names = failing_names(&report);
    names.sort();
    assert_eq!(
        names,
        vec![
            "purchase_orders.allowed_values:currency",
            "purchase_orders.allowed_values:status",
            "purchase_orders.numeric_min:total_amount",
            "purchase_orders.po_totals_reconcile",
            "suppliers.allowed_values:status",
        ]
    );
    assert_eq!(report.summary().critical_failed, 0);
    assert_eq!(report.exit_status(), ExitStatus::Success);
}

#[test]
fn test_sample_failures_capped_at_five() {
    let mut dataset = MockDataset::clean();
    for i in 0..8 {
        dataset = dataset.with_row(TableName::PoLines, &format!("{},1003,101,0,0.00,0.00", 6000 + i));
    }
    let report = validate_tables(&dataset.to_tables(), false);

    let qty = find(&report, TableName::PoLines, "numeric_min:qty");
    assert_eq!(qty.failed_count, 8);
    assert_eq!(qty.sample_failures.len(), 5);
    assert_eq!(qty.sample_failures[0]["qty"], Value::Integer(0));
}

#[test]
fn test_missing_table_fails_dependent_checks_critically() {
    let report = validate_tables(&MockDataset::clean().without(TableName::Parts).to_tables(), false);

    let mut names = failing_names(&report);
    names.sort();
    assert_eq!(
        names,
        vec![
            "parts.allowed_values:is_active",
            "parts.not_null:part_id",
            "parts.primary_key_unique",
            "parts.required_columns",
            "po_lines.fk_exists:part_id->part_id",
        ]
    );
    for result in report.results.iter().filter(|r| !r.passed) {
        assert_eq!(result.severity, Severity::Critical);
        assert_eq!(result.sample_failures.len() as u64, result.failed_count.min(5));
    }
}

// Ordering and determinism

#[test]
fn test_reversed_catalog_yields_same_summary() {
    let tables = MockDataset::clean()
        .with_row(TableName::PoLines, "5001,1002,999,-1,5.00,7.00")
        .with_replaced(TableName::Parts, "Gasket Kit,ASSEMBLY,EA,0", "Gasket Kit,ASSEMBLY,EA,2")
        .to_tables();

    let mut forward = CheckOrchestrator::new(OrchestratorConfig::default());
    forward.register_rules(create_catalog());
    let mut reversed = CheckOrchestrator::new(OrchestratorConfig::default());
    reversed.register_rules(create_catalog().into_iter().rev().collect());

    let forward = forward.run_all(&tables);
    let reversed = reversed.run_all(&tables);

    assert!(forward.summary().critical_failed > 0);
    assert_eq!(forward.summary(), reversed.summary());

    let mut backwards = reversed.results.clone();
    backwards.reverse();
    assert_eq!(forward.results, backwards);
}

#[test]
fn test_parallel_matches_sequential() {
    let tables = MockDataset::clean()
        .with_row(TableName::PoLines, "5001,1009,101,3,1.00,3.50")
        .to_tables();

    let sequential = validate_tables(&tables, false);
    let parallel = validate_tables(&tables, true);

    assert_eq!(sequential.results, parallel.results);
    assert_eq!(sequential.summary(), parallel.summary());
}

#[test]
fn test_repeated_runs_are_identical() {
    let tables = MockDataset::clean()
        .with_row(TableName::PoLines, "5001,1001,101,1,1.00,2.00")
        .to_tables();
    let render = |report: &ValidationReport| {
        (
            JsonFormatter::new(true).format(report).unwrap(),
            CsvFormatter.format(report).unwrap(),
        )
    };

    let first = render(&validate_tables(&tables, false));
    let second = render(&validate_tables(&tables, false));
    assert_eq!(first.0, second.0);
    assert_eq!(first.1, second.1);
}

#[test]
fn test_repeated_runs_write_identical_artifacts() {
    let root = MockDataset::clean()
        .with_row(TableName::PoLines, "5001,1001,101,1,1.00,2.00")
        .in_tempdir();
    let config = QualityConfig {
        data_dir: root.path().join("data"),
        out_dir: root.path().join("reports"),
        parallel: false,
    };

    let read_artifacts = || {
        run_validation(&config).unwrap();
        (
            fs::read(config.out_dir.join(JSON_REPORT_FILE)).unwrap(),
            fs::read(config.out_dir.join(CSV_REPORT_FILE)).unwrap(),
        )
    };
    assert_eq!(read_artifacts(), read_artifacts());
}

#[test]
fn test_text_in_numeric_column_is_not_critical() {
    let dataset = MockDataset::clean()
        .with_replaced(TableName::PoLines, "5001,1001,101,10,50.00", "5001,1001,101,ten,50.00");
    let report = validate_tables(&dataset.to_tables(), false);

    assert!(find(&report, TableName::PoLines, "numeric_min:qty").passed);
    assert!(find(&report, TableName::PoLines, "line_amount_math").passed);
    assert!(failing_names(&report).is_empty(), "{:?}", failing_names(&report));
    assert_eq!(report.exit_status(), ExitStatus::Success);
}

// On-disk entry points

#[test]
fn test_run_validation_writes_reports() {
    let root = MockDataset::clean().in_tempdir();
    let config = QualityConfig {
        data_dir: root.path().join("data"),
        out_dir: root.path().join("out").join("reports"),
        parallel: false,
    };

    let (report, run) = run_validation(&config).unwrap();
    assert_eq!(report.results.len(), 27);
    assert_eq!(run.summary, report.summary());
    assert!(std::path::Path::new(&run.json_report).is_file());
    assert!(std::path::Path::new(&run.csv_report).is_file());
}

#[test]
fn test_run_checks_missing_file_is_execution_error() {
    let root = MockDataset::clean().without(TableName::PoLines).in_tempdir();
    let config = QualityConfig {
        data_dir: root.path().join("data"),
        ..Default::default()
    };

    let outcome = run_checks(&config).map(|report| report.summary());
    assert!(matches!(outcome, Err(QualityError::MissingInput { .. })));
    assert_eq!(ExitStatus::decide(&outcome), ExitStatus::ExecutionError);
    assert_eq!(ExitStatus::decide(&outcome).code(), 2);
}

#[test]
fn test_run_checks_malformed_row_is_execution_error() {
    let root = MockDataset::clean()
        .with_row(TableName::Suppliers, "4,Delta Tools,ACTIVE")
        .in_tempdir();
    let config = QualityConfig {
        data_dir: root.path().join("data"),
        ..Default::default()
    };

    match run_checks(&config) {
        Err(QualityError::Parse { table, line, .. }) => {
            assert_eq!(table, "suppliers");
            assert_eq!(line, 5);
        }
        other => panic!("expected parse error, got {:?}", other.map(|r| r.summary())),
    }
}
