//! Check execution orchestrator.
//!
//! Runs registered rules against one [`TableSet`] and aggregates the results
//! in registration order.
//!
//! # Graceful Degradation
//!
//! This module handles errors gracefully:
//! - Evaluator panics: Caught via std::panic::catch_unwind, converted to a
//!   failed CRITICAL result
//! - Missing tables or columns: Reported by the evaluator as failed results
//! - Empty rule list: Returns an empty report (not an error)
//!
//! Every registered rule yields exactly one result. Tables are only read, so
//! parallel mode needs no locking and produces the same report as sequential
//! mode.

use crate::checks::catalog::RuleSpec;
use crate::checks::evaluate;
use crate::data::TableSet;
use crate::engine::result::{CheckResult, ResultAggregator, Severity, ValidationReport};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub parallel: bool,
    pub max_parallel: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        OrchestratorConfig {
            parallel: false,
            max_parallel: 4,
        }
    }
}

/// Check orchestrator
pub struct CheckOrchestrator {
    config: OrchestratorConfig,
    rules: Vec<RuleSpec>,
}

impl CheckOrchestrator {
    /// Create a new orchestrator with the given configuration
    pub fn new(config: OrchestratorConfig) -> Self {
        CheckOrchestrator {
            config,
            rules: Vec::new(),
        }
    }

    /// Register rules for execution
    pub fn register_rules(&mut self, rules: Vec<RuleSpec>) {
        self.rules.extend(rules);
    }

    /// Run all registered rules
    pub fn run_all(&self, tables: &TableSet) -> ValidationReport {
        let start = Instant::now();
        let mut aggregator = ResultAggregator::new();

        if self.config.parallel {
            self.run_parallel(tables, &mut aggregator);
        } else {
            self.run_sequential(tables, &mut aggregator);
        }

        aggregator.set_duration(start.elapsed().as_millis() as u64);

        let summary = aggregator.get_summary();
        info!(
            total = summary.total_checks,
            passed = summary.passed,
            failed = summary.failed,
            critical_failed = summary.critical_failed,
            "validation complete"
        );

        aggregator.into_report()
    }

    /// Run rules sequentially
    fn run_sequential(&self, tables: &TableSet, aggregator: &mut ResultAggregator) {
        for rule in &self.rules {
            aggregator.add_result(execute_rule(rule, tables));
        }
    }

    /// Run rules on scoped threads, batch by batch, keeping registration order
    fn run_parallel(&self, tables: &TableSet, aggregator: &mut ResultAggregator) {
        let batch_size = self.config.max_parallel.max(1);

        for batch in self.rules.chunks(batch_size) {
            let results: Vec<CheckResult> = thread::scope(|s| {
                let handles: Vec<_> = batch
                    .iter()
                    .map(|rule| (rule, s.spawn(move || execute_rule(rule, tables))))
                    .collect();

                handles
                    .into_iter()
                    .map(|(rule, handle)| {
                        // execute_rule catches panics, so join only fails if that guard did
                        handle
                            .join()
                            .unwrap_or_else(|_| panicked(rule, "evaluation thread panicked"))
                    })
                    .collect()
            });

            for result in results {
                aggregator.add_result(result);
            }
        }
    }
}

/// Evaluate one rule, converting a panic into a failed CRITICAL result
pub fn execute_rule(rule: &RuleSpec, tables: &TableSet) -> CheckResult {
    let start = Instant::now();
    let outcome = catch_unwind(AssertUnwindSafe(|| evaluate(rule, tables)));

    let result = match outcome {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            panicked(rule, &message)
        }
    };

    debug!(
        check = %result.check_name,
        table = %result.table,
        passed = result.passed,
        failed_count = result.failed_count,
        elapsed_us = start.elapsed().as_micros() as u64,
        "check evaluated"
    );

    if !result.passed {
        warn!(
            check = %result.check_name,
            table = %result.table,
            severity = %result.severity,
            failed_count = result.failed_count,
            "check failed"
        );
    }

    result
}

fn panicked(rule: &RuleSpec, message: &str) -> CheckResult {
    CheckResult::unavailable(
        rule.check_name(),
        rule.table,
        Severity::Critical,
        format!("check panicked during execution: {}", message),
    )
}
