//! Validation engine.
//!
//! Runs catalog rules against a table set and turns the results into a
//! report, a summary and an exit status.

pub mod orchestrator;
pub mod result;
