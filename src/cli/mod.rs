//! CLI module for argument parsing and report output.
//!
//! Arguments are parsed with clap; reports are rendered as JSON, CSV and
//! terminal text.

pub mod args;
pub mod output;
