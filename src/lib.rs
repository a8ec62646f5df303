//! Incremental heuristic scanners.
//!
//! Each invocation analyzes exactly one unit (a crate or module directory)
//! from a fixed list, appends one JSON line to a results log and advances a
//! persisted round-robin pointer. Detection is regex over raw text; the
//! advisories are hints, not findings.

pub mod cli;
pub mod config;
pub mod counter;
pub mod error;
pub mod exit;
pub mod logging;
pub mod profile;
pub mod reporting;
pub mod results;
pub mod rotation;
pub mod rules;
pub mod types;
pub mod worker;
