//! Console output for scanner runs.
//!
//! Stdout carries a progress trace, a short human summary and finally the
//! pretty-printed JSON result object. Colors only touch the human parts.

use crate::profile::Naming;
use crate::rotation::store::format_timestamp;
use crate::rotation::{Rotation, RotationState};
use crate::types::{Advisory, Severity};
use crate::worker::{Outcome, Progress};
use anyhow::Result;
use colored::Colorize;

/// Prints one progress line.
pub fn print_progress(naming: &Naming, progress: Progress<'_>) {
    match progress {
        Progress::Unit(unit) => println!("{}: {}", naming.analyzing, unit.bold()),
        Progress::Step(step) => println!("  {}", step.dimmed()),
    }
}

/// Prints the human summary followed by the JSON result.
///
/// # Errors
/// Returns error if the result cannot be serialized.
pub fn print_outcome(outcome: &Outcome, naming: &Naming) -> Result<()> {
    if let Outcome::Analyzed(record) = outcome {
        println!("{} Analysis complete: {}", "[OK]".green().bold(), record.unit);
        if let Some(coverage) = record.estimated_coverage {
            println!("  Estimated coverage: ~{coverage}% (test lines / source lines)");
        }
        println!("  Found {} {}", record.advisories.len(), naming.findings);
        if !record.advisories.is_empty() {
            println!("\n{}", naming.heading.bold());
            for advisory in &record.advisories {
                println!("{}", format_advisory(advisory));
            }
        }
    }
    println!("\n{}", render_json(outcome, naming)?);
    Ok(())
}

/// Pretty JSON for the final result object.
///
/// # Errors
/// Returns error if serialization fails.
pub fn render_json(outcome: &Outcome, naming: &Naming) -> Result<String> {
    Ok(serde_json::to_string_pretty(&outcome.document(naming))?)
}

fn format_advisory(a: &Advisory) -> String {
    let kind = match a.severity {
        Severity::High => a.kind.red().bold(),
        Severity::Medium => a.kind.yellow(),
        Severity::Low => a.kind.normal(),
    };
    format!("  - {kind}: {}", a.suggestion)
}

/// Prints where a scanner's rotation stands without running it.
pub fn print_status(naming: &Naming, state: Option<&RotationState>, units: &[String]) {
    for line in status_lines(naming, state, units) {
        println!("{line}");
    }
}

fn status_lines(naming: &Naming, state: Option<&RotationState>, units: &[String]) -> Vec<String> {
    let mut lines = vec![naming.scanner.bold().to_string()];
    let Some(state) = state else {
        let first = units.first().map_or("-", String::as_str);
        lines.push(format!("  never run; next {}: {first}", naming.unit_key));
        return lines;
    };

    // Same choice the next run makes, including the wrap for a stale index.
    match Rotation::new(naming.scanner, units) {
        Ok(rotation) => {
            let next = rotation.select(state);
            lines.push(format!(
                "  next {}: {} (index {} of {})",
                naming.unit_key,
                next.unit,
                next.index,
                units.len()
            ));
        }
        Err(_) => lines.push(format!("  next {}: -", naming.unit_key)),
    }
    let last = state
        .last_run
        .map_or_else(|| "never".to_string(), |t| format_timestamp(&t));
    lines.push(format!("  last run: {last}"));
    lines.push(format!(
        "  visited: {}/{} [{}]",
        state.completed_units.len(),
        units.len(),
        state.completed_units.join(", ")
    ));
    lines
}
