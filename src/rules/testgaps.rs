// src/rules/testgaps.rs
//! Test coverage gaps derived from declaration and assertion counts.

use super::{below_fraction, Rule, RuleInput, RuleSet};
use crate::types::{Advisory, Severity};

pub const PUBLIC_FUNCTIONS: &str = "public_functions";
pub const TEST_FUNCTIONS: &str = "test_functions";
pub const RESULT_TYPES: &str = "result_types";
pub const ERROR_TESTS: &str = "error_tests";
pub const INTEGRATION_TESTS: &str = "integration_tests";
pub const DOC_TESTS: &str = "doc_tests";
pub const SOURCE_LINES: &str = "source_lines";
pub const TEST_LINES: &str = "test_lines";
pub const ESTIMATED_COVERAGE: &str = "estimated_coverage";

const MIN_INTEGRATION_FILES: usize = 3;
const MIN_DOC_TESTS: usize = 5;

pub static RULES: &[Rule] = &[
    Rule {
        name: "untested-functions",
        check: untested_functions,
    },
    Rule {
        name: "missing-error-tests",
        check: missing_error_tests,
    },
    Rule {
        name: "missing-integration-tests",
        check: missing_integration_tests,
    },
    Rule {
        name: "missing-doc-tests",
        check: missing_doc_tests,
    },
];

#[must_use]
pub fn rule_set() -> RuleSet {
    RuleSet::new(RULES)
}

/// Test lines as a whole-number percentage of source lines.
///
/// Returns 0 when there are no source lines.
#[must_use]
pub fn estimated_coverage(source_lines: usize, test_lines: usize) -> usize {
    if source_lines == 0 {
        return 0;
    }
    test_lines.saturating_mul(100) / source_lines
}

fn untested_functions(input: &RuleInput<'_>) -> Option<Advisory> {
    let public = input.metric(PUBLIC_FUNCTIONS)?;
    let tests = input.metric(TEST_FUNCTIONS)?;
    if public == 0 || !below_fraction(tests, public, 2) {
        return None;
    }
    Some(Advisory::new(
        "untested-functions",
        Severity::High,
        format!("{public} public functions but only {tests} tests. Add more unit tests."),
    ))
}

fn missing_error_tests(input: &RuleInput<'_>) -> Option<Advisory> {
    let results = input.metric(RESULT_TYPES)?;
    let error_tests = input.metric(ERROR_TESTS)?;
    if results == 0 || !below_fraction(error_tests, results, 3) {
        return None;
    }
    Some(Advisory::new(
        "missing-error-tests",
        Severity::High,
        format!(
            "{results} Result types but only {error_tests} error tests. Add error path testing."
        ),
    ))
}

fn missing_integration_tests(input: &RuleInput<'_>) -> Option<Advisory> {
    let n = input
        .metric(INTEGRATION_TESTS)
        .filter(|&n| n < MIN_INTEGRATION_FILES)?;
    Some(Advisory::new(
        "missing-integration-tests",
        Severity::Medium,
        format!("Only {n} integration test files. Add more end-to-end tests."),
    ))
}

fn missing_doc_tests(input: &RuleInput<'_>) -> Option<Advisory> {
    let n = input.metric(DOC_TESTS).filter(|&n| n < MIN_DOC_TESTS)?;
    Some(Advisory::new(
        "missing-doc-tests",
        Severity::Low,
        format!("Only {n} documentation tests. Add examples to public APIs."),
    ))
}
