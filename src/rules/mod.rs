// src/rules/mod.rs
//! Threshold rules over measured metrics.
//!
//! A rule is a named pure function: it reads the metrics of one unit and
//! either stays silent or returns a single advisory. Rule sets are evaluated
//! in declaration order and never share state.

pub mod optimize;
pub mod testgaps;

use crate::types::{Advisory, Metrics};

/// What a rule gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub unit: &'a str,
    pub metrics: &'a Metrics,
}

impl<'a> RuleInput<'a> {
    #[must_use]
    pub fn new(unit: &'a str, metrics: &'a Metrics) -> Self {
        Self { unit, metrics }
    }

    /// Reads a metric. Rules whose inputs were never measured do not fire.
    #[must_use]
    pub fn metric(&self, name: &str) -> Option<usize> {
        self.metrics.get(name)
    }
}

/// A single named threshold check.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub check: fn(&RuleInput<'_>) -> Option<Advisory>,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// An ordered collection of rules.
#[derive(Debug, Clone, Copy)]
pub struct RuleSet {
    rules: &'static [Rule],
}

impl RuleSet {
    #[must_use]
    pub const fn new(rules: &'static [Rule]) -> Self {
        Self { rules }
    }

    /// Runs every rule in order and collects the advisories that fired.
    #[must_use]
    pub fn evaluate(&self, input: &RuleInput<'_>) -> Vec<Advisory> {
        self.rules.iter().filter_map(|rule| (rule.check)(input)).collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|r| r.name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// `part < whole / divisor` without losing the fraction.
#[must_use]
pub(crate) fn below_fraction(part: usize, whole: usize, divisor: usize) -> bool {
    part.saturating_mul(divisor) < whole
}
