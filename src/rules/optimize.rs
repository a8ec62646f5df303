// src/rules/optimize.rs
//! Performance hints: allocation pressure, query-in-loop shapes, React
//! memoization and await density.

use super::{below_fraction, Rule, RuleInput, RuleSet};
use crate::types::{Advisory, Severity};

pub const CLONES: &str = "clones";
pub const STRING_ALLOCATIONS: &str = "string_allocations";
pub const N_PLUS_ONE: &str = "potential_n_plus_one";
pub const CALLBACKS: &str = "callbacks";
pub const MEMOIZED: &str = "memoized";
pub const INLINE_OBJECTS: &str = "inline_objects";
pub const ASYNC_FUNCTIONS: &str = "async_functions";
pub const AWAITS: &str = "awaits";

const MAX_CLONES: usize = 50;
const MAX_STRING_ALLOCATIONS: usize = 100;
const MIN_CALLBACKS_FOR_MEMO: usize = 20;
const MAX_INLINE_OBJECTS: usize = 50;
const MIN_ASYNC_FOR_AWAIT_CHECK: usize = 10;
const AWAITS_PER_ASYNC: usize = 5;

pub static RULES: &[Rule] = &[
    Rule {
        name: "excessive-clones",
        check: excessive_clones,
    },
    Rule {
        name: "string-allocations",
        check: string_allocations,
    },
    Rule {
        name: "n+1-query",
        check: n_plus_one,
    },
    Rule {
        name: "missing-memoization",
        check: missing_memoization,
    },
    Rule {
        name: "inline-objects",
        check: inline_objects,
    },
    Rule {
        name: "sequential-awaits",
        check: sequential_awaits,
    },
];

#[must_use]
pub fn rule_set() -> RuleSet {
    RuleSet::new(RULES)
}

/// UI-only rules apply to units with `ui` anywhere in the name.
#[must_use]
pub fn is_ui_unit(unit: &str) -> bool {
    unit.to_lowercase().contains("ui")
}

fn excessive_clones(input: &RuleInput<'_>) -> Option<Advisory> {
    let n = input.metric(CLONES).filter(|&n| n > MAX_CLONES)?;
    Some(
        Advisory::new(
            "excessive-clones",
            Severity::Medium,
            format!("Found {n} .clone() calls. Review for unnecessary memory allocations."),
        )
        .with_count(n),
    )
}

fn string_allocations(input: &RuleInput<'_>) -> Option<Advisory> {
    let n = input
        .metric(STRING_ALLOCATIONS)
        .filter(|&n| n > MAX_STRING_ALLOCATIONS)?;
    Some(
        Advisory::new(
            "string-allocations",
            Severity::Low,
            format!("Found {n} string allocations. Consider using &str or Cow<str>."),
        )
        .with_count(n),
    )
}

fn n_plus_one(input: &RuleInput<'_>) -> Option<Advisory> {
    let n = input.metric(N_PLUS_ONE).filter(|&n| n > 0)?;
    Some(
        Advisory::new(
            "n+1-query",
            Severity::High,
            format!("Found {n} potential N+1 query patterns. Use batch queries or joins."),
        )
        .with_count(n),
    )
}

fn missing_memoization(input: &RuleInput<'_>) -> Option<Advisory> {
    if !is_ui_unit(input.unit) {
        return None;
    }
    let callbacks = input.metric(CALLBACKS)?;
    let memoized = input.metric(MEMOIZED)?;
    if callbacks <= MIN_CALLBACKS_FOR_MEMO || !below_fraction(memoized, callbacks, 4) {
        return None;
    }
    Some(Advisory::new(
        "missing-memoization",
        Severity::Medium,
        format!("Only {memoized} memoized out of {callbacks} functions. Use useCallback/useMemo."),
    ))
}

fn inline_objects(input: &RuleInput<'_>) -> Option<Advisory> {
    if !is_ui_unit(input.unit) {
        return None;
    }
    let n = input.metric(INLINE_OBJECTS).filter(|&n| n > MAX_INLINE_OBJECTS)?;
    Some(
        Advisory::new(
            "inline-objects",
            Severity::Low,
            format!("Found {n} inline objects/arrays. May cause re-renders."),
        )
        .with_count(n),
    )
}

fn sequential_awaits(input: &RuleInput<'_>) -> Option<Advisory> {
    let asyncs = input.metric(ASYNC_FUNCTIONS)?;
    let awaits = input.metric(AWAITS)?;
    if asyncs <= MIN_ASYNC_FOR_AWAIT_CHECK || awaits <= asyncs.saturating_mul(AWAITS_PER_ASYNC) {
        return None;
    }
    Some(Advisory::new(
        "sequential-awaits",
        Severity::Medium,
        "Potential sequential awaits detected. Consider Promise.all() for parallel operations."
            .to_string(),
    ))
}
