// src/types.rs
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// How urgently an advisory should be looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        f.write_str(s)
    }
}

/// A single suggestion or gap produced by a threshold rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advisory {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub suggestion: String,
}

impl Advisory {
    /// Creates an advisory without a `count` field.
    #[must_use]
    pub fn new(kind: &'static str, severity: Severity, suggestion: String) -> Self {
        Self {
            kind,
            severity,
            count: None,
            suggestion,
        }
    }

    /// Attaches the measured count.
    #[must_use]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

/// Metric name to value, kept in measurement order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metrics {
    entries: Vec<(&'static str, usize)>,
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a metric, replacing any earlier value under the same name.
    pub fn insert(&mut self, name: &'static str, value: usize) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<usize> {
        self.entries.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.entries.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<const N: usize> From<[(&'static str, usize); N]> for Metrics {
    fn from(pairs: [(&'static str, usize); N]) -> Self {
        let mut m = Self::new();
        for (name, value) in pairs {
            m.insert(name, value);
        }
        m
    }
}

impl Serialize for Metrics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
