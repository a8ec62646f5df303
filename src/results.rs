// src/results.rs
//! Append-only JSON-Lines log of analysis records.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::{Result, SweepError};
use crate::profile::Naming;
use crate::rotation::store::format_timestamp;
use crate::types::{Advisory, Metrics};

/// Everything one run found out about one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRecord {
    pub timestamp: DateTime<Utc>,
    pub unit: String,
    pub advisories: Vec<Advisory>,
    pub metrics: Metrics,
    /// Present only for scanners that estimate coverage.
    pub estimated_coverage: Option<usize>,
}

impl AnalysisRecord {
    /// Pairs the record with the field names of the scanner that produced it.
    #[must_use]
    pub fn document<'a>(&'a self, naming: &'a Naming) -> RecordDocument<'a> {
        RecordDocument {
            record: self,
            naming,
        }
    }
}

/// Serializable view of a record, keyed the way its scanner names things.
pub struct RecordDocument<'a> {
    record: &'a AnalysisRecord,
    naming: &'a Naming,
}

impl Serialize for RecordDocument<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let r = self.record;
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("timestamp", &format_timestamp(&r.timestamp))?;
        map.serialize_entry(self.naming.unit_key, &r.unit)?;
        map.serialize_entry(self.naming.count_key, &r.advisories.len())?;
        if let Some(coverage) = r.estimated_coverage {
            map.serialize_entry("estimatedCoverage", &coverage)?;
        }
        map.serialize_entry(self.naming.list_key, &r.advisories)?;
        map.serialize_entry("metrics", &r.metrics)?;
        map.end()
    }
}

/// A JSON-Lines file that only ever grows.
#[derive(Debug, Clone)]
pub struct ResultLog {
    path: PathBuf,
}

impl ResultLog {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record as a single line.
    ///
    /// # Errors
    /// Returns error if the log cannot be opened or written.
    pub fn append(&self, record: &AnalysisRecord, naming: &Naming) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| SweepError::io(e, parent))?;
        }
        let mut line =
            serde_json::to_string(&record.document(naming)).map_err(|source| SweepError::Json {
                source,
                path: self.path.clone(),
            })?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| SweepError::io(e, &self.path))?;
        file.write_all(line.as_bytes())
            .map_err(|e| SweepError::io(e, &self.path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ScannerKind;
    use crate::types::Severity;
    use serde_json::Value;
    use tempfile::TempDir;

    fn record(coverage: Option<usize>) -> AnalysisRecord {
        AnalysisRecord {
            timestamp: Utc::now(),
            unit: "keyrx_core".into(),
            advisories: vec![Advisory::new("missing-doc-tests", Severity::Low, "x".into())],
            metrics: Metrics::from([("doc_tests", 1)]),
            estimated_coverage: coverage,
        }
    }

    #[test]
    fn test_append_only_grows() {
        let dir = TempDir::new().unwrap();
        let log = ResultLog::new(dir.path().join("metrics/testgaps-results.jsonl"));
        let naming = ScannerKind::TestGaps.naming();
        log.append(&record(Some(12)), naming).unwrap();
        log.append(&record(Some(12)), naming).unwrap();

        let text = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let v: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(v["crate"], "keyrx_core");
        assert_eq!(v["gapCount"], 1);
        assert_eq!(v["estimatedCoverage"], 12);
        assert_eq!(v["gaps"][0]["type"], "missing-doc-tests");
        assert_eq!(v["metrics"]["doc_tests"], 1);
    }

    #[test]
    fn test_optimize_keys() {
        let naming = ScannerKind::Optimize.naming();
        let rec = record(None);
        let v = serde_json::to_value(rec.document(naming)).unwrap();
        assert_eq!(v["module"], "keyrx_core");
        assert_eq!(v["suggestionCount"], 1);
        assert!(v.get("estimatedCoverage").is_none());
        assert!(v["suggestions"].is_array());
        assert!(v["timestamp"].as_str().unwrap().ends_with("+00:00"));
    }
}
