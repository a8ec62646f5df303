// src/rotation/store.rs
//! Persistence for [`RotationState`].

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use super::RotationState;
use crate::error::{Result, SweepError};

/// Where rotation state lives between runs.
pub trait StateStore {
    /// Loads the stored state, or `None` if nothing has been stored yet.
    ///
    /// # Errors
    /// Returns [`SweepError::CorruptState`] if stored data cannot be interpreted,
    /// or an I/O error if it cannot be read.
    fn load(&self) -> Result<Option<RotationState>>;

    /// Replaces the stored state.
    ///
    /// # Errors
    /// Returns error if the state cannot be written.
    fn save(&self, state: &RotationState) -> Result<()>;

    /// Sets aside unreadable stored data before it gets overwritten.
    ///
    /// # Errors
    /// Returns error if the data cannot be moved aside.
    fn preserve_corrupt(&self) -> Result<Option<PathBuf>> {
        Ok(None)
    }
}

/// Pretty-printed JSON file, replaced atomically on save.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    completed_key: &'static str,
}

impl JsonFileStore {
    /// `completed_key` names the history list on disk (`completed_modules`, `completed_crates`).
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, completed_key: &'static str) -> Self {
        Self {
            path: path.into(),
            completed_key,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn corrupt(&self, message: impl Into<String>) -> SweepError {
        SweepError::CorruptState {
            path: self.path.clone(),
            message: message.into(),
        }
    }

    fn parse(&self, content: &str) -> Result<RotationState> {
        let value: Value =
            serde_json::from_str(content).map_err(|e| self.corrupt(e.to_string()))?;
        let obj = value
            .as_object()
            .ok_or_else(|| self.corrupt("expected a JSON object"))?;

        let index = obj
            .get("current_index")
            .and_then(Value::as_i64)
            .ok_or_else(|| self.corrupt("current_index missing or not an integer"))?;
        // Negative indices are out of range too; the controller wraps them.
        let current_index = usize::try_from(index).unwrap_or(usize::MAX);

        let completed_units = match obj.get(self.completed_key) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|v| v.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| self.corrupt(format!("{} must hold strings", self.completed_key)))?,
            Some(_) => return Err(self.corrupt(format!("{} must be a list", self.completed_key))),
        };

        let last_run = match obj.get("last_analyzed") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(
                DateTime::parse_from_rfc3339(s)
                    .map_err(|e| self.corrupt(format!("last_analyzed: {e}")))?
                    .with_timezone(&Utc),
            ),
            Some(_) => return Err(self.corrupt("last_analyzed must be a string or null")),
        };

        Ok(RotationState {
            current_index,
            completed_units,
            last_run,
        })
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> Result<Option<RotationState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content =
            fs::read_to_string(&self.path).map_err(|e| SweepError::io(e, &self.path))?;
        self.parse(&content).map(Some)
    }

    fn save(&self, state: &RotationState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| SweepError::io(e, parent))?;
        }
        let doc = StateDocument {
            state,
            completed_key: self.completed_key,
        };
        let content = serde_json::to_string_pretty(&doc).map_err(|source| SweepError::Json {
            source,
            path: self.path.clone(),
        })?;
        atomic_write(&self.path, &content)
    }

    fn preserve_corrupt(&self) -> Result<Option<PathBuf>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let backup = self.path.with_extension("json.bak");
        fs::copy(&self.path, &backup).map_err(|e| SweepError::io(e, &backup))?;
        Ok(Some(backup))
    }
}

/// On-disk layout: `current_index`, the history list, `last_analyzed`, in that order.
struct StateDocument<'a> {
    state: &'a RotationState,
    completed_key: &'static str,
}

impl Serialize for StateDocument<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("current_index", &self.state.current_index)?;
        map.serialize_entry(self.completed_key, &self.state.completed_units)?;
        map.serialize_entry(
            "last_analyzed",
            &self.state.last_run.map(|t| format_timestamp(&t)),
        )?;
        map.end()
    }
}

/// RFC 3339 with microseconds and an explicit `+00:00` offset.
#[must_use]
pub fn format_timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, false)
}

fn atomic_write(path: &Path, content: &str) -> Result<()> {
    let temp_path = path.with_extension("json.tmp");

    fs::write(&temp_path, content).map_err(|e| SweepError::io(e, &temp_path))?;
    fs::rename(&temp_path, path).map_err(|e| SweepError::io(e, path))?;

    Ok(())
}

/// In-process store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RefCell<Option<RotationState>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_state(state: RotationState) -> Self {
        Self {
            state: RefCell::new(Some(state)),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<RotationState> {
        self.state.borrow().clone()
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<RotationState>> {
        Ok(self.state.borrow().clone())
    }

    fn save(&self, state: &RotationState) -> Result<()> {
        *self.state.borrow_mut() = Some(state.clone());
        Ok(())
    }
}
