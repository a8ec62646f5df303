// src/worker.rs
//! One scanner invocation: load rotation state, analyze one unit, log, advance.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::{info, warn};

use crate::config::CorruptStatePolicy;
use crate::error::{Result, SweepError};
use crate::exit::SweepExit;
use crate::profile::{Naming, Profile};
use crate::results::{AnalysisRecord, ResultLog};
use crate::rotation::{Rotation, RotationState, StateStore};
use crate::rules::testgaps::ESTIMATED_COVERAGE;
use crate::rules::RuleInput;

/// Progress events emitted while a run is underway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress<'a> {
    /// Analysis of a unit has started.
    Unit(&'a str),
    /// A measurement step has started.
    Step(&'a str),
}

/// What happened to the selected unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Analyzed(AnalysisRecord),
    UnitMissing { unit: String },
}

impl Outcome {
    #[must_use]
    pub fn exit_code(&self) -> SweepExit {
        match self {
            Self::Analyzed(_) => SweepExit::Success,
            Self::UnitMissing { .. } => SweepExit::UnitMissing,
        }
    }

    #[must_use]
    pub fn unit(&self) -> &str {
        match self {
            Self::Analyzed(r) => &r.unit,
            Self::UnitMissing { unit } => unit,
        }
    }

    /// Machine-readable summary printed at the end of a run.
    #[must_use]
    pub fn document<'a>(&'a self, naming: &'a Naming) -> OutcomeDocument<'a> {
        OutcomeDocument {
            outcome: self,
            naming,
        }
    }
}

/// Serializable view of an [`Outcome`].
pub struct OutcomeDocument<'a> {
    outcome: &'a Outcome,
    naming: &'a Naming,
}

impl Serialize for OutcomeDocument<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let n = self.naming;
        let mut map = serializer.serialize_map(None)?;
        match self.outcome {
            Outcome::UnitMissing { unit } => {
                map.serialize_entry("success", &false)?;
                map.serialize_entry(n.unit_key, unit)?;
                map.serialize_entry("error", &format!("{} not found", n.unit_title))?;
            }
            Outcome::Analyzed(r) => {
                map.serialize_entry("success", &true)?;
                map.serialize_entry(n.unit_key, &r.unit)?;
                map.serialize_entry(n.count_key, &r.advisories.len())?;
                if let Some(coverage) = r.estimated_coverage {
                    map.serialize_entry("estimatedCoverage", &coverage)?;
                }
                map.serialize_entry("metrics", &r.metrics)?;
                map.serialize_entry("message", &completion_message(n, r))?;
            }
        }
        map.end()
    }
}

fn completion_message(naming: &Naming, r: &AnalysisRecord) -> String {
    match r.estimated_coverage {
        Some(coverage) => format!(
            "Analyzed {}: ~{coverage}% coverage, found {} gaps",
            r.unit,
            r.advisories.len()
        ),
        None => format!(
            "Analyzed {}: found {} {}",
            r.unit,
            r.advisories.len(),
            naming.findings
        ),
    }
}

/// Result of [`Worker::run`]: the outcome plus the state that was persisted.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: Outcome,
    pub state: RotationState,
}

/// Drives one scanner profile over its unit list.
pub struct Worker<'a, S: StateStore> {
    profile: &'a Profile,
    units: &'a [String],
    project_root: &'a Path,
    store: &'a S,
    log: &'a ResultLog,
    on_corrupt: CorruptStatePolicy,
}

impl<'a, S: StateStore> Worker<'a, S> {
    #[must_use]
    pub fn new(
        profile: &'a Profile,
        units: &'a [String],
        project_root: &'a Path,
        store: &'a S,
        log: &'a ResultLog,
    ) -> Self {
        Self {
            profile,
            units,
            project_root,
            store,
            log,
            on_corrupt: CorruptStatePolicy::default(),
        }
    }

    #[must_use]
    pub fn on_corrupt_state(mut self, policy: CorruptStatePolicy) -> Self {
        self.on_corrupt = policy;
        self
    }

    /// Runs one rotation step using the current time.
    ///
    /// # Errors
    /// See [`Worker::run_at`].
    pub fn run<F>(&self, on_progress: &F) -> Result<RunReport>
    where
        F: Fn(Progress<'_>),
    {
        self.run_at(Utc::now(), on_progress)
    }

    /// Runs one rotation step with an explicit clock.
    ///
    /// A missing unit directory is an [`Outcome`], not an error; the rotation
    /// still advances past it.
    ///
    /// # Errors
    /// Returns error if the unit list is empty, state cannot be loaded or saved
    /// (subject to the corrupt-state policy), or the results log cannot be written.
    pub fn run_at<F>(&self, now: DateTime<Utc>, on_progress: &F) -> Result<RunReport>
    where
        F: Fn(Progress<'_>),
    {
        let naming = self.profile.naming();
        let rotation = Rotation::new(naming.scanner, self.units)?;
        let state = self.load_state()?;

        let selection = rotation.select(&state);
        if selection.index != state.current_index {
            warn!(
                scanner = naming.scanner,
                stored = state.current_index,
                units = rotation.len(),
                "rotation index out of range, wrapping to 0"
            );
        }

        let outcome = self.analyze(selection.unit, now, on_progress)?;

        let state = rotation.advance(state, selection, now);
        self.store.save(&state)?;
        info!(
            scanner = naming.scanner,
            unit = selection.unit,
            next_index = state.current_index,
            "rotation advanced"
        );

        Ok(RunReport { outcome, state })
    }

    fn load_state(&self) -> Result<RotationState> {
        match self.store.load() {
            Ok(Some(state)) => Ok(state),
            Ok(None) => {
                let state = RotationState::new();
                self.store.save(&state)?;
                Ok(state)
            }
            Err(err @ SweepError::CorruptState { .. }) => match self.on_corrupt {
                CorruptStatePolicy::Fail => Err(err),
                CorruptStatePolicy::Reset => {
                    let backup = self.store.preserve_corrupt()?;
                    warn!(
                        error = %err,
                        backup = ?backup,
                        "resetting unreadable rotation state"
                    );
                    Ok(RotationState::new())
                }
            },
            Err(err) => Err(err),
        }
    }

    fn analyze<F>(&self, unit: &str, now: DateTime<Utc>, on_progress: &F) -> Result<Outcome>
    where
        F: Fn(Progress<'_>),
    {
        let unit_path = self.project_root.join(unit);
        if !unit_path.exists() {
            warn!(unit, path = %unit_path.display(), "unit directory not found");
            return Ok(Outcome::UnitMissing {
                unit: unit.to_string(),
            });
        }

        on_progress(Progress::Unit(unit));
        let metrics = self
            .profile
            .measure(unit, &unit_path, &|line| on_progress(Progress::Step(line)))?;
        let advisories = self.profile.rules.evaluate(&RuleInput::new(unit, &metrics));

        let naming = self.profile.naming();
        let estimated_coverage = if naming.reports_coverage {
            Some(metrics.get(ESTIMATED_COVERAGE).unwrap_or(0))
        } else {
            None
        };

        let record = AnalysisRecord {
            timestamp: now,
            unit: unit.to_string(),
            advisories,
            metrics,
            estimated_coverage,
        };
        self.log.append(&record, naming)?;
        Ok(Outcome::Analyzed(record))
    }
}
