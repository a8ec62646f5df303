// src/rotation/mod.rs
//! Round-robin rotation over a fixed unit list.
//!
//! State is a plain value. The controller never touches disk; loading and
//! saving go through [`store::StateStore`].

pub mod store;

use chrono::{DateTime, Utc};

use crate::error::{Result, SweepError};

pub use store::{JsonFileStore, MemoryStore, StateStore};

/// Persisted rotation pointer plus a little history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationState {
    /// Index of the unit the next run analyzes.
    pub current_index: usize,
    /// Units analyzed at least once, in first-visit order.
    pub completed_units: Vec<String>,
    /// When the last run finished.
    pub last_run: Option<DateTime<Utc>>,
}

impl RotationState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `unit` to the history unless it is already there.
    pub fn record_completed(&mut self, unit: &str) {
        if !self.completed_units.iter().any(|u| u == unit) {
            self.completed_units.push(unit.to_string());
        }
    }
}

/// The unit chosen for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection<'a> {
    pub index: usize,
    pub unit: &'a str,
}

/// Picks units and advances the pointer.
#[derive(Debug, Clone, Copy)]
pub struct Rotation<'a> {
    units: &'a [String],
}

impl<'a> Rotation<'a> {
    /// # Errors
    /// Returns error if `units` is empty.
    pub fn new(scanner: &str, units: &'a [String]) -> Result<Self> {
        if units.is_empty() {
            return Err(SweepError::EmptyUnitList(scanner.to_string()));
        }
        Ok(Self { units })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Selects the unit at the stored index, wrapping to 0 if the index is out of range.
    #[must_use]
    pub fn select(&self, state: &RotationState) -> Selection<'a> {
        let index = if state.current_index < self.units.len() {
            state.current_index
        } else {
            0
        };
        Selection {
            index,
            unit: &self.units[index],
        }
    }

    /// Returns the state after `selection` has been processed.
    #[must_use]
    pub fn advance(
        &self,
        mut state: RotationState,
        selection: Selection<'_>,
        now: DateTime<Utc>,
    ) -> RotationState {
        state.current_index = (selection.index + 1) % self.units.len();
        state.last_run = Some(now);
        state.record_completed(selection.unit);
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_empty_unit_list_rejected() {
        let none: Vec<String> = Vec::new();
        assert!(matches!(
            Rotation::new("optimize", &none),
            Err(SweepError::EmptyUnitList(_))
        ));
    }

    #[test]
    fn test_full_cycle_visits_each_unit_once() {
        let list = units(&["a", "b", "c", "d"]);
        let rotation = Rotation::new("t", &list).unwrap();

        for start in 0..list.len() {
            let mut state = RotationState { current_index: start, ..RotationState::new() };
            let mut seen = Vec::new();
            for _ in 0..list.len() {
                let sel = rotation.select(&state);
                seen.push(sel.unit.to_string());
                state = rotation.advance(state, sel, Utc::now());
            }
            seen.sort();
            assert_eq!(seen, list);
            assert_eq!(state.current_index, start);
        }
    }

    #[test]
    fn test_out_of_range_index_wraps_to_zero() {
        let list = units(&["a", "b", "c"]);
        let rotation = Rotation::new("t", &list).unwrap();
        let state = RotationState { current_index: 7, ..RotationState::new() };

        let sel = rotation.select(&state);
        assert_eq!(sel.index, 0);
        assert_eq!(sel.unit, "a");

        let next = rotation.advance(state, sel, Utc::now());
        assert_eq!(next.current_index, 1);
    }

    #[test]
    fn test_history_suppresses_duplicates() {
        let list = units(&["a", "b"]);
        let rotation = Rotation::new("t", &list).unwrap();
        let mut state = RotationState::new();
        for _ in 0..5 {
            let sel = rotation.select(&state);
            state = rotation.advance(state, sel, Utc::now());
        }
        assert_eq!(state.completed_units, list);
        assert!(state.last_run.is_some());
    }
}
