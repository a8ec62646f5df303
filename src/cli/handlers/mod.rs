// src/cli/handlers/mod.rs
//! Scanner command handlers.

use crate::config::Config;
use crate::exit::SweepExit;
use crate::profile::ScannerKind;
use crate::reporting;
use crate::results::ResultLog;
use crate::rotation::{JsonFileStore, StateStore};
use crate::worker::Worker;
use anyhow::{Context as _, Result};
use std::path::PathBuf;

/// Options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Context {
    pub root: PathBuf,
    pub config: Option<PathBuf>,
}

impl Context {
    #[must_use]
    pub fn from_cli(cli: &super::Cli) -> Self {
        Self {
            root: cli.root.clone().unwrap_or_else(|| PathBuf::from(".")),
            config: cli.config.clone(),
        }
    }

    fn load_config(&self) -> Result<Config> {
        Config::load(&self.root, self.config.as_deref()).context("Failed to load config")
    }
}

/// Runs one rotation step of `kind` and prints the result.
///
/// # Errors
/// Returns error if config, state or the results log cannot be handled.
pub fn handle_scan(kind: ScannerKind, ctx: &Context) -> Result<SweepExit> {
    let config = ctx.load_config()?;
    let profile = kind.profile()?;
    let naming = profile.naming();
    let units = config.units(kind);

    let store = JsonFileStore::new(config.state_path(kind), naming.completed_key);
    let log = ResultLog::new(config.results_path(kind));

    let report = Worker::new(&profile, &units, &config.project_root, &store, &log)
        .on_corrupt_state(config.corrupt_state_policy())
        .run(&|progress| reporting::print_progress(naming, progress))
        .with_context(|| format!("{kind} scan failed"))?;

    reporting::print_outcome(&report.outcome, naming)?;
    Ok(report.outcome.exit_code())
}

/// Prints rotation progress for one or both scanners.
///
/// # Errors
/// Returns error if config or a state file cannot be read.
pub fn handle_status(kind: Option<ScannerKind>, ctx: &Context) -> Result<SweepExit> {
    let config = ctx.load_config()?;
    let kinds: Vec<ScannerKind> = kind.map_or_else(|| ScannerKind::ALL.to_vec(), |k| vec![k]);

    for (i, kind) in kinds.into_iter().enumerate() {
        if i > 0 {
            println!();
        }
        let naming = kind.naming();
        let store = JsonFileStore::new(config.state_path(kind), naming.completed_key);
        let state = store
            .load()
            .with_context(|| format!("Failed to read {}", store.path().display()))?;
        reporting::print_status(naming, state.as_ref(), &config.units(kind));
    }
    Ok(SweepExit::Success)
}
