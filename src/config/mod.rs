// src/config/mod.rs
pub mod types;

pub use self::types::{CorruptStatePolicy, ScannerSection, SweepToml};

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, SweepError};
use crate::profile::ScannerKind;

pub const CONFIG_FILE: &str = "sweep.toml";

/// Resolved settings for one invocation.
#[derive(Debug, Clone)]
pub struct Config {
    pub project_root: PathBuf,
    pub settings: SweepToml,
}

impl Config {
    /// Defaults rooted at `project_root`.
    #[must_use]
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            settings: SweepToml::default(),
        }
    }

    /// Loads `sweep.toml` from the project root, or `explicit` if given.
    ///
    /// A missing default file means defaults; a missing explicit file is an error.
    ///
    /// # Errors
    /// Returns error if the file cannot be read, is not valid TOML, or lists no units.
    pub fn load(project_root: impl Into<PathBuf>, explicit: Option<&Path>) -> Result<Self> {
        let mut config = Self::new(project_root);
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => {
                let default = config.project_root.join(CONFIG_FILE);
                if !default.exists() {
                    debug!(path = %default.display(), "no config file, using defaults");
                    return Ok(config);
                }
                default
            }
        };

        let content = fs::read_to_string(&path).map_err(|e| SweepError::io(e, &path))?;
        config.parse_toml(&path, &content)?;
        config.validate(&path)?;
        Ok(config)
    }

    fn parse_toml(&mut self, path: &Path, content: &str) -> Result<()> {
        self.settings = toml::from_str(content).map_err(|e| SweepError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    fn validate(&self, path: &Path) -> Result<()> {
        for kind in ScannerKind::ALL {
            if self.section(kind).units.as_ref().is_some_and(Vec::is_empty) {
                return Err(SweepError::Config {
                    path: path.to_path_buf(),
                    message: format!("[{kind}] units must not be empty"),
                });
            }
        }
        Ok(())
    }

    fn section(&self, kind: ScannerKind) -> &ScannerSection {
        match kind {
            ScannerKind::Optimize => &self.settings.optimize,
            ScannerKind::TestGaps => &self.settings.testgaps,
        }
    }

    /// Units for `kind`, falling back to the built-in list.
    #[must_use]
    pub fn units(&self, kind: ScannerKind) -> Vec<String> {
        self.section(kind)
            .units
            .clone()
            .unwrap_or_else(|| kind.default_units())
    }

    #[must_use]
    pub fn state_path(&self, kind: ScannerKind) -> PathBuf {
        self.project_root
            .join(&self.settings.state_dir)
            .join(format!("{kind}-progress.json"))
    }

    #[must_use]
    pub fn results_path(&self, kind: ScannerKind) -> PathBuf {
        self.project_root
            .join(&self.settings.results_dir)
            .join(format!("{kind}-results.jsonl"))
    }

    #[must_use]
    pub fn corrupt_state_policy(&self) -> CorruptStatePolicy {
        self.settings.on_corrupt_state
    }
}
