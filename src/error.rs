// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("I/O error: {source} (path: {path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("JSON error: {source} (path: {path})")]
    Json {
        source: serde_json::Error,
        path: PathBuf,
    },

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("Invalid config {path}: {message}")]
    Config {
        path: PathBuf,
        message: String,
    },

    #[error("Corrupt state file {path}: {message}")]
    CorruptState {
        path: PathBuf,
        message: String,
    },

    #[error("Scanner '{0}' has no units configured")]
    EmptyUnitList(String),
}

pub type Result<T> = std::result::Result<T, SweepError>;

impl SweepError {
    /// Wraps an I/O error with the path it happened on.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        SweepError::Io {
            source,
            path: path.into(),
        }
    }
}
