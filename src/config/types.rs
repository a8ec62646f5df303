use serde::{Deserialize, Serialize};

/// What to do when the rotation state file cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorruptStatePolicy {
    /// Keep a `.bak` copy and start over at index 0.
    #[default]
    Reset,
    /// Abort the run.
    Fail,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScannerSection {
    /// Unit directories relative to the project root, in visiting order.
    #[serde(default)]
    pub units: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepToml {
    #[serde(default = "default_state_dir")]
    pub state_dir: String,
    #[serde(default = "default_results_dir")]
    pub results_dir: String,
    #[serde(default)]
    pub on_corrupt_state: CorruptStatePolicy,
    #[serde(default)]
    pub optimize: ScannerSection,
    #[serde(default)]
    pub testgaps: ScannerSection,
}

impl Default for SweepToml {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            results_dir: default_results_dir(),
            on_corrupt_state: CorruptStatePolicy::default(),
            optimize: ScannerSection::default(),
            testgaps: ScannerSection::default(),
        }
    }
}

fn default_state_dir() -> String {
    ".sweep/state".to_string()
}

fn default_results_dir() -> String {
    ".sweep/metrics".to_string()
}
