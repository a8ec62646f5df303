// src/profile.rs
//! Scanner profiles: what to measure, how to judge it, and what to call it.
//!
//! Both scanners share one worker. A profile is pure configuration: a list of
//! probes that turn a unit directory into metrics, a rule set that turns
//! metrics into advisories, and the JSON field names the scanner writes.

use std::fmt;
use std::path::Path;

use regex::Regex;
use tracing::debug;

use crate::counter::{self, RUST_AND_WEB, RUST_ONLY};
use crate::error::Result;
use crate::rules::optimize::{self as opt, is_ui_unit};
use crate::rules::testgaps::{self as gaps, estimated_coverage};
use crate::rules::RuleSet;
use crate::types::Metrics;

/// The two built-in scanners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ScannerKind {
    Optimize,
    #[value(name = "testgaps")]
    TestGaps,
}

impl ScannerKind {
    pub const ALL: [ScannerKind; 2] = [ScannerKind::Optimize, ScannerKind::TestGaps];

    /// Builds the profile for this scanner.
    ///
    /// # Errors
    /// Returns error if a built-in pattern fails to compile.
    pub fn profile(self) -> Result<Profile> {
        match self {
            Self::Optimize => optimize_profile(),
            Self::TestGaps => testgaps_profile(),
        }
    }

    #[must_use]
    pub fn naming(self) -> &'static Naming {
        match self {
            Self::Optimize => &OPTIMIZE_NAMING,
            Self::TestGaps => &TESTGAPS_NAMING,
        }
    }

    /// Unit list used when the config does not override it.
    #[must_use]
    pub fn default_units(self) -> Vec<String> {
        let units: &[&str] = match self {
            Self::Optimize => &["keyrx_core", "keyrx_daemon", "keyrx_compiler", "keyrx_ui/src"],
            Self::TestGaps => &["keyrx_core", "keyrx_daemon", "keyrx_compiler"],
        };
        units.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for ScannerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.naming().scanner)
    }
}

/// Names used in files, JSON output and console text.
#[derive(Debug)]
pub struct Naming {
    /// File stem prefix: `<scanner>-progress.json`, `<scanner>-results.jsonl`.
    pub scanner: &'static str,
    /// JSON key holding the unit name.
    pub unit_key: &'static str,
    /// Capitalized unit noun for messages ("Module not found").
    pub unit_title: &'static str,
    /// Progress line announcing the unit.
    pub analyzing: &'static str,
    /// JSON key of the advisory count.
    pub count_key: &'static str,
    /// JSON key of the advisory list.
    pub list_key: &'static str,
    /// State-file key of the visited-unit history.
    pub completed_key: &'static str,
    /// Plural noun for advisories in console text.
    pub findings: &'static str,
    /// Heading above the advisory list in the summary.
    pub heading: &'static str,
    /// Whether records carry `estimatedCoverage`.
    pub reports_coverage: bool,
}

static OPTIMIZE_NAMING: Naming = Naming {
    scanner: "optimize",
    unit_key: "module",
    unit_title: "Module",
    analyzing: "Analyzing module",
    count_key: "suggestionCount",
    list_key: "suggestions",
    completed_key: "completed_modules",
    findings: "optimization opportunities",
    heading: "Suggestions:",
    reports_coverage: false,
};

static TESTGAPS_NAMING: Naming = Naming {
    scanner: "testgaps",
    unit_key: "crate",
    unit_title: "Crate",
    analyzing: "Analyzing test coverage for",
    count_key: "gapCount",
    list_key: "gaps",
    completed_key: "completed_crates",
    findings: "test gaps",
    heading: "Gaps identified:",
    reports_coverage: true,
};

/// Part of the unit directory a probe looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Unit,
    Subdir(&'static str),
}

impl Scope {
    fn resolve(self, unit_path: &Path) -> std::path::PathBuf {
        match self {
            Self::Unit => unit_path.to_path_buf(),
            Self::Subdir(sub) => unit_path.join(sub),
        }
    }
}

/// How a probe produces its number.
#[derive(Debug, Clone)]
pub enum Measure {
    Pattern {
        regex: Regex,
        extensions: &'static [&'static str],
    },
    Lines {
        extensions: &'static [&'static str],
    },
    Files {
        glob: &'static str,
        extensions: &'static [&'static str],
    },
    /// Derived from two earlier metrics, see [`estimated_coverage`].
    Coverage {
        source: &'static str,
        tests: &'static str,
    },
}

/// One metric measurement.
#[derive(Debug, Clone)]
pub struct Probe {
    pub metric: &'static str,
    pub scope: Scope,
    pub measure: Measure,
    /// Progress line printed before this probe runs.
    pub announce: Option<&'static str>,
    /// Units this probe runs on.
    pub applies: fn(&str) -> bool,
}

fn every_unit(_: &str) -> bool {
    true
}

impl Probe {
    fn pattern(
        metric: &'static str,
        scope: Scope,
        pattern: &str,
        extensions: &'static [&'static str],
    ) -> Result<Self> {
        Ok(Self {
            metric,
            scope,
            measure: Measure::Pattern {
                regex: Regex::new(pattern)?,
                extensions,
            },
            announce: None,
            applies: every_unit,
        })
    }

    fn new(metric: &'static str, scope: Scope, measure: Measure) -> Self {
        Self {
            metric,
            scope,
            measure,
            announce: None,
            applies: every_unit,
        }
    }

    fn announce(mut self, line: &'static str) -> Self {
        self.announce = Some(line);
        self
    }

    fn only_for(mut self, applies: fn(&str) -> bool) -> Self {
        self.applies = applies;
        self
    }

    fn run(&self, unit_path: &Path, metrics: &Metrics) -> Result<usize> {
        let root = self.scope.resolve(unit_path);
        let value = match &self.measure {
            Measure::Pattern { regex, extensions } => {
                counter::count_patterns(&root, regex, extensions)
            }
            Measure::Lines { extensions } => counter::count_lines(&root, extensions),
            Measure::Files { glob, extensions } => counter::count_files(&root, glob, extensions)?,
            Measure::Coverage { source, tests } => estimated_coverage(
                metrics.get(source).unwrap_or(0),
                metrics.get(tests).unwrap_or(0),
            ),
        };
        Ok(value)
    }
}

/// A complete scanner configuration.
#[derive(Debug, Clone)]
pub struct Profile {
    pub kind: ScannerKind,
    pub probes: Vec<Probe>,
    pub rules: RuleSet,
}

impl Profile {
    #[must_use]
    pub fn naming(&self) -> &'static Naming {
        self.kind.naming()
    }

    /// Runs every applicable probe against `unit_path`, in order.
    ///
    /// # Errors
    /// Returns error if a probe is misconfigured (bad glob).
    pub fn measure<F>(&self, unit: &str, unit_path: &Path, on_progress: &F) -> Result<Metrics>
    where
        F: Fn(&str),
    {
        let mut metrics = Metrics::new();
        for probe in self.probes.iter().filter(|p| (p.applies)(unit)) {
            if let Some(line) = probe.announce {
                on_progress(line);
            }
            let value = probe.run(unit_path, &metrics)?;
            debug!(unit, metric = probe.metric, value, "measured");
            metrics.insert(probe.metric, value);
        }
        Ok(metrics)
    }
}

fn optimize_profile() -> Result<Profile> {
    use Scope::Unit;
    let probes = vec![
        Probe::pattern(opt::CLONES, Unit, r"\.clone\(\)", RUST_AND_WEB)?
            .announce("Checking for excessive clones..."),
        Probe::pattern(opt::STRING_ALLOCATIONS, Unit, r"String::from|to_string\(\)", RUST_AND_WEB)?
            .announce("Checking for string allocations..."),
        Probe::pattern(opt::N_PLUS_ONE, Unit, r"(for|while).*\.(query|execute)", RUST_AND_WEB)?
            .announce("Checking for N+1 query patterns..."),
        Probe::pattern(opt::CALLBACKS, Unit, r"(function|const\s+\w+\s*=)", RUST_AND_WEB)?
            .announce("Checking React optimizations...")
            .only_for(is_ui_unit),
        Probe::pattern(opt::MEMOIZED, Unit, r"(useCallback|useMemo|React\.memo)", RUST_AND_WEB)?
            .only_for(is_ui_unit),
        Probe::pattern(opt::INLINE_OBJECTS, Unit, r"=\{|=\[", RUST_AND_WEB)?.only_for(is_ui_unit),
        Probe::pattern(opt::ASYNC_FUNCTIONS, Unit, r"async (fn|function)", RUST_AND_WEB)?
            .announce("Checking async patterns..."),
        Probe::pattern(opt::AWAITS, Unit, r"\bawait\b", RUST_AND_WEB)?,
    ];
    Ok(Profile {
        kind: ScannerKind::Optimize,
        probes,
        rules: opt::rule_set(),
    })
}

fn testgaps_profile() -> Result<Profile> {
    const SRC: Scope = Scope::Subdir("src");
    const TESTS: Scope = Scope::Subdir("tests");
    let probes = vec![
        Probe::pattern(gaps::PUBLIC_FUNCTIONS, SRC, r"pub\s+fn\s+", RUST_ONLY)?
            .announce("Checking for untested public functions..."),
        Probe::pattern(gaps::TEST_FUNCTIONS, TESTS, r"#\[test\]", RUST_ONLY)?,
        Probe::pattern(gaps::RESULT_TYPES, SRC, r"Result<", RUST_ONLY)?
            .announce("Checking error handling coverage..."),
        Probe::pattern(
            gaps::ERROR_TESTS,
            TESTS,
            r"(should_panic|expect_err|is_err|unwrap_err)",
            RUST_ONLY,
        )?,
        Probe::new(
            gaps::INTEGRATION_TESTS,
            TESTS,
            Measure::Files { glob: "*", extensions: RUST_ONLY },
        )
        .announce("Checking integration test coverage..."),
        Probe::pattern(gaps::DOC_TESTS, SRC, r"```rust", RUST_ONLY)?
            .announce("Checking documentation test coverage..."),
        Probe::new(gaps::SOURCE_LINES, SRC, Measure::Lines { extensions: RUST_ONLY })
            .announce("Estimating coverage..."),
        Probe::new(gaps::TEST_LINES, TESTS, Measure::Lines { extensions: RUST_ONLY }),
        Probe::new(
            gaps::ESTIMATED_COVERAGE,
            Scope::Unit,
            Measure::Coverage {
                source: gaps::SOURCE_LINES,
                tests: gaps::TEST_LINES,
            },
        ),
    ];
    Ok(Profile {
        kind: ScannerKind::TestGaps,
        probes,
        rules: gaps::rule_set(),
    })
}
