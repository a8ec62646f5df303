// tests/integration_scan.rs
//! End-to-end runs of both scanners against scratch project trees.

use anyhow::Result;
use serde_json::Value;
use std::fs;
use std::path::Path;
use sweep_core::config::{Config, CorruptStatePolicy};
use sweep_core::profile::ScannerKind;
use sweep_core::results::ResultLog;
use sweep_core::rotation::{JsonFileStore, StateStore};
use sweep_core::types::Severity;
use sweep_core::worker::{Outcome, RunReport, Worker};
use tempfile::TempDir;

// --- Helpers ---

fn run(root: &Path, kind: ScannerKind, units: &[&str]) -> Result<RunReport> {
    run_with_policy(root, kind, units, CorruptStatePolicy::Reset)
}

fn run_with_policy(
    root: &Path,
    kind: ScannerKind,
    units: &[&str],
    policy: CorruptStatePolicy,
) -> Result<RunReport> {
    let config = Config::new(root);
    let profile = kind.profile()?;
    let units: Vec<String> = units.iter().map(ToString::to_string).collect();
    let store = JsonFileStore::new(config.state_path(kind), profile.naming().completed_key);
    let log = ResultLog::new(config.results_path(kind));
    let report = Worker::new(&profile, &units, root, &store, &log)
        .on_corrupt_state(policy)
        .run(&|_| {})?;
    Ok(report)
}

fn log_lines(root: &Path, kind: ScannerKind) -> Result<Vec<Value>> {
    let text = fs::read_to_string(Config::new(root).results_path(kind))?;
    Ok(text
        .lines()
        .map(serde_json::from_str::<Value>)
        .collect::<std::result::Result<Vec<_>, _>>()?)
}

fn state_json(root: &Path, kind: ScannerKind) -> Result<Value> {
    let text = fs::read_to_string(Config::new(root).state_path(kind))?;
    Ok(serde_json::from_str(&text)?)
}

// --- Optimize scanner ---

#[test]
fn excessive_clones_reported_once_with_count() -> Result<()> {
    let dir = TempDir::new()?;
    fs::create_dir_all(dir.path().join("core/src"))?;
    fs::write(dir.path().join("core/src/lib.rs"), "x.clone();\n".repeat(51))?;

    let report = run(dir.path(), ScannerKind::Optimize, &["core"])?;
    let Outcome::Analyzed(record) = report.outcome else {
        panic!("expected analysis");
    };
    assert_eq!(record.advisories.len(), 1);
    let advisory = &record.advisories[0];
    assert_eq!(advisory.kind, "excessive-clones");
    assert_eq!(advisory.severity, Severity::Medium);
    assert_eq!(advisory.count, Some(51));

    let lines = log_lines(dir.path(), ScannerKind::Optimize)?;
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["module"], "core");
    assert_eq!(lines[0]["suggestionCount"], 1);
    assert_eq!(lines[0]["suggestions"][0]["count"], 51);
    assert_eq!(lines[0]["metrics"]["clones"], 51);
    Ok(())
}

#[test]
fn fifty_clones_is_not_excessive() -> Result<()> {
    let dir = TempDir::new()?;
    fs::create_dir_all(dir.path().join("core"))?;
    fs::write(dir.path().join("core/a.rs"), "x.clone();\n".repeat(25))?;
    fs::write(dir.path().join("core/b.ts"), "y.clone();\n".repeat(25))?;

    let report = run(dir.path(), ScannerKind::Optimize, &["core"])?;
    let Outcome::Analyzed(record) = report.outcome else {
        panic!("expected analysis");
    };
    assert_eq!(record.metrics.get("clones"), Some(50));
    assert!(record.advisories.is_empty());
    Ok(())
}

#[test]
fn missing_unit_fails_but_rotation_advances() -> Result<()> {
    let dir = TempDir::new()?;
    fs::create_dir_all(dir.path().join("present"))?;
    let units = ["absent", "present"];

    let first = run(dir.path(), ScannerKind::Optimize, &units)?;
    assert_eq!(first.outcome, Outcome::UnitMissing { unit: "absent".into() });
    assert_eq!(state_json(dir.path(), ScannerKind::Optimize)?["current_index"], 1);
    assert!(!Config::new(dir.path())
        .results_path(ScannerKind::Optimize)
        .exists());

    let second = run(dir.path(), ScannerKind::Optimize, &units)?;
    assert_eq!(second.outcome.unit(), "present");
    assert_eq!(state_json(dir.path(), ScannerKind::Optimize)?["current_index"], 0);
    Ok(())
}

#[test]
fn full_rotation_visits_every_unit() -> Result<()> {
    let dir = TempDir::new()?;
    let units = ["a", "b", "c"];
    for u in units {
        fs::create_dir_all(dir.path().join(u))?;
    }

    let mut visited = Vec::new();
    for _ in 0..units.len() {
        visited.push(run(dir.path(), ScannerKind::Optimize, &units)?.outcome.unit().to_string());
    }
    assert_eq!(visited, units);

    let state = state_json(dir.path(), ScannerKind::Optimize)?;
    assert_eq!(state["current_index"], 0);
    assert_eq!(state["completed_modules"], serde_json::json!(["a", "b", "c"]));
    assert!(state["last_analyzed"].is_string());
    Ok(())
}

#[test]
fn reruns_differ_only_in_timestamp() -> Result<()> {
    let dir = TempDir::new()?;
    fs::create_dir_all(dir.path().join("ui/src"))?;
    fs::write(
        dir.path().join("ui/src/App.tsx"),
        "const a = () => {};\nasync function f() { await g(); }\nfor (x of y) db.query(x);\n",
    )?;

    run(dir.path(), ScannerKind::Optimize, &["ui/src"])?;
    run(dir.path(), ScannerKind::Optimize, &["ui/src"])?;

    let mut lines = log_lines(dir.path(), ScannerKind::Optimize)?;
    assert_eq!(lines.len(), 2);
    for line in &mut lines {
        if let Some(obj) = line.as_object_mut() {
            obj.remove("timestamp");
        }
    }
    assert_eq!(lines[0], lines[1]);
    // `const a =` and `function` both count as callbacks
    assert_eq!(lines[0]["metrics"]["callbacks"], 2);
    assert_eq!(lines[0]["metrics"]["potential_n_plus_one"], 1);
    Ok(())
}

#[test]
fn corrupt_state_is_reset_with_backup() -> Result<()> {
    let dir = TempDir::new()?;
    fs::create_dir_all(dir.path().join("a"))?;
    let state_path = Config::new(dir.path()).state_path(ScannerKind::Optimize);
    fs::create_dir_all(state_path.parent().unwrap())?;
    fs::write(&state_path, "{ not json")?;

    let report = run(dir.path(), ScannerKind::Optimize, &["a", "b"])?;
    assert_eq!(report.outcome.unit(), "a");
    assert_eq!(report.state.current_index, 1);
    assert_eq!(fs::read_to_string(state_path.with_extension("json.bak"))?, "{ not json");
    Ok(())
}

#[test]
fn corrupt_state_fails_when_configured() -> Result<()> {
    let dir = TempDir::new()?;
    let state_path = Config::new(dir.path()).state_path(ScannerKind::TestGaps);
    fs::create_dir_all(state_path.parent().unwrap())?;
    fs::write(&state_path, "[]")?;

    let res = run_with_policy(dir.path(), ScannerKind::TestGaps, &["a"], CorruptStatePolicy::Fail);
    assert!(res.is_err());
    assert_eq!(fs::read_to_string(&state_path)?, "[]");
    Ok(())
}

#[test]
fn first_run_creates_state_file() -> Result<()> {
    let dir = TempDir::new()?;
    let kind = ScannerKind::TestGaps;
    let store = JsonFileStore::new(Config::new(dir.path()).state_path(kind), "completed_crates");
    assert!(store.load()?.is_none());

    run(dir.path(), kind, &["missing"])?;
    let state = store.load()?.expect("state written");
    assert_eq!(state.current_index, 0);
    assert_eq!(state.completed_units, vec!["missing"]);
    Ok(())
}

// --- Test-gap scanner ---

fn crate_with(root: &Path, name: &str, pub_fns: usize, tests: usize) -> Result<()> {
    let src = root.join(name).join("src");
    let tests_dir = root.join(name).join("tests");
    fs::create_dir_all(&src)?;
    fs::create_dir_all(&tests_dir)?;
    let body: String = (0..pub_fns).map(|i| format!("pub fn f{i}() {{}}\n")).collect();
    fs::write(src.join("lib.rs"), body)?;
    let tests_body: String = (0..tests)
        .map(|i| format!("#[test]\nfn t{i}() {{}}\n"))
        .collect();
    fs::write(tests_dir.join("it.rs"), tests_body)?;
    Ok(())
}

fn gap_kinds(report: &RunReport) -> Vec<&'static str> {
    match &report.outcome {
        Outcome::Analyzed(r) => r.advisories.iter().map(|a| a.kind).collect(),
        Outcome::UnitMissing { .. } => Vec::new(),
    }
}

#[test]
fn ten_functions_two_tests_is_a_gap() -> Result<()> {
    let dir = TempDir::new()?;
    crate_with(dir.path(), "core", 10, 2)?;
    let report = run(dir.path(), ScannerKind::TestGaps, &["core"])?;
    assert!(gap_kinds(&report).contains(&"untested-functions"));

    let Outcome::Analyzed(record) = &report.outcome else {
        panic!("expected analysis");
    };
    let gap = record
        .advisories
        .iter()
        .find(|a| a.kind == "untested-functions")
        .unwrap();
    assert_eq!(gap.severity, Severity::High);
    Ok(())
}

#[test]
fn ten_functions_six_tests_is_covered() -> Result<()> {
    let dir = TempDir::new()?;
    crate_with(dir.path(), "core", 10, 6)?;
    let report = run(dir.path(), ScannerKind::TestGaps, &["core"])?;
    assert!(!gap_kinds(&report).contains(&"untested-functions"));
    Ok(())
}

#[test]
fn testgaps_record_carries_coverage() -> Result<()> {
    let dir = TempDir::new()?;
    crate_with(dir.path(), "core", 10, 5)?;
    run(dir.path(), ScannerKind::TestGaps, &["core"])?;

    let lines = log_lines(dir.path(), ScannerKind::TestGaps)?;
    let line = &lines[0];
    // 10 source lines, 10 test lines
    assert_eq!(line["estimatedCoverage"], 100);
    assert_eq!(line["metrics"]["estimated_coverage"], 100);
    assert_eq!(line["crate"], "core");
    assert_eq!(line["gapCount"], line["gaps"].as_array().unwrap().len());
    // one integration file, no doc examples
    let kinds: Vec<&str> = line["gaps"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|g| g["type"].as_str())
        .collect();
    assert_eq!(kinds, vec!["missing-integration-tests", "missing-doc-tests"]);
    Ok(())
}

#[test]
fn crate_without_src_has_zero_coverage() -> Result<()> {
    let dir = TempDir::new()?;
    fs::create_dir_all(dir.path().join("bare"))?;
    let report = run(dir.path(), ScannerKind::TestGaps, &["bare"])?;
    let Outcome::Analyzed(record) = report.outcome else {
        panic!("expected analysis");
    };
    assert_eq!(record.estimated_coverage, Some(0));
    assert_eq!(record.metrics.get("source_lines"), Some(0));
    Ok(())
}
