// src/counter.rs
//! Text-level counters over a directory tree.
//!
//! Everything here works on raw file contents. A pattern that appears in a
//! comment or a string literal is counted exactly like one in code; callers
//! treat the numbers as heuristics.

use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use regex::Regex;
use tracing::trace;
use walkdir::WalkDir;

use crate::error::Result;

/// Extensions scanned when no explicit filter is given.
pub const RUST_ONLY: &[&str] = &["rs"];

/// Rust plus the JS/TS family, for units that mix backend and UI code.
pub const RUST_AND_WEB: &[&str] = &["rs", "ts", "tsx", "js", "jsx"];

/// Counts non-overlapping matches of `pattern` across all matching files under `root`.
///
/// Files that cannot be read contribute zero. A missing `root` yields zero.
#[must_use]
pub fn count_patterns(root: &Path, pattern: &Regex, extensions: &[&str]) -> usize {
    source_files(root, extensions)
        .iter()
        .filter_map(|path| read_text(path))
        .map(|content| pattern.find_iter(&content).count())
        .sum()
}

/// Sums line counts of all matching files under `root`.
#[must_use]
pub fn count_lines(root: &Path, extensions: &[&str]) -> usize {
    source_files(root, extensions)
        .iter()
        .filter_map(|path| read_text(path))
        .map(|content| content.lines().count())
        .sum()
}

/// Counts files under `root` whose name matches `glob` and whose extension passes the filter.
///
/// # Errors
/// Returns error if `glob` is not a valid pattern.
pub fn count_files(root: &Path, glob: &str, extensions: &[&str]) -> Result<usize> {
    let pattern = Pattern::new(glob)?;
    let count = source_files(root, extensions)
        .iter()
        .filter(|path| {
            path.file_name()
                .is_some_and(|name| pattern.matches(&name.to_string_lossy()))
        })
        .count();
    Ok(count)
}

/// Walks `root` and returns regular files with an allowed extension.
fn source_files(root: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    let walker = WalkDir::new(root).follow_links(false).into_iter();

    let (paths, error_count) = accumulate_walker(walker, extensions);
    if error_count > 0 {
        trace!(root = %root.display(), error_count, "skipped unreadable entries");
    }
    paths
}

fn accumulate_walker<I>(walker: I, extensions: &[&str]) -> (Vec<PathBuf>, usize)
where
    I: Iterator<Item = walkdir::Result<walkdir::DirEntry>>,
{
    let mut paths = Vec::new();
    let mut errors = 0;
    for item in walker {
        match item {
            Ok(entry) => {
                if is_file(&entry) && has_extension(entry.path(), extensions) {
                    paths.push(entry.into_path());
                }
            }
            Err(_) => errors += 1,
        }
    }
    (paths, errors)
}

/// Regular files, plus symlinks that resolve to one. Directory links stay unfollowed.
fn is_file(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.contains(&ext))
}

/// Reads `path` as UTF-8, dropping invalid byte sequences.
fn read_text(path: &Path) -> Option<String> {
    match fs::read(path) {
        Ok(bytes) => Some(bytes.utf8_chunks().map(|c| c.valid()).collect()),
        Err(e) => {
            trace!(path = %path.display(), error = %e, "skipping unreadable file");
            None
        }
    }
}
