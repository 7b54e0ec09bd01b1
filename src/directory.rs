//! Recursive directory walker: a depth-first `std::fs::read_dir` traversal
//! that consumes a caller-supplied [`DirFilter`] and searches every file the
//! filter accepts, aggregating per-file errors without letting one bad file
//! abort the whole tree (errors are file-scoped; the walk continues).
//!
//! The filter policy itself (hidden/VCS skip-lists, binary-file heuristics,
//! extension blacklists) is deliberately out of scope here; this module only
//! pins the trait shape the recursive driver consumes.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::driver;
use crate::error::GrepError;
use crate::params::SearchParams;
use crate::result::MatchResult;

/// A bound on how many per-file errors are retained, so a pathological tree
/// full of unreadable files can't grow `SearchOutcome::errors` without limit.
const MAX_RETAINED_ERRORS: usize = 256;

/// Caller-supplied traversal policy. Both methods default to "always true" so
/// a filter-less walk (search every regular file, descend into every
/// directory) is the zero-effort case; real filtering (hidden/VCS dirs,
/// binary sniffing, extension lists) is the collaborator's job.
pub trait DirFilter {
    /// Whether the walker should recurse into this directory.
    fn should_descend(&self, path: &Path) -> bool {
        let _ = path;
        true
    }

    /// Whether the walker should search this file.
    fn should_search(&self, path: &Path) -> bool {
        let _ = path;
        true
    }
}

/// A filter that accepts everything; the zero-configuration default.
pub struct AcceptAll;
impl DirFilter for AcceptAll {}

/// One file's outcome, folded into the aggregate result of a directory walk.
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub total: u64,
    pub positions: Option<MatchResult>,
}

/// The result of walking a whole directory tree: how many files errored, the
/// (bounded) list of those errors, and the per-file match outcomes for files
/// that were actually searched.
#[derive(Debug, Default)]
pub struct DirectoryOutcome {
    pub errors_count: u64,
    pub errors: Vec<GrepError>,
    pub files: Vec<FileOutcome>,
    pub any_match_found: bool,
}

/// Recursively walks `root`, searching every file `filter` accepts and
/// descending into every directory `filter` accepts, returning the per-file
/// match outcomes alongside the aggregate error count.
///
/// The "any match found" signal is a plain `AtomicBool` local to this call:
/// each call gets its own walk-scoped flag, set with `Release` ordering on a
/// hit and read back with `Acquire` once the walk completes.
pub fn search_directory(
    root: &Path,
    params: &SearchParams,
    threads: usize,
    filter: &dyn DirFilter,
) -> DirectoryOutcome {
    let any_match = AtomicBool::new(false);
    let mut outcome = DirectoryOutcome::default();
    walk(root, params, threads, filter, &any_match, &mut outcome);
    outcome.any_match_found = any_match.load(Ordering::Acquire);
    outcome
}

fn walk(
    dir: &Path,
    params: &SearchParams,
    threads: usize,
    filter: &dyn DirFilter,
    any_match: &AtomicBool,
    outcome: &mut DirectoryOutcome,
) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            record_error(outcome, GrepError::io(dir, e));
            return;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                record_error(outcome, GrepError::io(dir, e));
                continue;
            }
        };
        let path = entry.path();

        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(e) => {
                record_error(outcome, GrepError::io(&path, e));
                continue;
            }
        };

        if file_type.is_dir() {
            if filter.should_descend(&path) {
                walk(&path, params, threads, filter, any_match, outcome);
            }
            continue;
        }

        if !file_type.is_file() || !filter.should_search(&path) {
            continue;
        }

        match driver::search_file(params, &path, threads) {
            Ok((total, positions)) => {
                if total > 0 {
                    any_match.store(true, Ordering::Release);
                }
                outcome.files.push(FileOutcome { path, total, positions });
            }
            Err(e) => record_error(outcome, e),
        }
    }
}

fn record_error(outcome: &mut DirectoryOutcome, err: GrepError) {
    outcome.errors_count += 1;
    if outcome.errors.len() < MAX_RETAINED_ERRORS {
        outcome.errors.push(err);
    }
}
