//! `grepcore`: the algorithm-selecting search core behind a grep-class line
//! matcher. This crate owns the search algorithms, the selector that picks
//! among them, the chunked parallel driver that runs them over memory-mapped
//! or streamed input, and the match-result model they all share. CLI
//! argument parsing, colored output formatting, and
//! directory-filter policy (what counts as "hidden", "binary-looking", etc.)
//! are deliberately left to callers; this crate only pins the interfaces they
//! plug into (see [`directory::DirFilter`]).
//!
//! # Examples
//!
//! ```rust
//! use grepcore::SearchParamsBuilder;
//!
//! let params = SearchParamsBuilder::new(vec![b"fox".to_vec()])
//!     .build()
//!     .unwrap();
//! let outcome = grepcore::search_string(&params, "The quick brown fox").unwrap();
//! assert_eq!(outcome.total, 1);
//! assert!(outcome.found);
//! ```

pub mod directory;
pub mod driver;
pub mod engines;
pub mod error;
pub mod io;
pub mod line_index;
pub mod params;
pub mod pool;
pub mod result;
pub mod selector;

use std::path::Path;

pub use directory::{DirFilter, DirectoryOutcome};
pub use error::{GrepError, Result};
pub use params::{PatternSet, SearchParams, SearchParamsBuilder};
pub use result::{MatchPosition, MatchResult};

/// The unified return shape of every entry point below. `found` is exactly
/// `total > 0`.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub found: bool,
    pub total: u64,
    pub positions: Option<Vec<MatchPosition>>,
}

fn outcome_of(total: u64, positions: Option<MatchResult>) -> SearchOutcome {
    SearchOutcome {
        found: total > 0,
        total,
        positions: positions.map(MatchResult::into_vec),
    }
}

/// Searches `text` (treated as raw bytes) with the already-built `params`,
/// always single-threaded since a string search never needs chunking.
///
/// # Arguments
///
/// * `params` - compiled search configuration, see [`SearchParamsBuilder`]
/// * `text` - the text to search; arbitrary bytes are accepted via `AsRef<[u8]>`
///
/// # Returns
///
/// The match count and, when `params.track_positions` is set, the ordered
/// position list.
pub fn search_string(params: &SearchParams, text: impl AsRef<[u8]>) -> Result<SearchOutcome> {
    search_buffer(params, text.as_ref(), 1)
}

/// Searches an arbitrary byte buffer, parallelizing across `threads` workers
/// when the buffer is large enough and the search mode allows it.
/// `threads == 0` resolves to `std::thread::available_parallelism()`. This is
/// the common path both [`search_string`] and [`search_file`] funnel through.
pub fn search_buffer(params: &SearchParams, buf: &[u8], threads: usize) -> Result<SearchOutcome> {
    let (total, positions) = driver::search_buffer(params, buf, threads)?;
    Ok(outcome_of(total, positions))
}

/// Memory-maps `path` and searches it, releasing the map when the call
/// returns. See [`driver::search_file`] for the mmap lifecycle.
pub fn search_file(params: &SearchParams, path: impl AsRef<Path>, threads: usize) -> Result<SearchOutcome> {
    let (total, positions) = driver::search_file(params, path.as_ref(), threads)?;
    Ok(outcome_of(total, positions))
}

/// Streams `reader` through the overlap-preserving chunker for sources that
/// cannot be memory-mapped (stdin, pipes); see [`driver::search_reader`].
pub fn search_reader<R: std::io::Read>(params: &SearchParams, reader: &mut R, threads: usize) -> Result<SearchOutcome> {
    let (total, positions) = driver::search_reader(params, reader, threads)?;
    Ok(outcome_of(total, positions))
}

/// Recursively walks `root`, searching every file `filter` accepts. Returns
/// the number of per-file errors encountered; the fuller per-file breakdown
/// and the "any match found" signal are available on the returned
/// [`DirectoryOutcome`].
pub fn search_directory(
    root: impl AsRef<Path>,
    params: &SearchParams,
    threads: usize,
    filter: &dyn DirFilter,
) -> DirectoryOutcome {
    directory::search_directory(root.as_ref(), params, threads, filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_string_end_to_end() {
        let params = SearchParamsBuilder::new(vec![b"fox".to_vec()]).build().unwrap();
        let outcome = search_string(&params, "The quick brown fox").unwrap();
        assert_eq!(outcome.total, 1);
        assert_eq!(outcome.positions.unwrap()[0], MatchPosition::new(16, 19));
    }

    #[test]
    fn search_string_multi_pattern_case_insensitive() {
        let params = SearchParamsBuilder::new(vec![
            b"he".to_vec(),
            b"she".to_vec(),
            b"his".to_vec(),
            b"hers".to_vec(),
        ])
        .case_sensitive(false)
        .build()
        .unwrap();
        let outcome = search_string(&params, "UsHeRs").unwrap();
        assert_eq!(outcome.total, 3);
    }

    #[test]
    fn search_string_regex_line_anchored() {
        let params = SearchParamsBuilder::new(vec![b"^Line [0-9]+$".to_vec()])
            .use_regex(true)
            .count_lines_mode(true)
            .build()
            .unwrap();
        let outcome = search_string(&params, "Line 1\nLine 2\nLine 3").unwrap();
        assert_eq!(outcome.total, 3);
    }

    #[test]
    fn search_string_max_count_truncates() {
        let params = SearchParamsBuilder::new(vec![b"apple".to_vec(), b"orange".to_vec()])
            .max_count(3)
            .build()
            .unwrap();
        let outcome = search_string(&params, "apple banana apple orange apple grape apple").unwrap();
        assert_eq!(outcome.total, 3);
        let positions = outcome.positions.unwrap();
        assert_eq!(positions.len(), 3);
        assert_eq!(positions[0], MatchPosition::new(0, 5));
        assert_eq!(positions[1], MatchPosition::new(13, 19));
        assert_eq!(positions[2], MatchPosition::new(20, 25));
    }

    #[test]
    fn search_reader_streams_stdin_like_source() {
        let params = SearchParamsBuilder::new(vec![b"NEEDLE".to_vec()]).build().unwrap();
        let mut cursor = std::io::Cursor::new(b"xxx-NEEDLE-yyy-NEEDLE-zzz".to_vec());
        let outcome = search_reader(&params, &mut cursor, 1).unwrap();
        assert_eq!(outcome.total, 2);
    }

    #[test]
    fn empty_buffer_and_empty_pattern_yields_one_match() {
        let params = SearchParamsBuilder::new(vec![Vec::new()]).build().unwrap();
        let outcome = search_string(&params, "").unwrap();
        assert_eq!(outcome.total, 1);
        assert!(outcome.found);
    }

    #[test]
    fn empty_buffer_and_nonempty_pattern_yields_zero() {
        let params = SearchParamsBuilder::new(vec![b"abc".to_vec()]).build().unwrap();
        let outcome = search_string(&params, "").unwrap();
        assert_eq!(outcome.total, 0);
        assert!(!outcome.found);
    }
}
