//! The engine family and the shared match-acceptance contract every engine
//! applies uniformly. Each engine is a value implementing [`Engine`]; the
//! selector returns one such value rather than building an inheritance
//! hierarchy.

pub mod aho_corasick;
pub mod literal;
pub mod regex_engine;
pub mod simd;

use crate::line_index::{line_end, line_start};
use crate::params::SearchParams;
use crate::result::MatchResult;

/// Uniform entry point every concrete engine implements. `scan` returns the
/// match count in default/only-matching modes, or the distinct-line count in
/// `count_lines_mode`.
pub trait Engine: Send + Sync {
    fn scan(&self, params: &SearchParams, buf: &[u8], result: Option<&mut MatchResult>) -> u64;
}

/// 256-entry lowercase table used by every engine for case-insensitive
/// comparisons.
pub const LOWER: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = (i as u8).to_ascii_lowercase();
        i += 1;
    }
    table
};

#[inline]
pub fn lower(b: u8) -> u8 {
    LOWER[b as usize]
}

/// A byte counts as a "word" byte if alphanumeric or underscore.
#[inline]
pub fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Tracks the running state every engine needs to apply match acceptance and
/// advancement uniformly: the whole-word/case-insensitive flags from
/// `params`, the max-count bound, and (in `count_lines_mode`) the start of
/// the last line that was already counted.
pub struct AcceptState {
    pub count: u64,
    pub max_count: u64,
    pub count_lines_mode: bool,
    pub track_positions: bool,
    pub whole_word: bool,
    last_counted_line_start: Option<usize>,
}

/// Outcome of offering one candidate match to [`AcceptState::accept`].
pub enum Accept {
    /// The match was rejected outright (whole-word boundary failed, or this
    /// line was already counted); the caller should not treat `count` as
    /// having changed, but in `count_lines_mode` the cursor may still need
    /// to skip to the next line.
    Rejected,
    /// The match was accepted and folded into `count`/`result`.
    Counted,
    /// The match was accepted and `max_count` has now been reached; the
    /// caller must stop scanning immediately.
    CountedAndDone,
}

impl AcceptState {
    pub fn new(params: &SearchParams) -> Self {
        Self {
            count: 0,
            max_count: params.max_count,
            count_lines_mode: params.count_lines_mode,
            track_positions: params.track_positions,
            whole_word: params.whole_word,
            last_counted_line_start: None,
        }
    }

    /// Applies whole-word filtering, line-count deduplication, position
    /// tracking, and the max-count stop signal to a candidate match
    /// `(start, end)` found in `buf`. Computing the match and any case
    /// folding during comparison are the concrete engine's job.
    pub fn accept(
        &mut self,
        buf: &[u8],
        start: usize,
        end: usize,
        result: Option<&mut MatchResult>,
    ) -> Accept {
        if self.whole_word {
            let start_ok = start == 0 || !is_word_byte(buf[start - 1]);
            let end_ok = end == buf.len() || !is_word_byte(buf[end]);
            if !(start_ok && end_ok) {
                return Accept::Rejected;
            }
        }

        if self.count_lines_mode {
            let ls = line_start(buf, start);
            if self.last_counted_line_start == Some(ls) {
                return Accept::Rejected;
            }
            self.last_counted_line_start = Some(ls);
        }

        self.count += 1;
        if self.track_positions {
            if let Some(r) = result {
                if let Err(e) = r.push(start as u64, end as u64) {
                    log::warn!("grepcore: dropping tracked position, {e}");
                }
            }
        }

        if self.count >= self.max_count {
            Accept::CountedAndDone
        } else {
            Accept::Counted
        }
    }

    /// In `count_lines_mode`, the cursor should skip to the byte past the
    /// end of the line that was just counted/rejected.
    pub fn line_skip_cursor(&self, buf: &[u8], start: usize) -> usize {
        line_end(buf, start) + 1
    }
}
