//! Regex engine adapter: wraps a compiled regex with position tracking and
//! empty-match safety, advancing a cursor that must strictly increase on
//! every iteration to prevent livelock.

use regex::bytes::RegexBuilder;

use super::{Accept, AcceptState, Engine};
use crate::error::{GrepError, Result};
use crate::params::SearchParams;
use crate::result::MatchResult;

/// A compiled multi-pattern alternation. Multiple ERE strings are joined as
/// `(p1)|(p2)|...|(pN)` before compilation.
#[derive(Clone, Debug)]
pub struct RegexAdapter {
    re: regex::bytes::Regex,
}

impl RegexAdapter {
    /// Compiles one or more ERE pattern strings (encoded as UTF-8 bytes)
    /// with the requested case-sensitivity. Newline-aware `^`/`$` (multi
    /// line mode) is always enabled, since the input buffer contract treats
    /// `\n` as the line separator throughout this crate.
    pub fn compile(patterns: &[Vec<u8>], case_sensitive: bool) -> Result<Self> {
        if patterns.is_empty() {
            return Err(GrepError::invalid_pattern("regex mode requires at least one pattern"));
        }

        let mut parts = Vec::with_capacity(patterns.len());
        for p in patterns {
            let s = std::str::from_utf8(p)
                .map_err(|_| GrepError::invalid_pattern("regex pattern is not valid UTF-8"))?;
            parts.push(format!("({s})"));
        }
        let combined = parts.join("|");

        let re = RegexBuilder::new(&combined)
            .case_insensitive(!case_sensitive)
            .multi_line(true)
            .build()
            .map_err(|e| GrepError::invalid_pattern(e.to_string()))?;

        Ok(Self { re })
    }

    /// The leftmost match at or after `at`, with offsets absolute into
    /// `buf`. `find_at` retains full context before `at` so `^`/`$`/`\b`
    /// still see the real surrounding text.
    fn find_at(&self, buf: &[u8], at: usize) -> Option<(usize, usize)> {
        self.re.find_at(buf, at).map(|m| (m.start(), m.end()))
    }
}

/// The engine value the selector hands out when `use_regex` is set; reads
/// the prebuilt [`RegexAdapter`] off `SearchParams`.
pub struct RegexScan;

impl Engine for RegexScan {
    fn scan(&self, params: &SearchParams, buf: &[u8], mut result: Option<&mut MatchResult>) -> u64 {
        let Some(adapter) = params.regex() else {
            return 0;
        };
        let mut state = AcceptState::new(params);

        let mut cursor = 0usize;
        while cursor <= buf.len() {
            let Some((s, e)) = adapter.find_at(buf, cursor) else {
                break;
            };

            let outcome = state.accept(buf, s, e, result.as_deref_mut());
            if matches!(outcome, Accept::CountedAndDone) {
                return state.count;
            }

            cursor = if state.count_lines_mode && matches!(outcome, Accept::Rejected) {
                state.line_skip_cursor(buf, s)
            } else if s == e {
                e + 1
            } else {
                e
            };
        }
        state.count
    }
}
