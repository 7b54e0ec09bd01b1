//! Single-literal engines: short-needle `memchr` scans, Boyer-Moore-
//! Horspool, and Knuth-Morris-Pratt, sharing the acceptance contract in
//! `engines::mod`.

use super::{lower, Accept, AcceptState, Engine};
use crate::params::SearchParams;
use crate::result::MatchResult;

/// Direct byte-scan for a one-byte pattern. Advances by 1 so overlapping
/// matches are all found.
pub struct ByteScan1 {
    byte: u8,
    case_sensitive: bool,
}

impl ByteScan1 {
    pub fn new(pattern: &[u8], case_sensitive: bool) -> Self {
        debug_assert_eq!(pattern.len(), 1);
        Self {
            byte: pattern[0],
            case_sensitive,
        }
    }

    fn find_next(&self, haystack: &[u8]) -> Option<usize> {
        if self.case_sensitive {
            memchr::memchr(self.byte, haystack)
        } else {
            let lo = self.byte.to_ascii_lowercase();
            let up = self.byte.to_ascii_uppercase();
            if lo == up {
                memchr::memchr(lo, haystack)
            } else {
                memchr::memchr2(lo, up, haystack)
            }
        }
    }
}

impl Engine for ByteScan1 {
    fn scan(&self, params: &SearchParams, buf: &[u8], mut result: Option<&mut MatchResult>) -> u64 {
        let mut state = AcceptState::new(params);
        let mut cursor = 0usize;
        while cursor <= buf.len() {
            let Some(rel) = self.find_next(&buf[cursor..]) else {
                break;
            };
            let start = cursor + rel;
            let end = start + 1;
            match state.accept(buf, start, end, result.as_deref_mut()) {
                Accept::CountedAndDone => return state.count,
                Accept::Rejected if state.count_lines_mode => {
                    cursor = state.line_skip_cursor(buf, start);
                    continue;
                }
                _ => cursor = start + 1,
            }
        }
        state.count
    }
}

/// Byte-scan on the first byte, inline verification of the remaining bytes,
/// used for patterns of length 2-3 when SIMD is unavailable or unsuited.
pub struct ByteScanShort {
    pattern: Vec<u8>,
    case_sensitive: bool,
}

impl ByteScanShort {
    pub fn new(pattern: &[u8], case_sensitive: bool) -> Self {
        debug_assert!((2..=3).contains(&pattern.len()));
        let pattern = if case_sensitive {
            pattern.to_vec()
        } else {
            pattern.iter().map(|&b| lower(b)).collect()
        };
        Self {
            pattern,
            case_sensitive,
        }
    }

    fn matches_at(&self, buf: &[u8], start: usize) -> bool {
        let plen = self.pattern.len();
        if start + plen > buf.len() {
            return false;
        }
        for i in 0..plen {
            let b = if self.case_sensitive {
                buf[start + i]
            } else {
                lower(buf[start + i])
            };
            if b != self.pattern[i] {
                return false;
            }
        }
        true
    }

    fn first_byte_candidates<'a>(&self, haystack: &'a [u8]) -> Option<usize> {
        let target = self.pattern[0];
        if self.case_sensitive {
            memchr::memchr(target, haystack)
        } else {
            // `target` is already lowercased; scan for either case variant.
            let up = target.to_ascii_uppercase();
            if target == up {
                memchr::memchr(target, haystack)
            } else {
                memchr::memchr2(target, up, haystack)
            }
        }
    }
}

impl Engine for ByteScanShort {
    fn scan(&self, params: &SearchParams, buf: &[u8], mut result: Option<&mut MatchResult>) -> u64 {
        let mut state = AcceptState::new(params);
        let plen = self.pattern.len();
        let mut cursor = 0usize;
        while cursor < buf.len() {
            let Some(rel) = self.first_byte_candidates(&buf[cursor..]) else {
                break;
            };
            let start = cursor + rel;
            if !self.matches_at(buf, start) {
                cursor = start + 1;
                continue;
            }
            let end = start + plen;
            match state.accept(buf, start, end, result.as_deref_mut()) {
                Accept::CountedAndDone => return state.count,
                Accept::Rejected if state.count_lines_mode => {
                    cursor = state.line_skip_cursor(buf, start);
                    continue;
                }
                _ => cursor = start + 1,
            }
        }
        state.count
    }
}

/// Boyer-Moore-Horspool. Finds overlapping matches (advances by 1 on a hit),
/// shifts by the bad-character table on a miss.
pub struct Bmh {
    pattern: Vec<u8>,
    case_sensitive: bool,
    table: [usize; 256],
}

impl Bmh {
    pub fn new(pattern: &[u8], case_sensitive: bool) -> Self {
        let plen = pattern.len();
        debug_assert!(plen >= 1);
        let folded: Vec<u8> = if case_sensitive {
            pattern.to_vec()
        } else {
            pattern.iter().map(|&b| lower(b)).collect()
        };

        let mut table = [plen; 256];
        for i in 0..plen.saturating_sub(1) {
            let shift = plen - 1 - i;
            let b = folded[i];
            if !case_sensitive {
                let up = b.to_ascii_uppercase();
                table[b as usize] = table[b as usize].min(shift);
                table[up as usize] = table[up as usize].min(shift);
            } else {
                table[b as usize] = table[b as usize].min(shift);
            }
        }

        Self {
            pattern: folded,
            case_sensitive,
            table,
        }
    }

    fn byte_at(&self, buf: &[u8], i: usize) -> u8 {
        if self.case_sensitive {
            buf[i]
        } else {
            lower(buf[i])
        }
    }

    fn matches_at(&self, buf: &[u8], start: usize) -> bool {
        let plen = self.pattern.len();
        (0..plen).all(|i| self.byte_at(buf, start + i) == self.pattern[i])
    }
}

impl Engine for Bmh {
    fn scan(&self, params: &SearchParams, buf: &[u8], mut result: Option<&mut MatchResult>) -> u64 {
        let mut state = AcceptState::new(params);
        let plen = self.pattern.len();
        if plen == 0 || plen > buf.len() {
            return state.count;
        }

        let mut start = 0usize;
        while start + plen <= buf.len() {
            if self.matches_at(buf, start) {
                let end = start + plen;
                match state.accept(buf, start, end, result.as_deref_mut()) {
                    Accept::CountedAndDone => return state.count,
                    Accept::Rejected if state.count_lines_mode => {
                        start = state.line_skip_cursor(buf, start);
                        continue;
                    }
                    _ => start += 1,
                }
            } else {
                let last_in_window = self.byte_at(buf, start + plen - 1);
                let shift = self.table[last_in_window as usize].max(1);
                start += shift;
            }
        }
        state.count
    }
}

/// Knuth-Morris-Pratt. Non-overlapping: on a full match the cursor advances
/// by the pattern length; on a mismatch it falls back via the LPS array.
pub struct Kmp {
    pattern: Vec<u8>,
    case_sensitive: bool,
    lps: Vec<usize>,
}

impl Kmp {
    pub fn new(pattern: &[u8], case_sensitive: bool) -> Self {
        let folded: Vec<u8> = if case_sensitive {
            pattern.to_vec()
        } else {
            pattern.iter().map(|&b| lower(b)).collect()
        };
        let lps = build_lps(&folded);
        Self {
            pattern: folded,
            case_sensitive,
            lps,
        }
    }

    fn byte_at(&self, buf: &[u8], i: usize) -> u8 {
        if self.case_sensitive {
            buf[i]
        } else {
            lower(buf[i])
        }
    }
}

fn build_lps(pattern: &[u8]) -> Vec<usize> {
    let n = pattern.len();
    let mut lps = vec![0usize; n];
    let mut len = 0usize;
    let mut i = 1usize;
    while i < n {
        if pattern[i] == pattern[len] {
            len += 1;
            lps[i] = len;
            i += 1;
        } else if len != 0 {
            len = lps[len - 1];
        } else {
            lps[i] = 0;
            i += 1;
        }
    }
    lps
}

impl Engine for Kmp {
    fn scan(&self, params: &SearchParams, buf: &[u8], mut result: Option<&mut MatchResult>) -> u64 {
        let mut state = AcceptState::new(params);
        let plen = self.pattern.len();
        if plen == 0 || plen > buf.len() {
            return state.count;
        }

        let mut i = 0usize; // index into buf
        let mut j = 0usize; // index into pattern
        while i < buf.len() {
            if self.byte_at(buf, i) == self.pattern[j] {
                i += 1;
                j += 1;
                if j == plen {
                    let start = i - plen;
                    let end = i;
                    j = self.lps[j - 1];
                    match state.accept(buf, start, end, result.as_deref_mut()) {
                        Accept::CountedAndDone => return state.count,
                        Accept::Rejected if state.count_lines_mode => {
                            i = state.line_skip_cursor(buf, start);
                            j = 0;
                        }
                        _ => {}
                    }
                }
            } else if j != 0 {
                j = self.lps[j - 1];
            } else {
                i += 1;
            }
        }
        state.count
    }
}
