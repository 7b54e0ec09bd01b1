//! Algorithm selector: chooses a concrete engine given the pattern set and
//! a runtime feature snapshot.

use crate::engines::aho_corasick::AcScan;
use crate::engines::literal::{Bmh, ByteScan1, ByteScanShort, Kmp};
use crate::engines::regex_engine::RegexScan;
use crate::engines::simd;
use crate::engines::Engine;
use crate::params::SearchParams;

/// A pattern is "repetitive" if some byte repeats for at least half the
/// pattern's length in a run, or if the whole pattern is a shorter period
/// repeated exactly. This is a heuristic only: it decides which concrete
/// engine the selector and the SIMD engines pick, not a semantic promise
/// about match counts.
pub fn pattern_is_repetitive(pattern: &[u8]) -> bool {
    let n = pattern.len();
    if n == 0 {
        return false;
    }

    let mut max_run = 1usize;
    let mut run = 1usize;
    for i in 1..n {
        if pattern[i] == pattern[i - 1] {
            run += 1;
            max_run = max_run.max(run);
        } else {
            run = 1;
        }
    }
    if max_run * 2 >= n {
        return true;
    }

    (1..n).any(|period| n % period == 0 && (period..n).all(|i| pattern[i] == pattern[i % period]))
}

fn try_simd(pattern: &[u8], case_sensitive: bool) -> Option<Box<dyn Engine>> {
    #[cfg(target_arch = "x86_64")]
    {
        if let Some(e) = simd::x86::Avx2Engine::new(pattern, case_sensitive) {
            return Some(Box::new(e));
        }
        if let Some(e) = simd::x86::Sse42Engine::new(pattern, case_sensitive) {
            return Some(Box::new(e));
        }
    }
    #[cfg(target_arch = "aarch64")]
    {
        if let Some(e) = simd::arm::NeonEngine::new(pattern, case_sensitive) {
            return Some(Box::new(e));
        }
    }
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        let _ = (pattern, case_sensitive);
    }
    None
}

/// Picks the best-fit engine for the compiled pattern set: multi-pattern
/// sets always go through Aho-Corasick, regex-mode sets go through the
/// regex adapter, and a single literal pattern is routed to the narrowest
/// engine that fits its length, case sensitivity, and repetitiveness.
pub fn select_engine(params: &SearchParams) -> Box<dyn Engine> {
    if params.use_regex {
        return Box::new(RegexScan);
    }
    if params.patterns.len() > 1 {
        return Box::new(AcScan);
    }

    let pattern = params.patterns.first();
    let case_sensitive = params.case_sensitive;
    let plen = pattern.len();

    // An empty single pattern reuses the automaton's documented empty-match
    // convention rather than duplicating it in every literal engine.
    if plen == 0 {
        return Box::new(AcScan);
    }

    let can_simd = simd::simd_available();

    if plen == 1 {
        return Box::new(ByteScan1::new(pattern, case_sensitive));
    }

    if plen <= 3 {
        if can_simd && case_sensitive {
            if let Some(engine) = try_simd(pattern, case_sensitive) {
                return engine;
            }
        }
        return Box::new(ByteScanShort::new(pattern, case_sensitive));
    }

    if plen <= 32 && can_simd {
        if let Some(engine) = try_simd(pattern, case_sensitive) {
            return engine;
        }
    }

    if plen <= 16 && can_simd && case_sensitive {
        if let Some(engine) = try_simd(pattern, case_sensitive) {
            return engine;
        }
    }

    if plen < 8 && pattern_is_repetitive(pattern) {
        return Box::new(Kmp::new(pattern, case_sensitive));
    }

    Box::new(Bmh::new(pattern, case_sensitive))
}
