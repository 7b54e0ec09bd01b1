//! SIMD engines: case-sensitive scanners at 16-/32-byte widths, plus
//! case-insensitive AVX2 lane-lowercasing. Every constructor returns `None`
//! when the pattern/flag combination is outside what the variant supports,
//! so the selector can transparently fall back to the next-best engine.
//!
//! `can_simd` in the selector's decision table is a *runtime* probe
//! (`is_x86_feature_detected!`/`is_aarch64_feature_detected!`), not a
//! compile-time `cfg`, so a single compiled binary degrades correctly on
//! hardware lacking the relevant extensions (see DESIGN.md).

use super::{lower, Accept, AcceptState, Engine};
use crate::params::SearchParams;
use crate::result::MatchResult;
use crate::selector::pattern_is_repetitive;

/// True if this process can use at least one of the accelerated paths below.
pub fn simd_available() -> bool {
    #[cfg(target_arch = "x86_64")]
    {
        is_x86_feature_detected!("sse4.2") || is_x86_feature_detected!("avx2")
    }
    #[cfg(target_arch = "aarch64")]
    {
        std::arch::is_aarch64_feature_detected!("neon")
    }
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        false
    }
}

#[cfg(target_arch = "x86_64")]
pub mod x86 {
    use super::*;
    use core::arch::x86_64::*;

    /// 16-byte equal-ordered substring search (SSE4.2 `PCMPESTRI`).
    /// Case-sensitive only; pattern length must be in `1..=16`.
    pub struct Sse42Engine {
        pattern: Vec<u8>,
        repetitive: bool,
    }

    impl Sse42Engine {
        pub fn new(pattern: &[u8], case_sensitive: bool) -> Option<Self> {
            if !case_sensitive || pattern.is_empty() || pattern.len() > 16 {
                return None;
            }
            if !is_x86_feature_detected!("sse4.2") {
                return None;
            }
            Some(Self {
                pattern: pattern.to_vec(),
                repetitive: pattern_is_repetitive(pattern),
            })
        }

        /// Finds the first occurrence of `self.pattern` at or after
        /// `cursor`, using one `PCMPESTRI` per 16-byte window. Because the
        /// instruction searches all offsets within the window in one shot,
        /// advancing by `idx + 1` (rather than reloading byte-by-byte)
        /// still visits every overlapping match.
        #[target_feature(enable = "sse4.2")]
        unsafe fn find_from(&self, buf: &[u8], cursor: usize) -> Option<usize> {
            let plen = self.pattern.len();
            if cursor + plen > buf.len() {
                return None;
            }
            let needle = _mm_loadu_si128(padded16(&self.pattern).as_ptr() as *const __m128i);
            let mut pos = cursor;
            while pos + plen <= buf.len() {
                let window_len = (buf.len() - pos).min(16);
                let window = padded16(&buf[pos..pos + window_len]);
                let hay = _mm_loadu_si128(window.as_ptr() as *const __m128i);
                let idx = _mm_cmpestri(
                    needle,
                    plen as i32,
                    hay,
                    window_len as i32,
                    _SIDD_UBYTE_OPS | _SIDD_CMP_EQUAL_ORDERED | _SIDD_LEAST_SIGNIFICANT,
                );
                if idx < 16 {
                    let found = pos + idx as usize;
                    if found + plen <= buf.len() {
                        return Some(found);
                    }
                    return None;
                }
                // No match in this window; next window must still overlap
                // by `plen - 1` bytes so a match starting near the tail
                // isn't missed.
                pos += (16 - plen + 1).max(1);
            }
            None
        }
    }

    fn padded16(bytes: &[u8]) -> [u8; 16] {
        let mut buf = [0u8; 16];
        let n = bytes.len().min(16);
        buf[..n].copy_from_slice(&bytes[..n]);
        buf
    }

    impl Engine for Sse42Engine {
        fn scan(&self, params: &SearchParams, buf: &[u8], mut result: Option<&mut MatchResult>) -> u64 {
            let mut state = AcceptState::new(params);
            let plen = self.pattern.len();
            let mut cursor = 0usize;
            loop {
                let found = unsafe { self.find_from(buf, cursor) };
                let Some(start) = found else { break };
                let end = start + plen;
                match state.accept(buf, start, end, result.as_deref_mut()) {
                    Accept::CountedAndDone => return state.count,
                    Accept::Rejected if state.count_lines_mode => {
                        cursor = state.line_skip_cursor(buf, start);
                        continue;
                    }
                    _ => {}
                }
                cursor = if self.repetitive { end } else { start + 1 };
            }
            state.count
        }
    }

    /// 32-byte broadcast-compare (AVX2). Supports case-insensitive matching
    /// up to 32 bytes by lowercasing each window before comparing; a scalar
    /// BMH tail handles the final `< plen` bytes.
    pub struct Avx2Engine {
        pattern: Vec<u8>,
        case_sensitive: bool,
        repetitive: bool,
    }

    impl Avx2Engine {
        pub fn new(pattern: &[u8], case_sensitive: bool) -> Option<Self> {
            if pattern.is_empty() || pattern.len() > 32 {
                return None;
            }
            if !is_x86_feature_detected!("avx2") {
                return None;
            }
            let folded: Vec<u8> = if case_sensitive {
                pattern.to_vec()
            } else {
                pattern.iter().map(|&b| lower(b)).collect()
            };
            Some(Self {
                pattern: folded,
                case_sensitive,
                repetitive: pattern_is_repetitive(pattern),
            })
        }

        #[target_feature(enable = "avx2")]
        unsafe fn lowercase(window: __m256i) -> __m256i {
            let sign = _mm256_set1_epi8(-128i8);
            let a_minus1 = _mm256_xor_si256(_mm256_set1_epi8((b'A' - 1) as i8), sign);
            let z = _mm256_xor_si256(_mm256_set1_epi8(b'Z' as i8), sign);
            let flipped = _mm256_xor_si256(window, sign);
            let ge_a = _mm256_cmpgt_epi8(flipped, a_minus1);
            let gt_z = _mm256_cmpgt_epi8(flipped, z);
            let is_upper = _mm256_andnot_si256(gt_z, ge_a);
            let add32 = _mm256_and_si256(is_upper, _mm256_set1_epi8(32));
            _mm256_add_epi8(window, add32)
        }

        #[target_feature(enable = "avx2")]
        unsafe fn verify_at(&self, buf: &[u8], start: usize) -> bool {
            let plen = self.pattern.len();
            if start + plen > buf.len() {
                return false;
            }
            for i in 0..plen {
                let b = if self.case_sensitive { buf[start + i] } else { lower(buf[start + i]) };
                if b != self.pattern[i] {
                    return false;
                }
            }
            true
        }

        #[target_feature(enable = "avx2")]
        unsafe fn find_from(&self, buf: &[u8], cursor: usize) -> Option<usize> {
            let plen = self.pattern.len();
            let first = self.pattern[0];
            let mut pos = cursor;
            while pos < buf.len() {
                let window_len = (buf.len() - pos).min(32);
                if window_len == 0 {
                    return None;
                }
                let mut tmp = [0u8; 32];
                tmp[..window_len].copy_from_slice(&buf[pos..pos + window_len]);
                let raw = _mm256_loadu_si256(tmp.as_ptr() as *const __m256i);
                let folded = if self.case_sensitive { raw } else { Self::lowercase(raw) };
                let target = _mm256_set1_epi8(first as i8);
                let eq = _mm256_cmpeq_epi8(folded, target);
                let mut mask = _mm256_movemask_epi8(eq) as u32;
                // Only the first `window_len` lanes are meaningful.
                if window_len < 32 {
                    mask &= (1u32 << window_len) - 1;
                }
                while mask != 0 {
                    let bit = mask.trailing_zeros() as usize;
                    let candidate = pos + bit;
                    if self.verify_at(buf, candidate) {
                        return Some(candidate);
                    }
                    mask &= mask - 1;
                }
                pos += (32 - plen + 1).max(1);
            }
            None
        }
    }

    impl Engine for Avx2Engine {
        fn scan(&self, params: &SearchParams, buf: &[u8], mut result: Option<&mut MatchResult>) -> u64 {
            let mut state = AcceptState::new(params);
            let plen = self.pattern.len();
            let mut cursor = 0usize;
            loop {
                let found = unsafe { self.find_from(buf, cursor) };
                let Some(start) = found else { break };
                let end = start + plen;
                match state.accept(buf, start, end, result.as_deref_mut()) {
                    Accept::CountedAndDone => return state.count,
                    Accept::Rejected if state.count_lines_mode => {
                        cursor = state.line_skip_cursor(buf, start);
                        continue;
                    }
                    _ => {}
                }
                cursor = if self.repetitive { end } else { start + 1 };
            }
            state.count
        }
    }
}

#[cfg(target_arch = "aarch64")]
pub mod arm {
    use super::*;
    use core::arch::aarch64::*;

    /// 16-byte NEON scanner, equivalent in spirit to the SSE4.2 variant:
    /// vectorized first-byte probing over a 16-byte window, scalar
    /// verification of the full pattern. Case-sensitive only.
    pub struct NeonEngine {
        pattern: Vec<u8>,
        repetitive: bool,
    }

    impl NeonEngine {
        pub fn new(pattern: &[u8], case_sensitive: bool) -> Option<Self> {
            if !case_sensitive || pattern.is_empty() || pattern.len() > 16 {
                return None;
            }
            if !std::arch::is_aarch64_feature_detected!("neon") {
                return None;
            }
            Some(Self {
                pattern: pattern.to_vec(),
                repetitive: pattern_is_repetitive(pattern),
            })
        }

        fn verify_at(&self, buf: &[u8], start: usize) -> bool {
            let plen = self.pattern.len();
            start + plen <= buf.len() && buf[start..start + plen] == self.pattern[..]
        }

        #[target_feature(enable = "neon")]
        unsafe fn find_from(&self, buf: &[u8], cursor: usize) -> Option<usize> {
            let plen = self.pattern.len();
            let first = self.pattern[0];
            let target = vdupq_n_u8(first);
            let mut pos = cursor;
            while pos + plen <= buf.len() {
                let window_len = (buf.len() - pos).min(16);
                let mut tmp = [0u8; 16];
                tmp[..window_len].copy_from_slice(&buf[pos..pos + window_len]);
                let window = vld1q_u8(tmp.as_ptr());
                let eq = vceqq_u8(window, target);
                if vmaxvq_u8(eq) != 0 {
                    for i in 0..window_len {
                        if tmp[i] == first && self.verify_at(buf, pos + i) {
                            return Some(pos + i);
                        }
                    }
                }
                pos += (16 - plen + 1).max(1);
            }
            None
        }
    }

    impl Engine for NeonEngine {
        fn scan(&self, params: &SearchParams, buf: &[u8], mut result: Option<&mut MatchResult>) -> u64 {
            let mut state = AcceptState::new(params);
            let plen = self.pattern.len();
            let mut cursor = 0usize;
            loop {
                let found = unsafe { self.find_from(buf, cursor) };
                let Some(start) = found else { break };
                let end = start + plen;
                match state.accept(buf, start, end, result.as_deref_mut()) {
                    Accept::CountedAndDone => return state.count,
                    Accept::Rejected if state.count_lines_mode => {
                        cursor = state.line_skip_cursor(buf, start);
                        continue;
                    }
                    _ => {}
                }
                cursor = if self.repetitive { end } else { start + 1 };
            }
            state.count
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simd_available_does_not_panic_on_any_target() {
        let _ = simd_available();
    }
}
