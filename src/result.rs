//! Match result model: an ordered, append-only list of match positions
//! with geometric growth, merge-with-translation, and truncation.

use crate::error::{GrepError, Result};

/// A half-open byte range `[start, end)` into the searched buffer.
///
/// `start == end` is legal and represents an empty (zero-width) match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MatchPosition {
    pub start: u64,
    pub end: u64,
}

impl MatchPosition {
    pub fn new(start: u64, end: u64) -> Self {
        debug_assert!(start <= end, "match start must not exceed end");
        Self { start, end }
    }

    /// Translate both endpoints by `base`, used when merging a chunk-local
    /// result into the global one.
    fn translated(self, base: u64) -> Self {
        Self {
            start: self.start + base,
            end: self.end + base,
        }
    }
}

/// A grow-on-demand ordered list of [`MatchPosition`].
///
/// `push` preserves arrival order and never partially appends: either the
/// position is stored or the push fails and the list is unchanged. `merge`
/// appends another result's positions, translated by a base offset,
/// reserving capacity for the combined length in one step.
#[derive(Debug, Clone, Default)]
pub struct MatchResult {
    positions: Vec<MatchPosition>,
}

impl MatchResult {
    /// Creates an empty store with room for `capacity` positions before the
    /// first reallocation.
    pub fn new(capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn as_slice(&self) -> &[MatchPosition] {
        &self.positions
    }

    pub fn into_vec(self) -> Vec<MatchPosition> {
        self.positions
    }

    /// Appends one match in arrival order. Capacity doubles on overflow via
    /// `Vec`'s own growth strategy, which is geometric and never shrinks.
    ///
    /// Returns an error (rather than panicking) only if the allocator itself
    /// fails to grow the backing storage; callers on that path log a warning
    /// and continue counting without tracking the position (see the
    /// ERROR HANDLING DESIGN resource-error policy).
    pub fn push(&mut self, start: u64, end: u64) -> Result<()> {
        // `Vec::push` aborts the process on allocation failure in stable Rust
        // (there is no fallible push in std); `try_reserve` is the only
        // surface that can report exhaustion without aborting, so the
        // capacity check is made explicit here to honor the "never
        // partially appends" contract on failed growth.
        if self.positions.len() == self.positions.capacity() {
            self.positions
                .try_reserve(self.positions.len().max(1))
                .map_err(|e| GrepError::resource_exhausted(e.to_string()))?;
        }
        self.positions.push(MatchPosition::new(start, end));
        Ok(())
    }

    /// Merges `src` into `self`, translating every position by `base_offset`.
    /// Reserves capacity for the combined length in a single reallocation
    /// and preserves `src`'s internal order.
    pub fn merge(&mut self, src: &MatchResult, base_offset: u64) -> Result<()> {
        self.positions
            .try_reserve(src.positions.len())
            .map_err(|e| GrepError::resource_exhausted(e.to_string()))?;
        self.positions
            .extend(src.positions.iter().map(|p| p.translated(base_offset)));
        Ok(())
    }

    /// Sorts in lexicographic `(start, end)` order. Order among equal keys
    /// carries no meaning here, so `sort_unstable` is used.
    pub fn sort_by_start_then_end(&mut self) {
        self.positions.sort_unstable();
    }

    /// Truncates to at most `n` entries, keeping the lexicographically
    /// smallest ones if the list is already sorted.
    pub fn truncate(&mut self, n: usize) {
        self.positions.truncate(n);
    }

    /// Releases the backing storage explicitly, ahead of whatever scope
    /// would otherwise drop it.
    pub fn destroy(&mut self) {
        self.positions = Vec::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_preserves_arrival_order() {
        let mut r = MatchResult::new(0);
        r.push(5, 8).unwrap();
        r.push(1, 2).unwrap();
        r.push(3, 3).unwrap();
        assert_eq!(
            r.as_slice(),
            &[
                MatchPosition::new(5, 8),
                MatchPosition::new(1, 2),
                MatchPosition::new(3, 3),
            ]
        );
    }

    #[test]
    fn merge_translates_and_preserves_order() {
        let mut global = MatchResult::new(0);
        global.push(0, 3).unwrap();

        let mut local = MatchResult::new(0);
        local.push(0, 2).unwrap();
        local.push(10, 12).unwrap();

        global.merge(&local, 100).unwrap();
        assert_eq!(
            global.as_slice(),
            &[
                MatchPosition::new(0, 3),
                MatchPosition::new(100, 102),
                MatchPosition::new(110, 112),
            ]
        );
    }

    #[test]
    fn sort_then_end_is_lexicographic() {
        let mut r = MatchResult::new(0);
        r.push(5, 5).unwrap();
        r.push(1, 9).unwrap();
        r.push(1, 3).unwrap();
        r.sort_by_start_then_end();
        assert_eq!(
            r.as_slice(),
            &[
                MatchPosition::new(1, 3),
                MatchPosition::new(1, 9),
                MatchPosition::new(5, 5),
            ]
        );
    }

    #[test]
    fn truncate_keeps_prefix() {
        let mut r = MatchResult::new(0);
        for i in 0..10u64 {
            r.push(i, i + 1).unwrap();
        }
        r.truncate(3);
        assert_eq!(r.len(), 3);
        assert_eq!(r.as_slice()[2], MatchPosition::new(2, 3));
    }

    #[test]
    fn destroy_empties_the_store() {
        let mut r = MatchResult::new(4);
        r.push(0, 1).unwrap();
        r.destroy();
        assert!(r.is_empty());
    }

    #[test]
    fn empty_match_is_legal() {
        let p = MatchPosition::new(4, 4);
        assert_eq!(p.start, p.end);
    }
}
