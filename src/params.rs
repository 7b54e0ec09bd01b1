//! Search parameters: the immutable configuration every engine reads,
//! plus the pattern set it was built from and the engine-specific compiled
//! artifacts (automaton, regex) a `SearchParamsBuilder` produces eagerly so
//! no engine ever compiles on the hot path.

use crate::engines::aho_corasick::AhoCorasickAutomaton;
use crate::engines::regex_engine::RegexAdapter;
use crate::error::{GrepError, Result};

/// An ordered collection of one or more literal or regex pattern strings,
/// each held as raw bytes. At least one pattern is required; an individual
/// pattern's bytes may be empty (matches the empty string at every offset).
#[derive(Debug, Clone, Default)]
pub struct PatternSet(Vec<Vec<u8>>);

impl PatternSet {
    pub fn new(patterns: Vec<Vec<u8>>) -> Self {
        Self(patterns)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The first (and, for single-pattern engines, only) pattern's bytes.
    /// Callers only reach for this once `build()` has already validated that
    /// at least one pattern exists.
    pub fn first(&self) -> &[u8] {
        &self.0[0]
    }

    pub fn as_slice(&self) -> &[Vec<u8>] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec<u8>> {
        self.0.iter()
    }
}

/// The fully-resolved configuration a scan runs against. Every field here is
/// read, never written, by the engines in `engines::*` — construction and
/// validation is entirely the builder's job.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub patterns: PatternSet,
    pub case_sensitive: bool,
    pub whole_word: bool,
    pub use_regex: bool,
    pub count_lines_mode: bool,
    pub track_positions: bool,
    pub max_count: u64,
    /// Populated by the builder whenever `use_regex` is false; read by
    /// [`crate::engines::aho_corasick::AcScan`] and by the selector to fall
    /// back to the automaton's empty-pattern convention.
    pub(crate) automaton: Option<AhoCorasickAutomaton>,
    /// Populated by the builder whenever `use_regex` is true; read by
    /// [`crate::engines::regex_engine::RegexScan`].
    pub(crate) regex: Option<RegexAdapter>,
}

impl SearchParams {
    pub fn automaton(&self) -> Option<&AhoCorasickAutomaton> {
        self.automaton.as_ref()
    }

    pub fn regex(&self) -> Option<&RegexAdapter> {
        self.regex.as_ref()
    }
}

/// Builds a [`SearchParams`], compiling the regex or automaton eagerly so
/// `build()` is the only fallible step in the whole pipeline.
pub struct SearchParamsBuilder {
    patterns: Vec<Vec<u8>>,
    case_sensitive: bool,
    whole_word: bool,
    use_regex: bool,
    count_lines_mode: bool,
    track_positions: bool,
    max_count: u64,
}

impl SearchParamsBuilder {
    pub fn new(patterns: Vec<Vec<u8>>) -> Self {
        Self {
            patterns,
            case_sensitive: true,
            whole_word: false,
            use_regex: false,
            count_lines_mode: false,
            track_positions: true,
            max_count: u64::MAX,
        }
    }

    pub fn case_sensitive(mut self, yes: bool) -> Self {
        self.case_sensitive = yes;
        self
    }

    pub fn whole_word(mut self, yes: bool) -> Self {
        self.whole_word = yes;
        self
    }

    pub fn use_regex(mut self, yes: bool) -> Self {
        self.use_regex = yes;
        self
    }

    pub fn count_lines_mode(mut self, yes: bool) -> Self {
        self.count_lines_mode = yes;
        self
    }

    pub fn track_positions(mut self, yes: bool) -> Self {
        self.track_positions = yes;
        self
    }

    pub fn max_count(mut self, n: u64) -> Self {
        self.max_count = n;
        self
    }

    /// Validates the pattern set and eagerly compiles the automaton or
    /// regex it will need, so no engine ever compiles one on the hot path.
    pub fn build(self) -> Result<SearchParams> {
        if self.patterns.is_empty() {
            return Err(GrepError::invalid_pattern("at least one pattern is required"));
        }

        let (automaton, regex) = if self.use_regex {
            let adapter = RegexAdapter::compile(&self.patterns, self.case_sensitive)?;
            (None, Some(adapter))
        } else {
            let automaton = AhoCorasickAutomaton::build(&self.patterns, self.case_sensitive);
            (Some(automaton), None)
        };

        Ok(SearchParams {
            patterns: PatternSet::new(self.patterns),
            case_sensitive: self.case_sensitive,
            whole_word: self.whole_word,
            use_regex: self.use_regex,
            count_lines_mode: self.count_lines_mode,
            track_positions: self.track_positions,
            max_count: self.max_count,
            automaton,
            regex,
        })
    }
}
