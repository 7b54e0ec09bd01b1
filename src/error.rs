//! Error types and handling infrastructure for grepcore.
//!
//! Errors are grouped into the four taxa the search core distinguishes:
//! input errors (reported before any worker starts), resource errors (local
//! to one allocation, logged and otherwise absorbed), I/O errors (file
//! scoped), and execution errors (chunk scoped).

use std::path::PathBuf;
use thiserror::Error;

/// The error type for every fallible operation in this crate.
#[derive(Error, Debug)]
pub enum GrepError {
    /// A pattern failed to compile, or the pattern set itself is invalid
    /// (e.g. `use_regex` requested with zero patterns).
    #[error("invalid pattern: {message}")]
    InvalidPattern { message: String },

    /// Allocation failed while growing a `MatchResult` or building the
    /// automaton. Non-fatal unless it happens during a merge.
    #[error("resource exhausted: {message}")]
    ResourceExhausted { message: String },

    /// File-scoped I/O failure (open, mmap, read, metadata).
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Chunk-scoped execution failure (e.g. regex execution failed mid-scan).
    #[error("search execution failed: {message}")]
    Execution { message: String },
}

/// Standard result type used throughout grepcore.
pub type Result<T> = std::result::Result<T, GrepError>;

impl GrepError {
    pub fn invalid_pattern(message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            message: message.into(),
        }
    }

    pub fn resource_exhausted(message: impl Into<String>) -> Self {
        Self::ResourceExhausted {
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for GrepError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let e = GrepError::invalid_pattern("empty alternation");
        assert_eq!(e.to_string(), "invalid pattern: empty alternation");

        let e = GrepError::resource_exhausted("out of memory");
        assert_eq!(e.to_string(), "resource exhausted: out of memory");

        let e = GrepError::execution("regex step failed");
        assert_eq!(e.to_string(), "search execution failed: regex step failed");
    }

    #[test]
    fn io_conversion_carries_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "nope");
        let e: GrepError = io_err.into();
        match e {
            GrepError::Io { source, .. } => assert_eq!(source.kind(), std::io::ErrorKind::NotFound),
            _ => panic!("expected Io variant"),
        }
    }
}
