//! Streaming I/O helpers that don't depend on a memory map: the
//! overlap-preserving chunker used by [`crate::driver::search_reader`] for
//! stdin/pipe sources that can't be mapped ahead of time.

pub mod chunker;
