//! Integration coverage for the streaming, chunk-with-overlap path
//! (`search_reader`) plus the underlying [`grepcore::io::chunker::Chunker`]
//! it is built on.

use std::io::Cursor;

use grepcore::io::chunker::Chunker;
use grepcore::SearchParamsBuilder;

#[test]
fn finds_matches_within_single_chunk() {
    let params = SearchParamsBuilder::new(vec![b"NEEDLE".to_vec()]).build().unwrap();
    let mut reader = Cursor::new(b"xxx-NEEDLE-yyy-NEEDLE-zzz".to_vec());
    let outcome = grepcore::search_reader(&params, &mut reader, 1).unwrap();

    let positions = outcome.positions.unwrap();
    assert_eq!(positions.iter().map(|p| p.start).collect::<Vec<_>>(), vec![4, 15]);
}

#[test]
fn finds_match_straddling_a_chunk_boundary() {
    // "NEEDLE" sits where a small chunk size would split it in half; the
    // chunker's overlap discipline must still let `search_reader` find it.
    let params = SearchParamsBuilder::new(vec![b"NEEDLE".to_vec()]).build().unwrap();
    let mut buf = b"AAAAA".to_vec();
    buf.extend_from_slice(b"NEEDLE");
    buf.extend_from_slice(b"BBBBB");
    let mut reader = Cursor::new(buf);

    let outcome = grepcore::search_reader(&params, &mut reader, 1).unwrap();
    let positions = outcome.positions.unwrap();
    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0].start, 5);
}

#[test]
fn reports_all_overlapping_occurrences() {
    // "aaaaa" contains "aaa" at positions 0,1,2 -> 3 matches.
    let params = SearchParamsBuilder::new(vec![b"aaa".to_vec()]).build().unwrap();
    let mut reader = Cursor::new(b"aaaaa".to_vec());
    let outcome = grepcore::search_reader(&params, &mut reader, 1).unwrap();
    assert_eq!(outcome.total, 3);
}

#[test]
fn empty_input_and_empty_needle_behavior() {
    // Empty stream, non-empty pattern -> no matches.
    let params = SearchParamsBuilder::new(vec![b"abc".to_vec()]).build().unwrap();
    let mut empty = Cursor::new(Vec::<u8>::new());
    let outcome = grepcore::search_reader(&params, &mut empty, 1).unwrap();
    assert_eq!(outcome.total, 0);

    // Empty stream, empty pattern -> one match at (0,0): an empty pattern is
    // defined to match an empty buffer exactly once.
    let empty_pattern = SearchParamsBuilder::new(vec![Vec::new()]).build().unwrap();
    let mut also_empty = Cursor::new(Vec::<u8>::new());
    let outcome = grepcore::search_reader(&empty_pattern, &mut also_empty, 1).unwrap();
    assert_eq!(outcome.total, 1);

    // Non-empty stream, empty pattern -> the automaton's empty-text rule only
    // fires for an empty buffer, so a non-empty stream yields zero.
    let mut non_empty = Cursor::new(b"xyz".to_vec());
    let outcome = grepcore::search_reader(&empty_pattern, &mut non_empty, 1).unwrap();
    assert_eq!(outcome.total, 0);
}

/// A reader that only ever returns a few bytes per call, the way a pipe or
/// socket would, so the chunker's multi-read behavior is actually exercised
/// (an in-memory `Cursor` would otherwise satisfy a whole chunk in one read).
struct SlowReader<'a> {
    data: &'a [u8],
    pos: usize,
    max_read: usize,
}

impl<'a> std::io::Read for SlowReader<'a> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = (self.data.len() - self.pos).min(self.max_read).min(buf.len());
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

#[test]
fn chunker_reassembles_the_original_stream_across_multiple_reads() {
    // Multiple small reads force the chunker to return more than one chunk;
    // each chunk's *new* bytes (past the carried overlap prefix) must
    // reassemble the original stream exactly once, in order.
    let data: Vec<u8> = (0u8..100).collect();
    let mut reader = SlowReader { data: &data, pos: 0, max_read: 3 };
    let mut chunker = Chunker::new(&mut reader, 16, 5);

    let mut reassembled = Vec::new();
    let mut chunk_count = 0;
    while let Some((global_off, chunk)) = chunker.next_chunk().unwrap() {
        chunk_count += 1;
        let new_start = (reassembled.len() as u64).saturating_sub(global_off) as usize;
        reassembled.extend_from_slice(&chunk[new_start.min(chunk.len())..]);
    }

    assert!(chunk_count > 1, "expected the stream to be split into multiple chunks");
    assert_eq!(reassembled, data);
}
