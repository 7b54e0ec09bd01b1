//! Property-style randomized coverage for the single-literal engines,
//! exercised through the public `search_string` entry point rather than any
//! one concrete engine, so the selector's own choice of engine is part of
//! what's under test.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use grepcore::SearchParamsBuilder;

fn count(pattern: &[u8], haystack: &[u8]) -> u64 {
    let params = SearchParamsBuilder::new(vec![pattern.to_vec()]).build().unwrap();
    grepcore::search_buffer(&params, haystack, 1).unwrap().total
}

#[test]
fn small_hits_and_misses() {
    let h = b"abcdef";
    assert_eq!(count(b"a", h), 1);
    assert_eq!(count(b"f", h), 1);
    assert_eq!(count(b"bc", h), 1);
    assert_eq!(count(b"ef", h), 1);
    assert_eq!(count(b"gh", h), 0);
    assert!(count(b"cde", h) > 0);
    assert_eq!(count(b"zzz", h), 0);
}

#[test]
fn overlap_cases() {
    // "aaa" in "aaaaa" overlaps at offsets 0,1,2 -> 3 occurrences.
    assert_eq!(count(b"aaa", b"aaaaa"), 3);
}

#[test]
fn boundary_cases_prefix_suffix() {
    assert_eq!(count(b"NEEDLE", b"NEEDLE--tail"), 1);
    assert_eq!(count(b"NEEDLE", b"head--NEEDLE"), 1);
    assert_eq!(count(b"NEEDLE", b"--head--"), 0);
}

#[test]
fn with_nul_bytes_and_binary_like() {
    let h: &[u8] = b"\x00\x00A\x00B\x00\x00";
    assert_eq!(count(b"A\x00B", h), 1);
    assert_eq!(count(b"\x00\x00\x00", h), 0);
}

#[test]
fn random_blob_hit_middle() {
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    let mut blob = vec![0u8; 32 * 1024];
    rng.fill(blob.as_mut_slice());

    let needle = b"simdgrep-needle";
    let pos = blob.len() / 2 - needle.len() / 2;
    blob[pos..pos + needle.len()].copy_from_slice(needle);

    let params = SearchParamsBuilder::new(vec![needle.to_vec()]).build().unwrap();
    let outcome = grepcore::search_buffer(&params, &blob, 1).unwrap();
    assert_eq!(outcome.total, 1);
    assert_eq!(outcome.positions.unwrap()[0].start as usize, pos);
}

#[test]
fn random_blob_no_hit() {
    let mut rng = StdRng::seed_from_u64(0xBAD5EED);
    let mut blob = vec![0u8; 64 * 1024];
    rng.fill(blob.as_mut_slice());

    // Long enough that accidental collision in random bytes is negligible.
    let needle = b"this-needle-should-not-appear-here-very-unlikely-xxxxxxxx";
    assert_eq!(count(needle, &blob), 0);
}

#[test]
fn long_pattern_edge() {
    let h = vec![b'x'; 1 << 20]; // 1 MiB of 'x'
    let n = vec![b'x'; 64];
    // Overlapping occurrences: every offset in [0, h.len()-n.len()] matches.
    assert_eq!(count(&n, &h), (h.len() - n.len() + 1) as u64);
}
