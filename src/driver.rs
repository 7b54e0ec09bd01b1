//! Chunked parallel driver: splits a buffer into pattern-overlapping chunks,
//! dispatches one scan per chunk through the thread pool, and merges the
//! per-chunk results into a single globally-ordered one.
//!
//! `count_lines_mode`, `use_regex`, and `whole_word` all force single-threaded
//! execution (see DESIGN.md): a non-first chunk's region has no left context,
//! so a whole-word check at its local offset 0 can't see whether the real
//! preceding global byte was a word character, and there is no cross-chunk
//! signal to correct it after the fact.

use std::io::Read;
use std::path::Path;
use std::sync::mpsc;
use std::sync::Arc;

use crate::engines::Engine;
use crate::error::{GrepError, Result};
use crate::io::chunker::Chunker;
use crate::params::SearchParams;
use crate::pool;
use crate::result::MatchResult;
use crate::selector::select_engine;

const MIN_CHUNK_BYTES: usize = 4 * 1024 * 1024;

/// Runs the selected engine over `buf`, parallelizing across `threads`
/// workers when the buffer is large enough and the mode allows it.
/// `threads == 0` resolves to `std::thread::available_parallelism()`.
pub fn search_buffer(params: &SearchParams, buf: &[u8], threads: usize) -> Result<(u64, Option<MatchResult>)> {
    let engine = select_engine(params);

    if buf.is_empty() {
        return Ok(scan_single(engine.as_ref(), params, buf));
    }

    let forced_single = params.count_lines_mode || params.use_regex || params.whole_word;
    let resolved = resolve_threads(threads);

    if forced_single || resolved <= 1 {
        return Ok(scan_single(engine.as_ref(), params, buf));
    }

    let worker_count = chunk_plan(buf.len(), resolved);
    if worker_count <= 1 {
        return Ok(scan_single(engine.as_ref(), params, buf));
    }

    run_parallel(params, engine, buf, worker_count)
}

/// Memory-maps `path` (advised `Sequential` + `WillNeed`) and searches it.
/// The map is dropped when this function returns, so no mapping outlives
/// the call that created it.
pub fn search_file(params: &SearchParams, path: &Path, threads: usize) -> Result<(u64, Option<MatchResult>)> {
    let file = std::fs::File::open(path).map_err(|e| GrepError::io(path, e))?;
    let len = file.metadata().map_err(|e| GrepError::io(path, e))?.len();
    if len == 0 {
        return search_buffer(params, &[], threads);
    }

    let mmap = unsafe { memmap2::Mmap::map(&file) }.map_err(|e| GrepError::io(path, e))?;
    // Advise the kernel about access pattern on platforms that support it;
    // non-fatal everywhere since it's a hint, not a correctness requirement.
    #[cfg(unix)]
    {
        if let Err(e) = mmap.advise(memmap2::Advice::Sequential) {
            log::warn!("grepcore: mmap advise(Sequential) failed for {}: {e}", path.display());
        }
        if let Err(e) = mmap.advise(memmap2::Advice::WillNeed) {
            log::warn!("grepcore: mmap advise(WillNeed) failed for {}: {e}", path.display());
        }
    }
    search_buffer(params, &mmap[..], threads)
}

/// Streams `reader` through the overlap-preserving chunker, applying the
/// same primary/overlap boundary discipline as [`run_parallel`] but
/// single-threaded and sequential, since the source cannot be memory-mapped
/// or split ahead of time.
pub fn search_reader<R: Read>(params: &SearchParams, reader: &mut R, _threads: usize) -> Result<(u64, Option<MatchResult>)> {
    let engine = select_engine(params);
    let max_plen = params.patterns.iter().map(|p| p.len()).max().unwrap_or(0);
    let overlap = max_plen.saturating_sub(1);
    let chunk_size = MIN_CHUNK_BYTES.max(overlap + 1);

    let mut worker_params = params.clone();
    worker_params.track_positions = true;
    worker_params.max_count = u64::MAX;

    let mut chunker = Chunker::new(reader, chunk_size, overlap);
    let mut total = 0u64;
    let mut global = MatchResult::new(0);
    let mut chunk_index = 0usize;

    loop {
        let next = chunker.next_chunk().map_err(GrepError::from)?;
        let Some((global_offset, slice)) = next else { break };

        // A match wholly inside the carried prefix was already reported while
        // scanning the previous chunk (those bytes are a verbatim copy of its
        // tail); only matches that extend past the prefix are new here, and
        // that includes every boundary-straddling match, since a straddle
        // can't fit wholly within `overlap == max_plen - 1` bytes.
        let carried = if chunk_index == 0 { 0 } else { overlap.min(slice.len()) };
        let (count, local) = run_chunk(engine.as_ref(), &worker_params, slice, |_start, end| end > carried);
        total += count;
        global.merge(&local, global_offset)?;
        chunk_index += 1;
    }

    if chunk_index == 0 {
        return Ok(scan_single(engine.as_ref(), params, &[]));
    }

    finish(params, total, global)
}

fn resolve_threads(threads: usize) -> usize {
    if threads == 0 {
        std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
    } else {
        threads
    }
}

/// Computes `T = ceil(len/C)` for a chunk size `C` that is `ceil(len/threads)`
/// clamped below by `MIN_CHUNK_BYTES` once `len` exceeds that minimum.
fn chunk_plan(len: usize, threads: usize) -> usize {
    let threads = threads.max(1);
    let mut chunk_size = len.div_ceil(threads);
    if len > MIN_CHUNK_BYTES {
        chunk_size = chunk_size.max(MIN_CHUNK_BYTES);
    }
    chunk_size = chunk_size.max(1);
    len.div_ceil(chunk_size).max(1)
}

fn scan_single(engine: &dyn Engine, params: &SearchParams, buf: &[u8]) -> (u64, Option<MatchResult>) {
    let mut result = params.track_positions.then(|| MatchResult::new(0));
    let count = engine.scan(params, buf, result.as_mut());
    (count, result)
}

/// A raw view into a buffer this function guarantees outlives every worker
/// task: `run_parallel` blocks on `pool.wait_all()` before returning, so no
/// task can observe `buf` after its backing storage is gone. `Send` is
/// asserted manually because the pool's task type requires `'static`.
struct ChunkView {
    ptr: *const u8,
    len: usize,
}
unsafe impl Send for ChunkView {}

impl ChunkView {
    unsafe fn as_slice(&self) -> &[u8] {
        std::slice::from_raw_parts(self.ptr, self.len)
    }
}

fn run_parallel(
    params: &SearchParams,
    engine: Box<dyn Engine>,
    buf: &[u8],
    worker_count: usize,
) -> Result<(u64, Option<MatchResult>)> {
    let len = buf.len();
    let max_plen = params.patterns.iter().map(|p| p.len()).max().unwrap_or(0);
    let overlap = max_plen.saturating_sub(1);
    let chunk_size = len.div_ceil(worker_count);

    let mut worker_params = params.clone();
    worker_params.track_positions = true;
    worker_params.max_count = u64::MAX;
    let worker_params = Arc::new(worker_params);
    let engine: Arc<dyn Engine + Send + Sync> = Arc::from(engine);

    let pool = pool::global_pool(worker_count);
    let (tx, rx) = mpsc::channel();
    let mut dispatched = 0usize;

    for i in 0..worker_count {
        let chunk_start = i * chunk_size;
        if chunk_start >= len {
            break;
        }
        let primary_len = chunk_size.min(len - chunk_start);
        let is_last = i + 1 == worker_count || chunk_start + chunk_size >= len;
        let scan_len = if is_last {
            len - chunk_start
        } else {
            (primary_len + overlap).min(len - chunk_start)
        };
        let threshold = if is_last { scan_len } else { primary_len };

        let view = ChunkView {
            ptr: unsafe { buf.as_ptr().add(chunk_start) },
            len: scan_len,
        };
        let tx = tx.clone();
        let engine = Arc::clone(&engine);
        let worker_params = Arc::clone(&worker_params);

        pool.submit(Box::new(move || {
            let region = unsafe { view.as_slice() };
            let (count, local) = run_chunk(engine.as_ref(), worker_params.as_ref(), region, |start, _end| start < threshold);
            let _ = tx.send((chunk_start as u64, count, local));
        }));
        dispatched += 1;
    }
    drop(tx);

    pool.wait_all();

    let mut total = 0u64;
    let mut global = MatchResult::new(0);
    for _ in 0..dispatched {
        let (chunk_start, count, local) = rx.recv().expect("worker must send exactly one result");
        total += count;
        global.merge(&local, chunk_start)?;
    }

    finish(params, total, global)
}

/// Scans one region, keeping only matches whose local `(start, end)` satisfy
/// `accept`. `params` must have `track_positions` forced on, since the
/// filter needs positions regardless of the caller's original request.
fn run_chunk(
    engine: &dyn Engine,
    params: &SearchParams,
    region: &[u8],
    accept: impl Fn(usize, usize) -> bool,
) -> (u64, MatchResult) {
    let mut local = MatchResult::new(0);
    engine.scan(params, region, Some(&mut local));

    let mut filtered = MatchResult::new(local.len());
    for p in local.into_vec() {
        if accept(p.start as usize, p.end as usize) {
            if let Err(e) = filtered.push(p.start, p.end) {
                log::warn!("grepcore: dropping tracked position during chunk merge, {e}");
            }
        }
    }
    let count = filtered.len() as u64;
    (count, filtered)
}

/// Sorts and truncates the merged global result to `max_count`, and drops
/// the position list if the caller didn't ask to track positions.
fn finish(params: &SearchParams, mut total: u64, mut global: MatchResult) -> Result<(u64, Option<MatchResult>)> {
    global.sort_by_start_then_end();
    if total > params.max_count {
        global.truncate(params.max_count as usize);
        total = params.max_count;
    }
    let positions = if params.track_positions { Some(global) } else { None };
    Ok((total, positions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SearchParamsBuilder;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn empty_buffer_with_empty_pattern_matches_once() {
        init_logging();
        let params = SearchParamsBuilder::new(vec![Vec::new()]).build().unwrap();
        let (count, _) = search_buffer(&params, b"", 4).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn empty_buffer_with_nonempty_pattern_matches_never() {
        let params = SearchParamsBuilder::new(vec![b"x".to_vec()]).build().unwrap();
        let (count, _) = search_buffer(&params, b"", 4).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn single_threaded_and_parallel_agree_on_small_buffer() {
        let params = SearchParamsBuilder::new(vec![b"fox".to_vec()]).build().unwrap();
        let buf = b"The quick brown fox jumps over the lazy fox";
        let (c1, r1) = search_buffer(&params, buf, 1).unwrap();
        let (c2, r2) = search_buffer(&params, buf, 4).unwrap();
        assert_eq!(c1, c2);
        assert_eq!(r1.unwrap().as_slice(), r2.unwrap().as_slice());
    }

    #[test]
    fn parallel_search_finds_matches_straddling_chunk_boundaries() {
        let params = SearchParamsBuilder::new(vec![b"performancetest".to_vec()]).build().unwrap();
        let mut buf = Vec::with_capacity(10 * 1024 * 1024);
        while buf.len() < 10 * 1024 * 1024 {
            buf.extend_from_slice(b"abcdefghijklmnopqrstuvwxyz");
        }
        let l = buf.len();
        buf[l / 4..l / 4 + 15].copy_from_slice(b"performancetest");
        buf[3 * l / 4..3 * l / 4 + 15].copy_from_slice(b"performancetest");

        let (count, positions) = search_buffer(&params, &buf, 4).unwrap();
        assert_eq!(count, 2);
        let positions = positions.unwrap();
        assert_eq!(positions.len(), 2);
        assert_eq!(positions.as_slice()[0].start as usize, l / 4);
        assert_eq!(positions.as_slice()[1].start as usize, 3 * l / 4);
    }

    #[test]
    fn max_count_truncates_after_global_merge() {
        let params = SearchParamsBuilder::new(vec![b"apple".to_vec(), b"orange".to_vec()])
            .max_count(3)
            .build()
            .unwrap();
        let buf = b"apple banana apple orange apple grape apple";
        let (count, positions) = search_buffer(&params, buf, 1).unwrap();
        assert_eq!(count, 3);
        assert_eq!(positions.unwrap().len(), 3);
    }

    #[test]
    fn count_lines_mode_forces_single_threaded_and_is_correct() {
        let params = SearchParamsBuilder::new(vec![b"Line".to_vec()])
            .count_lines_mode(true)
            .build()
            .unwrap();
        let buf = b"Line 1\nLine 2\nLine 3";
        let (count, _) = search_buffer(&params, buf, 8).unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn whole_word_forces_single_threaded_and_rejects_a_false_boundary() {
        // "fox" sits right where a naive chunk split (threads=4 on this
        // buffer length) would place it at a worker's region-local offset 0,
        // which would pass the left word-boundary check unconditionally even
        // though the real preceding byte is 'a'. Forcing single-threaded
        // keeps this rejected, matching the T=1 result.
        let params = SearchParamsBuilder::new(vec![b"fox".to_vec()])
            .whole_word(true)
            .build()
            .unwrap();
        let buf = b"aaaaaaaafoxaa";
        let (count_parallel, _) = search_buffer(&params, buf, 4).unwrap();
        let (count_single, _) = search_buffer(&params, buf, 1).unwrap();
        assert_eq!(count_parallel, count_single);
        assert_eq!(count_single, 0);
    }

    #[test]
    fn chunk_overlap_filter_keeps_straddles_and_drops_already_reported_matches() {
        // Mirrors the filter search_reader builds around each chunk after
        // the first: a match wholly inside the carried prefix was already
        // reported while scanning the previous chunk and must be dropped,
        // while a match that starts before the prefix boundary but ends
        // past it is a straddle that only completes in this chunk.
        let params = SearchParamsBuilder::new(vec![b"NEEDLE".to_vec()]).build().unwrap();
        let mut worker_params = params.clone();
        worker_params.track_positions = true;
        worker_params.max_count = u64::MAX;
        let engine = select_engine(&params);
        let region: &[u8] = b"NEEDLEtail";

        let carried_past_match_end = 6;
        let (count, local) = run_chunk(engine.as_ref(), &worker_params, region, |_start, end| {
            end > carried_past_match_end
        });
        assert_eq!(count, 0);
        assert!(local.is_empty());

        let carried_inside_match = 3;
        let (count, local) = run_chunk(engine.as_ref(), &worker_params, region, |_start, end| {
            end > carried_inside_match
        });
        assert_eq!(count, 1);
        assert_eq!(local.as_slice()[0].start, 0);
    }
}
