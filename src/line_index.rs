//! Line boundary helpers: locate the start/end of the line surrounding
//! a byte offset. The newline byte is LF (0x0A); CR is not treated specially.

/// Returns the least index `j <= pos` such that `j == 0` or `buf[j-1] == b'\n'`.
pub fn line_start(buf: &[u8], pos: usize) -> usize {
    let pos = pos.min(buf.len());
    match memchr::memrchr(b'\n', &buf[..pos]) {
        Some(i) => i + 1,
        None => 0,
    }
}

/// Returns the least index `k >= pos` such that `k == buf.len()` or
/// `buf[k] == b'\n'`.
pub fn line_end(buf: &[u8], pos: usize) -> usize {
    let pos = pos.min(buf.len());
    match memchr::memchr(b'\n', &buf[pos..]) {
        Some(i) => pos + i,
        None => buf.len(),
    }
}
