//! Streaming codec adapters.
//!
//! Each adapter wraps one third-party compression library behind [`Encode`]:
//! `bound` sizes an output buffer pessimistically, `compress` feeds a chunk
//! and returns the bytes produced for it. Every call flushes the codec
//! stream, so the concatenation of all outputs up to and including the
//! `last = true` call forms one complete stream for the scheme. The final
//! call consumes the codec state; dropping an adapter before that point
//! releases it.

use std::io;

#[cfg(feature = "brotli")]
pub(crate) mod brotli;
#[cfg(feature = "deflate")]
pub(crate) mod deflate;
#[cfg(feature = "gzip")]
pub(crate) mod gzip;
#[cfg(feature = "zstd")]
pub(crate) mod zstd;

/// Uniform interface over one stateful compression stream.
pub(crate) trait Encode: Send {
    /// Worst-case number of output bytes a `compress` call with `len` input
    /// bytes can produce in the stream's current state. Never under-estimates.
    fn bound(&self, len: usize) -> usize;

    /// Feeds `src` into the stream and writes the compressed bytes for this
    /// chunk into `dst`, returning the count. The caller guarantees
    /// `dst.len() >= bound(src.len())`. With `last = true` the stream is
    /// flushed, terminated and its state released; no further calls are
    /// valid after that.
    fn compress(&mut self, dst: &mut [u8], src: &[u8], last: bool) -> io::Result<usize>;
}

#[allow(dead_code)]
pub(crate) fn finished() -> io::Error {
    io::Error::other("compressor already finished")
}

#[allow(dead_code)]
pub(crate) fn copy_out(dst: &mut [u8], out: &[u8]) -> io::Result<usize> {
    if out.len() > dst.len() {
        return Err(io::Error::other("output buffer smaller than compression bound"));
    }
    dst[..out.len()].copy_from_slice(out);
    Ok(out.len())
}
