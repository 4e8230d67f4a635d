use super::{Encode, copy_out, finished};
use brotli::CompressorWriter;
use std::io::{self, Write};
use std::mem;

const ENCODER_BUFFER: usize = 4096;
const LGWIN: u32 = 22;

/// Brotli stream compressor. The quality parameter is the configured level;
/// each chunk's output is taken out of the sink after the flush, and
/// unwrapping the writer on the final call closes the stream with the
/// brotli terminator.
pub(crate) struct BrotliEncoder {
    stream: Option<CompressorWriter<Vec<u8>>>,
}

impl BrotliEncoder {
    pub(crate) fn new(level: i32) -> Self {
        let quality = level.clamp(0, 11) as u32;
        Self {
            stream: Some(CompressorWriter::new(
                Vec::new(),
                ENCODER_BUFFER,
                quality,
                LGWIN,
            )),
        }
    }
}

impl Encode for BrotliEncoder {
    fn bound(&self, len: usize) -> usize {
        // BrotliEncoderMaxCompressedSize(), rounded up generously to cover
        // flush framing.
        len + (len >> 2) + 1024
    }

    fn compress(&mut self, dst: &mut [u8], src: &[u8], last: bool) -> io::Result<usize> {
        let out = if last {
            let mut stream = self.stream.take().ok_or_else(finished)?;
            stream.write_all(src)?;
            stream.into_inner()
        } else {
            let stream = self.stream.as_mut().ok_or_else(finished)?;
            stream.write_all(src)?;
            stream.flush()?;
            mem::take(stream.get_mut())
        };

        copy_out(dst, &out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::testutil::{compress_chunked, sample_input};
    use std::io::Read;

    fn decode(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        brotli::Decompressor::new(data, 4096)
            .read_to_end(&mut out)
            .unwrap();
        out
    }

    #[test]
    fn chunked_round_trip() {
        let input = sample_input();
        let mut encoder = BrotliEncoder::new(5);
        let compressed = compress_chunked(&mut encoder, &input, 900);
        assert_eq!(decode(&compressed), input);
    }

    #[test]
    fn single_final_chunk_round_trip() {
        let mut encoder = BrotliEncoder::new(11);
        let mut buf = vec![0u8; encoder.bound(11)];
        let n = encoder.compress(&mut buf, b"hello world", true).unwrap();
        assert_eq!(decode(&buf[..n]), b"hello world");
    }

    #[test]
    fn flushed_chunks_are_decodable_as_they_arrive() {
        let mut encoder = BrotliEncoder::new(5);
        let mut buf = vec![0u8; encoder.bound(5)];
        let n = encoder.compress(&mut buf, b"first", false).unwrap();
        assert!(n > 0, "flush should emit the chunk immediately");
    }

    #[test]
    fn sink_is_drained_between_chunks() {
        let mut encoder = BrotliEncoder::new(5);
        let chunk = vec![b'a'; 8192];
        let mut total = Vec::new();
        for _ in 0..50 {
            let mut buf = vec![0u8; encoder.bound(chunk.len())];
            let n = encoder.compress(&mut buf, &chunk, false).unwrap();
            total.extend_from_slice(&buf[..n]);
            let retained = encoder.stream.as_ref().unwrap().get_ref().len();
            assert_eq!(retained, 0, "sink must not accumulate across chunks");
        }

        let mut buf = vec![0u8; encoder.bound(0)];
        let n = encoder.compress(&mut buf, &[], true).unwrap();
        total.extend_from_slice(&buf[..n]);
        assert_eq!(decode(&total), vec![b'a'; 8192 * 50]);
    }
}
