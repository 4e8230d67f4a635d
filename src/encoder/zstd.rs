use super::{Encode, copy_out, finished};
use std::io::{self, Write};
use std::mem;
use zstd::stream::write::Encoder as ZstdStream;

pub(crate) struct ZstdEncoder {
    stream: Option<ZstdStream<'static, Vec<u8>>>,
}

impl ZstdEncoder {
    /// Stream allocation can fail inside libzstd; the caller treats that as
    /// fatal for the session.
    pub(crate) fn new(level: i32) -> io::Result<Self> {
        Ok(Self {
            stream: Some(ZstdStream::new(Vec::new(), level)?),
        })
    }
}

impl Encode for ZstdEncoder {
    fn bound(&self, len: usize) -> usize {
        // ZSTD_compressBound(), with slack for the flushed block and frame
        // epilogue.
        zstd::zstd_safe::compress_bound(len) + 16
    }

    fn compress(&mut self, dst: &mut [u8], src: &[u8], last: bool) -> io::Result<usize> {
        let out = if last {
            let mut stream = self.stream.take().ok_or_else(finished)?;
            stream.write_all(src)?;
            stream.finish()?
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

    #[test]
    fn chunked_round_trip() {
        let input = sample_input();
        let mut encoder = ZstdEncoder::new(3).unwrap();
        let compressed = compress_chunked(&mut encoder, &input, 1024);
        assert_eq!(zstd::stream::decode_all(&compressed[..]).unwrap(), input);
    }

    #[test]
    fn single_final_chunk_round_trip() {
        let mut encoder = ZstdEncoder::new(19).unwrap();
        let mut buf = vec![0u8; encoder.bound(11)];
        let n = encoder.compress(&mut buf, b"hello world", true).unwrap();
        assert_eq!(
            zstd::stream::decode_all(&buf[..n]).unwrap(),
            b"hello world"
        );
    }

    #[test]
    fn compress_after_finish_fails() {
        let mut encoder = ZstdEncoder::new(3).unwrap();
        let mut buf = vec![0u8; encoder.bound(0)];
        encoder.compress(&mut buf, &[], true).unwrap();
        assert!(encoder.compress(&mut buf, b"more", false).is_err());
    }
}
