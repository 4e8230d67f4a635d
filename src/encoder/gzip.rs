use super::{Encode, copy_out, finished};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::{self, Write};
use std::mem;

pub(crate) struct GzipEncoder {
    stream: Option<GzEncoder<Vec<u8>>>,
}

impl GzipEncoder {
    pub(crate) fn new(level: i32) -> Self {
        let level = Compression::new(level.clamp(0, 9) as u32);
        Self {
            stream: Some(GzEncoder::new(Vec::new(), level)),
        }
    }
}

impl Encode for GzipEncoder {
    fn bound(&self, len: usize) -> usize {
        // deflateBound(), with slack for a sync flush plus the gzip header
        // and trailer.
        len + (len >> 12) + (len >> 14) + (len >> 25) + 64
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
    use std::io::Read;

    fn decode(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        flate2::read::GzDecoder::new(data)
            .read_to_end(&mut out)
            .unwrap();
        out
    }

    #[test]
    fn chunked_round_trip() {
        let input = sample_input();
        let mut encoder = GzipEncoder::new(6);
        let compressed = compress_chunked(&mut encoder, &input, 777);
        assert_eq!(decode(&compressed), input);
    }

    #[test]
    fn output_carries_gzip_magic() {
        let mut encoder = GzipEncoder::new(6);
        let mut buf = vec![0u8; encoder.bound(11)];
        let n = encoder.compress(&mut buf, b"hello world", true).unwrap();
        assert_eq!(&buf[..2], &[0x1f, 0x8b]);
        assert_eq!(decode(&buf[..n]), b"hello world");
    }

    #[test]
    fn empty_input_round_trip() {
        let mut encoder = GzipEncoder::new(9);
        let mut buf = vec![0u8; encoder.bound(0)];
        let n = encoder.compress(&mut buf, &[], true).unwrap();
        assert_eq!(decode(&buf[..n]), b"");
    }
}
