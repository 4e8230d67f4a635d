use super::{Encode, copy_out, finished};
use flate2::Compression;
use flate2::write::ZlibEncoder;
use std::io::{self, Write};
use std::mem;

/// The HTTP "deflate" coding: zlib-wrapped deflate per RFC 1950, matching
/// what zlib's plain `deflateInit()` produces.
pub(crate) struct DeflateEncoder {
    stream: Option<ZlibEncoder<Vec<u8>>>,
}

impl DeflateEncoder {
    pub(crate) fn new(level: i32) -> Self {
        let level = Compression::new(level.clamp(0, 9) as u32);
        Self {
            stream: Some(ZlibEncoder::new(Vec::new(), level)),
        }
    }
}

impl Encode for DeflateEncoder {
    fn bound(&self, len: usize) -> usize {
        // deflateBound(), with slack for a sync flush and the zlib trailer.
        len + (len >> 12) + (len >> 14) + (len >> 25) + 32
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
