use crate::encoder::Encode;
use crate::error::CompressionError;
use crate::registry::CompressorRegistry;
use http::header;
use http::response::Parts;
use std::fmt;
use std::io;

/// Per-response compression state.
///
/// Created once, when response headers are final and before any body bytes
/// are sent; consumed across body-chunk writes. [`begin`] runs the full
/// decision ladder (enabled schemes, body length, MIME allow-list, existing
/// `Content-Encoding`, negotiation, minimum length) and, when a real scheme
/// is committed, edits the response headers and initializes the codec
/// stream. Dropping the session releases any codec state that the final
/// chunk never consumed.
///
/// All calls on one session must come from the same logical flow of
/// control; nothing here locks.
///
/// [`begin`]: CompressionSession::begin
pub struct CompressionSession {
    idx: usize,
    encoder: Option<Box<dyn Encode + Send>>,
}

impl CompressionSession {
    /// Decides whether the response described by `parts` gets compressed,
    /// and with which scheme.
    ///
    /// On commit this sets `Content-Encoding`, drops `Content-Length` and
    /// `Accept-Ranges`, adds `Accept-Encoding` to `Vary`, and initializes
    /// the codec at the configured (or default) level. A session that
    /// decided against compression is still returned; check
    /// [`wants_compression`](Self::wants_compression).
    ///
    /// # Errors
    ///
    /// [`CompressionError::NotAcceptable`] when the client excluded every
    /// offered encoding including identity; the response must not be sent
    /// as-is. [`CompressionError::Codec`] when the codec library failed to
    /// set up its stream.
    pub fn begin(
        registry: &CompressorRegistry,
        accept_encoding: Option<&str>,
        parts: &mut Parts,
    ) -> Result<Self, CompressionError> {
        let session = Self {
            idx: 0,
            encoder: None,
        };

        if !registry.any_enabled() {
            return Ok(session);
        }

        let clen = content_length(parts);
        if clen == Some(0) {
            return Ok(session);
        }

        let Some(mime_type) = content_type(parts) else {
            return Ok(session);
        };
        if let Some(rule) = registry.mime_rule() {
            if !rule.matches(&mime_type) {
                tracing::trace!(mime_type, "content type not in allow-list");
                return Ok(session);
            }
        }

        // Never double-encode, and leave range responses alone.
        if parts.headers.contains_key(header::CONTENT_ENCODING)
            || parts.headers.contains_key(header::CONTENT_RANGE)
        {
            return Ok(session);
        }

        let idx = registry.negotiate(accept_encoding.unwrap_or(""))?;
        if idx == 0 {
            return Ok(session);
        }

        let compressor = &registry.table()[idx];
        if let (Some(len), Some(min)) = (clen, compressor.min_length) {
            if len < min {
                tracing::trace!(len, min, "response below minimum length");
                return Ok(session);
            }
        }

        let token = compressor.ctype.token;
        parts.headers.insert(
            header::CONTENT_ENCODING,
            header::HeaderValue::from_static(token),
        );
        // Compressed size is unknown and byte ranges no longer line up.
        parts.headers.remove(header::CONTENT_LENGTH);
        parts.headers.remove(header::ACCEPT_RANGES);
        add_vary_accept_encoding(&mut parts.headers);

        let encoder = compressor.ctype.new_encoder(compressor.level)?;
        tracing::debug!(token, "compressing response");

        Ok(Self {
            idx,
            encoder: Some(encoder),
        })
    }

    /// A session that always passes bytes through, for hosts that decided
    /// against compression out of band.
    pub fn identity() -> Self {
        Self {
            idx: 0,
            encoder: None,
        }
    }

    /// True when a real (non-identity) scheme was committed.
    pub fn wants_compression(&self) -> bool {
        self.idx > 0
    }

    /// Worst-case output size for a [`compress`](Self::compress) call with
    /// `len` input bytes. For a passthrough session this is just `len`.
    pub fn bound(&self, len: usize) -> usize {
        match &self.encoder {
            Some(encoder) => encoder.bound(len),
            None => len,
        }
    }

    /// Compresses one body chunk into `dst`, returning the bytes written.
    ///
    /// The caller sizes `dst` with [`bound`](Self::bound). The final chunk
    /// is marked with `last = true`; the codec stream is then flushed,
    /// terminated and released, and no further calls are valid.
    pub fn compress(&mut self, dst: &mut [u8], src: &[u8], last: bool) -> io::Result<usize> {
        let encoder = self
            .encoder
            .as_mut()
            .ok_or_else(|| io::Error::other("no compressor committed for this session"))?;
        let written = encoder.compress(dst, src, last)?;
        if last {
            self.encoder = None;
        }
        Ok(written)
    }
}

impl fmt::Debug for CompressionSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompressionSession")
            .field("idx", &self.idx)
            .field("committed", &self.encoder.is_some())
            .finish()
    }
}

fn content_length(parts: &Parts) -> Option<u64> {
    parts
        .headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

fn content_type(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

/// Adds Accept-Encoding to the Vary header unless a wildcard or an existing
/// entry already covers it.
fn add_vary_accept_encoding(headers: &mut header::HeaderMap) {
    for vary in headers.get_all(header::VARY) {
        if let Ok(vary_str) = vary.to_str() {
            let covered = vary_str.split(',').any(|v| {
                let v = v.trim();
                v.eq_ignore_ascii_case("*") || v.eq_ignore_ascii_case("accept-encoding")
            });
            if covered {
                return;
            }
        }
    }

    headers.append(
        header::VARY,
        header::HeaderValue::from_static("accept-encoding"),
    );
}
