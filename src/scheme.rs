use crate::encoder::Encode;
use std::io;
use std::sync::LazyLock;

/// Content-coding schemes this crate knows about.
///
/// Identity is the no-op scheme and always occupies slot 0 of the enabled
/// compressor table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// No transformation.
    Identity,
    /// RFC 1950 zlib-wrapped deflate (the HTTP "deflate" coding).
    Deflate,
    /// Gzip.
    Gzip,
    /// Zstandard.
    Zstd,
    /// Brotli.
    Brotli,
}

/// Immutable description of one built-in compressor: its wire token, scheme
/// and default compression level. One instance per scheme, process-wide.
#[derive(Debug)]
pub(crate) struct CompressorType {
    pub(crate) token: &'static str,
    pub(crate) scheme: Scheme,
    pub(crate) default_level: i32,
}

impl CompressorType {
    /// Creates an encoder for this scheme at the given level, falling back
    /// to the scheme's default when the configuration left it unset.
    ///
    /// Levels follow each library's native range; zstd stream allocation can
    /// fail, which is unrecoverable for the session.
    pub(crate) fn new_encoder(&self, level: Option<i32>) -> io::Result<Box<dyn Encode + Send>> {
        let level = level.unwrap_or(self.default_level);
        tracing::trace!(token = self.token, level, "initializing encoder");

        #[allow(unreachable_patterns)]
        match self.scheme {
            #[cfg(feature = "deflate")]
            Scheme::Deflate => Ok(Box::new(crate::encoder::deflate::DeflateEncoder::new(level))),
            #[cfg(feature = "gzip")]
            Scheme::Gzip => Ok(Box::new(crate::encoder::gzip::GzipEncoder::new(level))),
            #[cfg(feature = "zstd")]
            Scheme::Zstd => Ok(Box::new(crate::encoder::zstd::ZstdEncoder::new(level)?)),
            #[cfg(feature = "brotli")]
            Scheme::Brotli => Ok(Box::new(crate::encoder::brotli::BrotliEncoder::new(level))),
            _ => Err(io::Error::other("scheme has no encoder")),
        }
    }
}

/// The static compressor catalog. Identity first; the rest in the order the
/// schemes were introduced, gated on their cargo features.
static CATALOG: LazyLock<Vec<CompressorType>> = LazyLock::new(|| {
    let mut types = vec![CompressorType {
        token: "identity",
        scheme: Scheme::Identity,
        default_level: 0,
    }];
    #[cfg(feature = "deflate")]
    types.push(CompressorType {
        token: "deflate",
        scheme: Scheme::Deflate,
        default_level: 6,
    });
    #[cfg(feature = "gzip")]
    types.push(CompressorType {
        token: "gzip",
        scheme: Scheme::Gzip,
        default_level: 6,
    });
    #[cfg(feature = "zstd")]
    types.push(CompressorType {
        token: "zstd",
        scheme: Scheme::Zstd,
        default_level: 3,
    });
    #[cfg(feature = "brotli")]
    types.push(CompressorType {
        token: "br",
        scheme: Scheme::Brotli,
        default_level: 11,
    });
    types
});

/// Resolves a wire token ("gzip", "br", ...) against the static catalog.
pub(crate) fn lookup_token(token: &str) -> Option<&'static CompressorType> {
    CATALOG.iter().find(|t| t.token.eq_ignore_ascii_case(token))
}

/// The identity entry, always present at the head of the catalog.
pub(crate) fn identity_type() -> &'static CompressorType {
    &CATALOG[0]
}

/// True iff `token` names a scheme known to the static catalog, regardless
/// of what any configuration currently enables.
pub fn is_valid_token(token: &str) -> bool {
    lookup_token(token).is_some()
}
