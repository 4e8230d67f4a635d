use serde::Deserialize;

/// Declarative compression configuration, matching the shape consumed from
/// the host's configuration object:
///
/// ```json
/// { "compressors": { "encoding": "gzip", "level": 6, "min_length": 256 },
///   "types": ["text/*", "application/json"] }
/// ```
///
/// `compressors` accepts either a single entry (compact form) or a list;
/// list order is preserved in the enabled table and serves as the
/// negotiation tie-break order.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompressionConfig {
    /// Compressor(s) to enable, compact or list form.
    pub compressors: Compressors,

    /// Optional MIME type allow-list. When present, only responses whose
    /// content type matches one of the patterns are considered for
    /// compression.
    #[serde(default)]
    pub types: Option<Vec<String>>,
}

/// The `compressors` member: one entry or several.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Compressors {
    /// Compact single-scheme form.
    Single(CompressorEntry),
    /// List form, in declaration order.
    List(Vec<CompressorEntry>),
}

impl Compressors {
    /// The configured entries in declaration order.
    pub fn entries(&self) -> &[CompressorEntry] {
        match self {
            Compressors::Single(entry) => std::slice::from_ref(entry),
            Compressors::List(entries) => entries,
        }
    }
}

/// One configured compressor.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompressorEntry {
    /// Wire token of the scheme: "deflate", "gzip", "zstd" or "br".
    pub encoding: String,

    /// Compression level in the codec's native range. Unset means the
    /// scheme's documented default.
    #[serde(default)]
    pub level: Option<i32>,

    /// Minimum response length in bytes required to trigger compression.
    /// Unset means no minimum.
    #[serde(default)]
    pub min_length: Option<u64>,
}
