use crate::config::CompressionConfig;
use crate::error::{ConfigError, NotAcceptable};
use crate::mime::MimeRule;
use crate::negotiate;
use crate::query::HeaderQuery;
use crate::scheme::{self, CompressorType};
use http::HeaderMap;

const ACCEPT_ENCODING_QUERY: &str = "$header_accept_encoding";

/// One enabled compressor: its static type plus the configured level and
/// minimum-length threshold (`None` meaning unset).
#[derive(Debug)]
pub(crate) struct CompressorConfig {
    pub(crate) ctype: &'static CompressorType,
    pub(crate) level: Option<i32>,
    pub(crate) min_length: Option<u64>,
}

impl CompressorConfig {
    fn identity() -> Self {
        Self {
            ctype: scheme::identity_type(),
            level: None,
            min_length: None,
        }
    }
}

/// The set of compressors enabled by one configuration, plus the compiled
/// MIME allow-list and Accept-Encoding extraction query.
///
/// Built once per configuration load and read-only afterwards; share it
/// across request flows with an `Arc`. Reconfiguration builds a fresh
/// registry and swaps the `Arc`; sessions bound to the old one keep it
/// alive until they finish.
#[derive(Debug)]
pub struct CompressorRegistry {
    table: Vec<CompressorConfig>,
    mime_rule: Option<MimeRule>,
    accept_encoding: HeaderQuery,
}

impl CompressorRegistry {
    /// Builds a registry from a [`CompressionConfig`].
    ///
    /// Identity is forced into slot 0; configured entries follow in
    /// declaration order, which is also the negotiation tie-break order.
    /// An `encoding` token the static catalog does not know is a
    /// configuration error.
    pub fn from_config(config: &CompressionConfig) -> Result<Self, ConfigError> {
        let mime_rule = config.types.as_ref().map(|types| MimeRule::new(types));
        let accept_encoding = HeaderQuery::compile(ACCEPT_ENCODING_QUERY)?;

        let mut table = vec![CompressorConfig::identity()];
        for entry in config.compressors.entries() {
            let ctype = scheme::lookup_token(&entry.encoding)
                .ok_or_else(|| ConfigError::UnknownEncoding(entry.encoding.clone()))?;
            table.push(CompressorConfig {
                ctype,
                level: entry.level,
                min_length: entry.min_length,
            });
        }

        tracing::debug!(
            enabled = ?table.iter().map(|c| c.ctype.token).collect::<Vec<_>>(),
            "compression configured"
        );

        Ok(Self {
            table,
            mime_rule,
            accept_encoding,
        })
    }

    /// True iff `token` names a scheme known to the static catalog,
    /// independent of what this registry enables.
    pub fn is_valid_token(token: &str) -> bool {
        scheme::is_valid_token(token)
    }

    /// Selects the enabled-table index for an `Accept-Encoding` value.
    ///
    /// `Ok(0)` is identity (send uncompressed); [`NotAcceptable`] means the
    /// client excluded every option, identity included.
    pub fn negotiate(&self, accept_encoding: &str) -> Result<usize, NotAcceptable> {
        negotiate::select(accept_encoding, &self.table)
    }

    /// Evaluates the compiled Accept-Encoding query against request headers.
    pub fn accept_encoding(&self, headers: &HeaderMap) -> Option<String> {
        self.accept_encoding.evaluate(headers)
    }

    pub(crate) fn table(&self) -> &[CompressorConfig] {
        &self.table
    }

    pub(crate) fn mime_rule(&self) -> Option<&MimeRule> {
        self.mime_rule.as_ref()
    }

    /// True when at least one real scheme is enabled beyond identity.
    pub(crate) fn any_enabled(&self) -> bool {
        self.table.len() > 1
    }
}
