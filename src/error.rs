use std::io;
use thiserror::Error;

/// Errors raised while building a [`CompressorRegistry`] from configuration.
///
/// These are fatal for the configuration being loaded; a registry is either
/// built whole or not at all.
///
/// [`CompressorRegistry`]: crate::CompressorRegistry
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The `encoding` token does not name a known compressor.
    #[error("unknown content encoding {0:?}")]
    UnknownEncoding(String),

    /// The header-extraction expression could not be compiled.
    #[error("invalid header query {0:?}")]
    InvalidHeaderQuery(String),
}

/// The client's `Accept-Encoding` header excluded every encoding we could
/// offer, including identity.
///
/// This is a request-level failure, distinct from "no compression needed":
/// the response must not be sent with a body encoded in a scheme the client
/// refused.
#[derive(Debug, Error)]
#[error("no acceptable content encoding")]
pub struct NotAcceptable;

/// Errors raised while setting up or driving compression for one response.
#[derive(Debug, Error)]
pub enum CompressionError {
    /// Content-encoding negotiation rejected the request.
    #[error(transparent)]
    NotAcceptable(#[from] NotAcceptable),

    /// The codec library failed to create or drive its stream state.
    /// Unrecoverable for the affected response.
    #[error("compressor failure: {0}")]
    Codec(#[from] io::Error),
}
