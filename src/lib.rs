//! Configurable HTTP response compression middleware for Tower.
//!
//! This crate provides a Tower layer that negotiates a content coding
//! against the client's `Accept-Encoding` header and compresses response
//! bodies with the winning scheme. The enabled schemes, their levels and
//! minimum-length thresholds, and an optional MIME type allow-list all come
//! from a declarative [`CompressionConfig`].
//!
//! # Example
//!
//! ```ignore
//! use tower_compress::{CompressionConfig, CompressionLayer};
//! use tower::ServiceBuilder;
//!
//! let config: CompressionConfig = serde_json::from_str(
//!     r#"{ "compressors": [
//!             { "encoding": "br", "level": 4 },
//!             { "encoding": "gzip", "min_length": 256 }
//!         ],
//!         "types": ["text/*", "application/json"] }"#,
//! )?;
//!
//! let service = ServiceBuilder::new()
//!     .layer(CompressionLayer::from_config(&config)?)
//!     .service(my_service);
//! ```
//!
//! # Negotiation
//!
//! The `Accept-Encoding` value is parsed as the weighted list of RFC 9110
//! §12.5.3. Among the enabled schemes the highest weight wins; equal weights
//! resolve to the later entry in the header. Identity is always on offer,
//! and `*` stands in for it. A request that excludes every offered scheme
//! and identity too (for example `identity;q=0` with nothing else enabled)
//! is answered with an empty `406 Not Acceptable`.
//!
//! # Compression Rules
//!
//! A committed scheme is skipped when:
//! - no scheme beyond identity is enabled
//! - `Content-Length` is `0`
//! - the response has no `Content-Type`, or it misses the `types` allow-list
//! - `Content-Encoding` is already set, or `Content-Range` is present
//! - negotiation picked identity
//! - a known `Content-Length` is below the scheme's `min_length`
//!
//! # Response Modifications
//!
//! When compression is applied:
//! - `Content-Encoding` is set to the scheme's token
//! - `Content-Length` is removed (compressed size is unknown)
//! - `Accept-Ranges` is removed
//! - `Vary` gains `Accept-Encoding`

#![deny(missing_docs)]

mod body;
mod config;
mod encoder;
mod error;
mod future;
mod layer;
mod mime;
mod negotiate;
mod query;
mod registry;
mod scheme;
mod service;
mod session;

pub use body::{CompressedBody, CompressionBody};
pub use config::{CompressionConfig, CompressorEntry, Compressors};
pub use error::{CompressionError, ConfigError, NotAcceptable};
pub use future::ResponseFuture;
pub use layer::CompressionLayer;
pub use registry::CompressorRegistry;
pub use scheme::{Scheme, is_valid_token};
pub use service::CompressionService;
pub use session::CompressionSession;
