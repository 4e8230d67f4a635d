use crate::config::CompressionConfig;
use crate::error::ConfigError;
use crate::registry::CompressorRegistry;
use crate::service::CompressionService;
use std::sync::Arc;
use tower::Layer;

/// A Tower layer that compresses HTTP response bodies.
///
/// The layer carries a shared [`CompressorRegistry`] built from a
/// [`CompressionConfig`]; every service it wraps negotiates against the same
/// registry. To reconfigure, build a new layer and re-wrap.
#[derive(Debug, Clone)]
pub struct CompressionLayer {
    registry: Arc<CompressorRegistry>,
}

impl CompressionLayer {
    /// Creates a layer from an already-built registry.
    pub fn new(registry: Arc<CompressorRegistry>) -> Self {
        Self { registry }
    }

    /// Builds the registry from configuration and wraps it in a layer.
    pub fn from_config(config: &CompressionConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(Arc::new(CompressorRegistry::from_config(config)?)))
    }
}

impl<S> Layer<S> for CompressionLayer {
    type Service = CompressionService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CompressionService::new(inner, Arc::clone(&self.registry))
    }
}
