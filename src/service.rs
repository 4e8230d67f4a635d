use crate::future::ResponseFuture;
use crate::registry::CompressorRegistry;
use http::Request;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::Service;

/// A Tower service that negotiates and compresses HTTP response bodies.
#[derive(Debug, Clone)]
pub struct CompressionService<S> {
    inner: S,
    registry: Arc<CompressorRegistry>,
}

impl<S> CompressionService<S> {
    /// Creates a new compression service wrapping the given inner service.
    pub fn new(inner: S, registry: Arc<CompressorRegistry>) -> Self {
        Self { inner, registry }
    }

    /// Returns a reference to the inner service.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Returns a mutable reference to the inner service.
    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Consumes this service, returning the inner service.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for CompressionService<S>
where
    S: Service<Request<ReqBody>, Response = http::Response<ResBody>>,
{
    type Response = http::Response<crate::body::CompressionBody<ResBody>>;
    type Error = S::Error;
    type Future = ResponseFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        // The request is gone by the time the response arrives, so the
        // Accept-Encoding value is captured up front.
        let accept_encoding = self.registry.accept_encoding(req.headers());

        let inner = self.inner.call(req);

        ResponseFuture::new(inner, Arc::clone(&self.registry), accept_encoding)
    }
}
