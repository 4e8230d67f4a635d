use crate::body::CompressionBody;
use crate::error::CompressionError;
use crate::registry::CompressorRegistry;
use crate::session::CompressionSession;
use http::{Response, StatusCode, header};
use pin_project_lite::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

pin_project! {
    /// Future for compression service responses.
    pub struct ResponseFuture<F> {
        #[pin]
        inner: F,
        registry: Arc<CompressorRegistry>,
        accept_encoding: Option<String>,
    }
}

impl<F> ResponseFuture<F> {
    pub(crate) fn new(
        inner: F,
        registry: Arc<CompressorRegistry>,
        accept_encoding: Option<String>,
    ) -> Self {
        Self {
            inner,
            registry,
            accept_encoding,
        }
    }
}

impl<F, B, E> Future for ResponseFuture<F>
where
    F: Future<Output = Result<Response<B>, E>>,
{
    type Output = Result<Response<CompressionBody<B>>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        match this.inner.poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Err(e)) => Poll::Ready(Err(e)),
            Poll::Ready(Ok(response)) => {
                let response =
                    wrap_response(response, this.registry, this.accept_encoding.as_deref());
                Poll::Ready(Ok(response))
            }
        }
    }
}

/// Runs the compression decision for a finished response and wraps its body.
///
/// A negotiation failure replaces the response with an empty 406; a codec
/// setup failure with an empty 500. Either way the original body is dropped
/// rather than sent in an encoding the client cannot take.
fn wrap_response<B>(
    response: Response<B>,
    registry: &CompressorRegistry,
    accept_encoding: Option<&str>,
) -> Response<CompressionBody<B>> {
    let (mut parts, body) = response.into_parts();

    match CompressionSession::begin(registry, accept_encoding, &mut parts) {
        Ok(session) if session.wants_compression() => {
            Response::from_parts(parts, CompressionBody::compressed(body, session))
        }
        Ok(_) => Response::from_parts(parts, CompressionBody::passthrough(body)),
        Err(CompressionError::NotAcceptable(_)) => {
            tracing::debug!(
                accept_encoding,
                "client refused every offered encoding, responding 406"
            );
            error_response(StatusCode::NOT_ACCEPTABLE)
        }
        Err(CompressionError::Codec(error)) => {
            tracing::error!(%error, "failed to initialize compressor");
            error_response(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn error_response<B>(status: StatusCode) -> Response<CompressionBody<B>> {
    let mut response = Response::new(CompressionBody::empty());
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_LENGTH, header::HeaderValue::from_static("0"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    #[allow(unused_imports)]
    use crate::body::CompressState;

    fn registry(json: &str) -> CompressorRegistry {
        CompressorRegistry::from_config(&serde_json::from_str(json).unwrap()).unwrap()
    }

    fn make_response_with_headers<I>(body: &'static str, headers: I) -> Response<&'static str>
    where
        I: IntoIterator<Item = (&'static str, &'static str)>,
    {
        let mut response = Response::new(body);
        for (name, value) in headers {
            response
                .headers_mut()
                .insert(name, header::HeaderValue::from_static(value));
        }
        response
    }

    #[test]
    #[cfg(feature = "gzip")]
    fn test_compress_when_negotiation_commits() {
        let registry = registry(r#"{ "compressors": { "encoding": "gzip" } }"#);
        let response = make_response_with_headers("hello world", [("content-type", "text/plain")]);
        let wrapped = wrap_response(response, &registry, Some("gzip"));

        match wrapped.body() {
            CompressionBody::Compressed { state, .. } => {
                assert_eq!(state.state(), CompressState::Reading);
            }
            _ => panic!("Expected compressed body"),
        }

        assert_eq!(
            wrapped.headers().get(header::CONTENT_ENCODING).unwrap(),
            "gzip"
        );
    }

    #[test]
    #[cfg(feature = "gzip")]
    fn test_passthrough_without_accept_encoding() {
        let registry = registry(r#"{ "compressors": { "encoding": "gzip" } }"#);
        let response = make_response_with_headers("hello world", [("content-type", "text/plain")]);
        let wrapped = wrap_response(response, &registry, None);

        match wrapped.body() {
            CompressionBody::Passthrough { .. } => {}
            _ => panic!("Expected passthrough body"),
        }

        assert!(wrapped.headers().get(header::CONTENT_ENCODING).is_none());
    }

    #[test]
    #[cfg(feature = "gzip")]
    fn test_passthrough_when_content_encoding_present() {
        let registry = registry(r#"{ "compressors": { "encoding": "gzip" } }"#);
        let response = make_response_with_headers(
            "hello world",
            [("content-type", "text/plain"), ("content-encoding", "br")],
        );
        let wrapped = wrap_response(response, &registry, Some("gzip"));

        match wrapped.body() {
            CompressionBody::Passthrough { .. } => {}
            _ => panic!("Expected passthrough body"),
        }
    }

    #[test]
    #[cfg(feature = "gzip")]
    fn test_rejection_becomes_406() {
        let registry = registry(r#"{ "compressors": { "encoding": "gzip" } }"#);
        let response = make_response_with_headers("hello world", [("content-type", "text/plain")]);
        let wrapped = wrap_response(response, &registry, Some("identity;q=0, gzip;q=0"));

        assert_eq!(wrapped.status(), StatusCode::NOT_ACCEPTABLE);
        assert_eq!(wrapped.headers().get(header::CONTENT_LENGTH).unwrap(), "0");
        match wrapped.body() {
            CompressionBody::Empty => {}
            _ => panic!("Expected empty body"),
        }
    }

    #[test]
    #[cfg(feature = "gzip")]
    fn test_mime_allow_list_blocks_compression() {
        let registry =
            registry(r#"{ "compressors": { "encoding": "gzip" }, "types": ["text/*"] }"#);
        let response = make_response_with_headers("PNG data", [("content-type", "image/png")]);
        let wrapped = wrap_response(response, &registry, Some("gzip"));

        match wrapped.body() {
            CompressionBody::Passthrough { .. } => {}
            _ => panic!("Expected passthrough body for image/png"),
        }
    }

    #[test]
    #[cfg(feature = "gzip")]
    fn test_below_min_length_passes_through() {
        let registry =
            registry(r#"{ "compressors": { "encoding": "gzip", "min_length": 100 } }"#);
        let response = make_response_with_headers(
            "small",
            [("content-type", "text/plain"), ("content-length", "5")],
        );
        let wrapped = wrap_response(response, &registry, Some("gzip"));

        match wrapped.body() {
            CompressionBody::Passthrough { .. } => {}
            _ => panic!("Expected passthrough body below min_length"),
        }
        assert_eq!(wrapped.headers().get(header::CONTENT_LENGTH).unwrap(), "5");
    }

    #[test]
    #[cfg(feature = "zstd")]
    fn test_zstd_content_encoding() {
        let registry = registry(r#"{ "compressors": { "encoding": "zstd" } }"#);
        let response = make_response_with_headers("hello world", [("content-type", "text/plain")]);
        let wrapped = wrap_response(response, &registry, Some("zstd"));

        assert_eq!(
            wrapped.headers().get(header::CONTENT_ENCODING).unwrap(),
            "zstd"
        );
    }

    #[test]
    #[cfg(feature = "brotli")]
    fn test_brotli_content_encoding() {
        let registry = registry(r#"{ "compressors": { "encoding": "br" } }"#);
        let response = make_response_with_headers("hello world", [("content-type", "text/plain")]);
        let wrapped = wrap_response(response, &registry, Some("br"));

        assert_eq!(
            wrapped.headers().get(header::CONTENT_ENCODING).unwrap(),
            "br"
        );
    }
}
