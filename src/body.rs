use crate::session::CompressionSession;
use bytes::{Buf, Bytes, BytesMut};
use http_body::{Body, Frame};
use pin_project_lite::pin_project;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

pin_project! {
    /// A response body that may be compressed.
    ///
    /// Wraps an inner body and either drives it through the session's
    /// committed compressor, passes it through unchanged, or yields nothing
    /// (used for replacement responses such as 406).
    #[project = CompressionBodyProj]
    #[allow(missing_docs)]
    pub enum CompressionBody<B> {
        /// Compressed body driven by a committed session.
        Compressed {
            #[pin]
            inner: B,
            state: CompressedBody,
        },
        /// Passthrough body without compression.
        Passthrough {
            #[pin]
            inner: B,
        },
        /// No body at all.
        Empty,
    }
}

/// Driving state for an actively compressed body.
pub struct CompressedBody {
    session: CompressionSession,
    state: CompressState,
    pending_trailers: Option<http::HeaderMap>,
}

/// State machine for compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CompressState {
    /// Reading data from the inner body and compressing.
    Reading,
    /// Finishing the codec stream after the inner body is done.
    Finishing,
    /// Emitting buffered trailers.
    Trailers,
    /// Compression is complete.
    Done,
}

impl CompressedBody {
    fn new(session: CompressionSession) -> Self {
        Self {
            session,
            state: CompressState::Reading,
            pending_trailers: None,
        }
    }

    pub(crate) fn state(&self) -> CompressState {
        self.state
    }

    /// Polls the inner body and compresses data.
    fn poll_compressed<B>(
        &mut self,
        cx: &mut Context<'_>,
        mut inner: Pin<&mut B>,
    ) -> Poll<Option<Result<Frame<Bytes>, io::Error>>>
    where
        B: Body,
        B::Data: Buf,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        loop {
            match self.state {
                CompressState::Done => return Poll::Ready(None),

                CompressState::Trailers => {
                    self.state = CompressState::Done;
                    if let Some(trailers) = self.pending_trailers.take() {
                        return Poll::Ready(Some(Ok(Frame::trailers(trailers))));
                    }
                    return Poll::Ready(None);
                }

                CompressState::Finishing => match self.compress_chunk(&[], true) {
                    Ok(data) => {
                        self.state = if self.pending_trailers.is_some() {
                            CompressState::Trailers
                        } else {
                            CompressState::Done
                        };
                        if let Some(data) = data {
                            return Poll::Ready(Some(Ok(Frame::data(data))));
                        }
                    }
                    Err(e) => return Poll::Ready(Some(Err(e))),
                },

                CompressState::Reading => match inner.as_mut().poll_frame(cx) {
                    Poll::Pending => return Poll::Pending,
                    Poll::Ready(None) => {
                        self.state = CompressState::Finishing;
                    }
                    Poll::Ready(Some(Err(e))) => {
                        return Poll::Ready(Some(Err(io::Error::other(e.into()))));
                    }
                    Poll::Ready(Some(Ok(frame))) => match frame.into_data() {
                        Ok(data) => {
                            let input = collect_bytes(data);
                            match self.compress_chunk(&input, false) {
                                Ok(Some(data)) => {
                                    return Poll::Ready(Some(Ok(Frame::data(data))));
                                }
                                // Codec kept the chunk buffered; read more.
                                Ok(None) => {}
                                Err(e) => return Poll::Ready(Some(Err(e))),
                            }
                        }
                        Err(frame) => {
                            if let Ok(trailers) = frame.into_trailers() {
                                // Finish the codec stream before the trailers go out.
                                self.pending_trailers = Some(trailers);
                                self.state = CompressState::Finishing;
                            }
                        }
                    },
                },
            }
        }
    }

    /// Compresses one chunk, sizing the output buffer from the session's
    /// bound. Returns `None` when the codec produced nothing for it.
    fn compress_chunk(&mut self, input: &[u8], last: bool) -> io::Result<Option<Bytes>> {
        let mut buf = vec![0u8; self.session.bound(input.len())];
        let written = self.session.compress(&mut buf, input, last)?;
        if written == 0 {
            return Ok(None);
        }
        buf.truncate(written);
        Ok(Some(Bytes::from(buf)))
    }
}

impl<B> CompressionBody<B> {
    /// Creates a compressed body driven by a committed session.
    pub fn compressed(inner: B, session: CompressionSession) -> Self {
        Self::Compressed {
            inner,
            state: CompressedBody::new(session),
        }
    }

    /// Creates a passthrough body without compression.
    pub fn passthrough(inner: B) -> Self {
        Self::Passthrough { inner }
    }

    /// Creates an empty body.
    pub fn empty() -> Self {
        Self::Empty
    }
}

impl<B> Body for CompressionBody<B>
where
    B: Body,
    B::Data: Buf,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        match self.project() {
            CompressionBodyProj::Passthrough { inner } => match inner.poll_frame(cx) {
                Poll::Pending => Poll::Pending,
                Poll::Ready(None) => Poll::Ready(None),
                Poll::Ready(Some(Ok(frame))) => {
                    let frame = frame.map_data(|data| {
                        let mut bytes = BytesMut::with_capacity(data.remaining());
                        let mut chunk = data;
                        while chunk.has_remaining() {
                            let slice = chunk.chunk();
                            bytes.extend_from_slice(slice);
                            chunk.advance(slice.len());
                        }
                        bytes.freeze()
                    });
                    Poll::Ready(Some(Ok(frame)))
                }
                Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(io::Error::other(e.into())))),
            },
            CompressionBodyProj::Compressed { inner, state } => state.poll_compressed(cx, inner),
            CompressionBodyProj::Empty => Poll::Ready(None),
        }
    }

    fn is_end_stream(&self) -> bool {
        match self {
            CompressionBody::Passthrough { inner } => inner.is_end_stream(),
            CompressionBody::Compressed { state, .. } => state.state() == CompressState::Done,
            CompressionBody::Empty => true,
        }
    }

    fn size_hint(&self) -> http_body::SizeHint {
        match self {
            CompressionBody::Passthrough { inner } => inner.size_hint(),
            // Compressed size is unknown
            CompressionBody::Compressed { .. } => http_body::SizeHint::default(),
            CompressionBody::Empty => http_body::SizeHint::with_exact(0),
        }
    }
}

fn collect_bytes<D: Buf>(mut data: D) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(data.remaining());
    while data.has_remaining() {
        let chunk = data.chunk();
        bytes.extend_from_slice(chunk);
        let len = chunk.len();
        data.advance(len);
    }
    bytes
}
