//! Range-aware delivery of in-memory content
//!
//! The response body is a small state machine over a shared buffer. Each time
//! the connection polls for more data it gets at most one chunk, so a large
//! resource is never queued on the socket all at once.

use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use filenest_core::range::if_none_match;
use filenest_core::{ByteRange, RangeOutcome};
use http_body::{Frame, SizeHint};

/// Upper bound on the bytes handed to the connection per poll
pub const SEND_CHUNK_SIZE: usize = 16 * 1024;

/// Body that yields `data[position..position + remaining]` chunk by chunk
#[derive(Debug)]
pub struct RangeBody {
    data: Bytes,
    position: usize,
    remaining: usize,
    chunk_size: usize,
}

impl RangeBody {
    /// A span reaching past the end of `data` is cut short at the end.
    pub fn new(data: Bytes, start: usize, length: usize) -> Self {
        let start = start.min(data.len());
        let remaining = length.min(data.len() - start);
        Self {
            data,
            position: start,
            remaining,
            chunk_size: SEND_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

impl http_body::Body for RangeBody {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, Infallible>>> {
        if self.remaining == 0 {
            return Poll::Ready(None);
        }

        let len = self.remaining.min(self.chunk_size);
        let chunk = self.data.slice(self.position..self.position + len);
        self.position += len;
        self.remaining -= len;

        Poll::Ready(Some(Ok(Frame::data(chunk))))
    }

    fn is_end_stream(&self) -> bool {
        self.remaining == 0
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::with_exact(self.remaining as u64)
    }
}

/// Content to be served by [`serve`]
#[derive(Debug, Clone)]
pub struct StaticContent {
    pub data: Bytes,
    pub mime: String,
    pub etag: String,
    /// Extra `Content-Disposition` value, e.g. for downloads
    pub disposition: Option<String>,
}

/// Answer a request for `content`, honouring `If-None-Match` and `Range`.
///
/// A HEAD request gets the same headers as GET and no body.
pub fn serve(content: StaticContent, method: &Method, request_headers: &HeaderMap) -> Response {
    let etag = HeaderValue::from_str(&content.etag).ok();

    let not_modified = request_headers
        .get(header::IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| if_none_match(value, &content.etag));
    if not_modified {
        let mut headers = HeaderMap::new();
        if let Some(etag) = etag {
            headers.insert(header::ETAG, etag);
        }
        return (StatusCode::NOT_MODIFIED, headers).into_response();
    }

    let range = request_headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok())
        .and_then(ByteRange::parse);
    let outcome = RangeOutcome::decide(range, content.data.len() as u64);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&content.mime)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    if let Some(etag) = etag {
        headers.insert(header::ETAG, etag);
    }
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    headers.insert(
        header::CONTENT_LENGTH,
        HeaderValue::from(outcome.content_length()),
    );
    if let Some(value) = outcome
        .content_range()
        .and_then(|range| HeaderValue::from_str(&range).ok())
    {
        headers.insert(header::CONTENT_RANGE, value);
    }
    if let Some(value) = content
        .disposition
        .as_deref()
        .and_then(|d| HeaderValue::from_str(d).ok())
    {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    let status = StatusCode::from_u16(outcome.status()).unwrap_or(StatusCode::OK);
    let body = if *method == Method::HEAD || outcome.content_length() == 0 {
        Body::empty()
    } else {
        Body::new(RangeBody::new(
            content.data,
            outcome.start() as usize,
            outcome.content_length() as usize,
        ))
    };

    tracing::debug!(
        status = status.as_u16(),
        length = outcome.content_length(),
        "Serving static content"
    );
    (status, headers, body).into_response()
}
