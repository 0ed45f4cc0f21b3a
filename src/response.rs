use axum::http::header::{CONTENT_TYPE, InvalidHeaderValue};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum_extra::TypedHeader;
use axum_extra::headers::{AcceptRanges, ContentLength, ContentRange};
use bytes::Bytes;

use crate::PartialContent;

/// Media type every response is labelled with unless configured otherwise.
pub const DEFAULT_CONTENT_TYPE: &str = "video/mp4";

/// Fixed media description attached to every response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaConfig {
    content_type: HeaderValue,
}

impl MediaConfig {
    pub fn new(content_type: &str) -> Result<Self, InvalidHeaderValue> {
        let content_type = HeaderValue::from_str(content_type)?;
        Ok(MediaConfig { content_type })
    }

    pub fn content_type(&self) -> &HeaderValue {
        &self.content_type
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        MediaConfig { content_type: HeaderValue::from_static(DEFAULT_CONTENT_TYPE) }
    }
}

/// Builds the 206 response describing a [`PartialContent`].
#[derive(Debug, Clone, Default)]
pub struct ResponseAssembler {
    media: MediaConfig,
}

impl ResponseAssembler {
    pub fn new(media: MediaConfig) -> Self {
        ResponseAssembler { media }
    }

    pub fn assemble(&self, content: PartialContent) -> PartialContentResponse {
        let (body, window) = content.into_parts();
        let content_range = ContentRange::bytes(window.start()..=window.end(), window.total_size())
            .expect("ContentRange::bytes cannot panic for a resolved window");

        PartialContentResponse {
            content_type: self.media.content_type.clone(),
            content_range,
            content_length: ContentLength(window.len()),
            body,
        }
    }
}

/// Computed headers and body of a range response. Implements [`IntoResponse`].
#[derive(Debug, Clone)]
pub struct PartialContentResponse {
    content_type: HeaderValue,
    content_range: ContentRange,
    content_length: ContentLength,
    body: Bytes,
}

impl PartialContentResponse {
    pub fn status(&self) -> StatusCode {
        StatusCode::PARTIAL_CONTENT
    }

    pub fn content_type(&self) -> &HeaderValue {
        &self.content_type
    }

    pub fn content_range(&self) -> &ContentRange {
        &self.content_range
    }

    pub fn content_length(&self) -> ContentLength {
        self.content_length
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

impl IntoResponse for PartialContentResponse {
    fn into_response(self) -> Response {
        let PartialContentResponse { content_type, content_range, content_length, body } = self;
        (
            StatusCode::PARTIAL_CONTENT,
            [(CONTENT_TYPE, content_type)],
            TypedHeader(AcceptRanges::bytes()),
            TypedHeader(content_length),
            TypedHeader(content_range),
            body,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum_extra::headers::{ContentLength, ContentRange};

    use super::*;
    use crate::{KnownSize, RangeRequest, RangeResolver, read_window};

    const CONTENT: &[u8] = b"Hello world this is a file to test range requests on!\n";

    async fn content(start: u64, end: Option<u64>) -> PartialContent {
        let window = RangeResolver::default()
            .resolve(&RangeRequest { start, end }, CONTENT.len() as u64)
            .unwrap();
        let body = KnownSize::sized(Cursor::new(CONTENT), CONTENT.len() as u64);
        read_window(body, window).await.unwrap()
    }

    #[tokio::test]
    async fn test_assembled_headers() {
        let response = ResponseAssembler::default().assemble(content(0, Some(29)).await);

        assert_eq!(StatusCode::PARTIAL_CONTENT, response.status());
        assert_eq!("video/mp4", response.content_type());
        assert_eq!(ContentLength(30), response.content_length());
        assert_eq!(&ContentRange::bytes(0..30, 54).unwrap(), response.content_range());
        assert_eq!(&b"Hello world this is a file to "[..], &response.body()[..]);
    }

    #[tokio::test]
    async fn test_into_response() {
        let response = ResponseAssembler::default().assemble(content(30, None).await).into_response();

        assert_eq!(StatusCode::PARTIAL_CONTENT, response.status());
        let head = response.headers();
        assert_eq!("video/mp4", head["content-type"]);
        assert_eq!("bytes", head["accept-ranges"]);
        assert_eq!("24", head["content-length"]);
        assert_eq!("bytes 30-53/54", head["content-range"]);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&b"test range requests on!\n"[..], &body[..]);
    }

    #[tokio::test]
    async fn test_custom_content_type() {
        let assembler = ResponseAssembler::new(MediaConfig::new("video/webm").unwrap());
        let response = assembler.assemble(content(0, None).await).into_response();
        assert_eq!("video/webm", response.headers()["content-type"]);
    }

    #[test]
    fn test_invalid_content_type() {
        assert!(MediaConfig::new("video/mp4\n").is_err());
        assert_eq!("video/mp4", MediaConfig::default().content_type());
    }
}
