//! Received response head.

use crate::http::orderedheaders::OrderedHeaderMap;
use http::{header, StatusCode, Version};

/// Status line and headers of a received response.
///
/// Read-only once built. `chunked` reflects how the transport framed the
/// body, which can differ from what the headers announce.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: StatusCode,
    version: Version,
    headers: OrderedHeaderMap,
    chunked: bool,
}

impl HttpResponse {
    pub fn new(status: StatusCode, headers: OrderedHeaderMap) -> Self {
        Self {
            status,
            version: Version::HTTP_11,
            headers,
            chunked: false,
        }
    }

    /// Create from an `http::response::Parts`.
    pub fn from_parts(parts: &http::response::Parts) -> Self {
        Self {
            status: parts.status,
            version: parts.version,
            headers: OrderedHeaderMap::from(&parts.headers),
            chunked: false,
        }
    }

    /// Mark the body as streamed in chunks by the transport.
    pub fn with_chunked(mut self, chunked: bool) -> Self {
        self.chunked = chunked;
        self
    }

    /// Get the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get the HTTP version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Get a reference to the headers.
    pub fn headers(&self) -> &OrderedHeaderMap {
        &self.headers
    }

    /// The `Location` header, if present and valid UTF-8.
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION.as_str())
            .and_then(|v| v.to_str().ok())
    }

    /// True when the body is chunked, either by `Transfer-Encoding` or by
    /// the transport's own framing.
    pub fn is_chunked(&self) -> bool {
        self.chunked || self.is_transfer_encoding_chunked()
    }

    fn is_transfer_encoding_chunked(&self) -> bool {
        self.headers
            .get_all(header::TRANSFER_ENCODING.as_str())
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .any(|coding| coding.trim().eq_ignore_ascii_case("chunked"))
    }
}
