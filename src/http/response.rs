//! Response handling.
//!
//! # Responsibilities
//! - Hold status, headers and the buffered body returned by the transport
//! - Point back at the request that produced it
//! - Carry metadata attached by handlers on the way back (redirect history,
//!   inspected headers)
//!
//! # Design Decisions
//! - Status and body are read-only once the transport built the response
//! - Handler metadata lives in typed extensions, not extra fields

use bytes::Bytes;
use http::{Extensions, HeaderMap, StatusCode};

use crate::http::request::RequestHead;

/// An HTTP response flowing back up the handler chain.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    request: Option<RequestHead>,
    history: Vec<RequestHead>,
    extensions: Extensions,
}

impl Response {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
            request: None,
            history: Vec::new(),
            extensions: Extensions::new(),
        }
    }

    /// Empty-bodied response with the given status.
    pub fn with_status(status: StatusCode) -> Self {
        Self::new(status, HeaderMap::new(), Bytes::new())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value as a string, if present and visible ASCII.
    pub fn header_str(&self, name: impl http::header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// The request that produced this response.
    pub fn request(&self) -> Option<&RequestHead> {
        self.request.as_ref()
    }

    pub(crate) fn set_request(&mut self, request: RequestHead) {
        self.request = Some(request);
    }

    /// Requests that were redirected before this response, oldest first.
    pub fn history(&self) -> &[RequestHead] {
        &self.history
    }

    pub(crate) fn set_history(&mut self, history: Vec<RequestHead>) {
        self.history = history;
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }
}
