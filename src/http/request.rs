//! Outbound request representation.
//!
//! # Responsibilities
//! - Carry method, URL, headers and body through the handler chain
//! - Tag every call with a unique request ID for tracing
//! - Know whether its body can be replayed (retry, redirect)
//! - Hold the per-call options side-channel and the optional call deadline
//!
//! # Design Decisions
//! - Request ID assigned at construction, never sent on the wire
//! - Streaming bodies are forward-only; `try_clone` refuses them
//! - Redirect history stores body-less [`RequestHead`] snapshots

use std::fmt;
use std::io;
use std::pin::Pin;
use std::time::{Duration, Instant};

use bytes::Bytes;
use futures_util::Stream;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use url::Url;
use uuid::Uuid;

use crate::http::options::RequestOptions;

/// Forward-only stream of body chunks.
pub type BodyStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send + Sync>>;

/// Request payload.
#[derive(Default)]
pub enum Body {
    /// No payload.
    #[default]
    Empty,
    /// Fully buffered payload; can be sent any number of times.
    Buffered(Bytes),
    /// Streaming payload; can be sent once.
    Streaming(BodyStream),
}

impl Body {
    /// Wrap a chunk stream as a forward-only body.
    pub fn streaming<S>(stream: S) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + Sync + 'static,
    {
        Body::Streaming(Box::pin(stream))
    }

    /// True for empty and buffered bodies.
    pub fn is_replayable(&self) -> bool {
        !matches!(self, Body::Streaming(_))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Body::Empty => true,
            Body::Buffered(bytes) => bytes.is_empty(),
            Body::Streaming(_) => false,
        }
    }

    /// Clone the body if it is replayable.
    pub fn try_clone(&self) -> Option<Body> {
        match self {
            Body::Empty => Some(Body::Empty),
            Body::Buffered(bytes) => Some(Body::Buffered(bytes.clone())),
            Body::Streaming(_) => None,
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Empty => f.write_str("Empty"),
            Body::Buffered(bytes) => write!(f, "Buffered({} bytes)", bytes.len()),
            Body::Streaming(_) => f.write_str("Streaming"),
        }
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::Buffered(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Buffered(Bytes::from(bytes))
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Buffered(Bytes::from(text))
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Body::Buffered(Bytes::from_static(text.as_bytes()))
    }
}

/// Body-less snapshot of a request, kept in redirect history and on responses.
#[derive(Debug, Clone)]
pub struct RequestHead {
    pub id: Uuid,
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

/// An outbound HTTP request travelling through the pipeline.
#[derive(Debug)]
pub struct Request {
    id: Uuid,
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Body,
    options: RequestOptions,
    deadline: Option<Instant>,
}

impl Request {
    /// Create a request with no headers and no body.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            id: Uuid::new_v4(),
            method,
            url,
            headers: HeaderMap::new(),
            body: Body::Empty,
            options: RequestOptions::new(),
            deadline: None,
        }
    }

    /// Shorthand for `GET url`.
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Abandon the call once `timeout` has elapsed from now.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn method_mut(&mut self) -> &mut Method {
        &mut self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn url_mut(&mut self) -> &mut Url {
        &mut self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    /// Take the body out, leaving [`Body::Empty`] behind.
    pub fn take_body(&mut self) -> Body {
        std::mem::take(&mut self.body)
    }

    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut RequestOptions {
        &mut self.options
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, `None` when the call has none.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// True once the per-call deadline has passed.
    pub fn is_expired(&self) -> bool {
        self.deadline
            .map(|deadline| Instant::now() >= deadline)
            .unwrap_or(false)
    }

    pub fn is_replayable(&self) -> bool {
        self.body.is_replayable()
    }

    /// Body-less snapshot of this request.
    pub fn head(&self) -> RequestHead {
        RequestHead {
            id: self.id,
            method: self.method.clone(),
            url: self.url.clone(),
            headers: self.headers.clone(),
        }
    }

    /// Full copy for resending, `None` if the body is a stream.
    pub fn try_clone(&self) -> Option<Request> {
        let body = self.body.try_clone()?;
        Some(Self {
            id: self.id,
            method: self.method.clone(),
            url: self.url.clone(),
            headers: self.headers.clone(),
            body,
            options: self.options.clone(),
            deadline: self.deadline,
        })
    }

    /// Rebuild a request from a head, keeping the call identity, options and deadline.
    pub(crate) fn from_parts(
        head: RequestHead,
        body: Body,
        options: RequestOptions,
        deadline: Option<Instant>,
    ) -> Self {
        Self {
            id: head.id,
            method: head.method,
            url: head.url,
            headers: head.headers,
            body,
            options,
            deadline,
        }
    }
}
