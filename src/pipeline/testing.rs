//! Scripted transport for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use futures_util::future::BoxFuture;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};

use crate::error::{PipelineError, Result};
use crate::http::{Body, Request, RequestHead, Response};
use crate::net::Transport;

/// What the transport received for one call.
#[derive(Debug, Clone)]
pub struct Seen {
    pub head: RequestHead,
    pub body: Option<Bytes>,
    pub streamed: bool,
    pub options_len: usize,
}

/// Replies from a queue, then with `fallback` (or 200 OK) once it runs dry.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Response>>,
    fallback: Option<(StatusCode, HeaderMap)>,
    fail: bool,
    seen: Mutex<Vec<Seen>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Response>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(responses.into()),
            ..Default::default()
        })
    }

    /// Answer every call with a copy of `response`.
    pub fn repeating(response: Response) -> Arc<Self> {
        Arc::new(Self {
            fallback: Some((response.status(), response.headers().clone())),
            ..Default::default()
        })
    }

    /// Fail every call with a transport error.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Default::default()
        })
    }

    pub fn requests(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    fn next_response(&self) -> Response {
        if let Some(response) = self.script.lock().unwrap().pop_front() {
            return response;
        }
        match &self.fallback {
            Some((status, headers)) => Response::new(*status, headers.clone(), Bytes::new()),
            None => Response::with_status(StatusCode::OK),
        }
    }
}

impl Transport for ScriptedTransport {
    fn handle(&self, mut request: Request) -> BoxFuture<'_, Result<Response>> {
        let (body, streamed) = match request.take_body() {
            Body::Empty => (None, false),
            Body::Buffered(bytes) => (Some(bytes), false),
            Body::Streaming(_) => (None, true),
        };
        self.seen.lock().unwrap().push(Seen {
            head: request.head(),
            body,
            streamed,
            options_len: request.options().len(),
        });

        let result = if self.fail {
            Err(PipelineError::transport(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )))
        } else {
            Ok(self.next_response())
        };
        Box::pin(async move { result })
    }
}

/// Build a response with the given status and headers and an empty body.
pub fn response(status: u16, headers: &[(&str, &str)]) -> Response {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        map.append(
            HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_str(value).unwrap(),
        );
    }
    Response::new(StatusCode::from_u16(status).unwrap(), map, Bytes::new())
}
