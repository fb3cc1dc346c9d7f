//! reqwest-backed transport.
//!
//! # Responsibilities
//! - Convert pipeline requests into reqwest requests and back
//! - Apply connect/request timeouts from config
//! - Shrink the request timeout to whatever is left of the call deadline
//!
//! # Design Decisions
//! - Client-level redirects are disabled; redirect policy belongs to the pipeline
//! - Response bodies are buffered before returning

use std::time::{Duration, Instant};

use futures_util::future::BoxFuture;
use reqwest::redirect::Policy;

use crate::config::TimeoutConfig;
use crate::error::{PipelineError, Result};
use crate::http::{Body, Request, Response};
use crate::net::transport::Transport;
use crate::observability::metrics;

/// Transport that performs exchanges with a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client with redirects disabled and the given timeouts.
    pub fn new(timeouts: &TimeoutConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.request_secs))
            .build()
            .map_err(PipelineError::transport)?;
        Ok(Self { client })
    }

    /// Wrap an existing client. Its redirect policy should be `Policy::none()`.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn execute(&self, mut request: Request) -> Result<Response> {
        let start_time = Instant::now();
        let method = request.method().clone();
        let remaining = request.remaining();

        let mut builder = self
            .client
            .request(method.clone(), request.url().clone())
            .headers(request.headers().clone());

        if let Some(remaining) = remaining {
            if remaining.is_zero() {
                return Err(PipelineError::DeadlineExceeded);
            }
            builder = builder.timeout(remaining);
        }

        builder = match request.take_body() {
            Body::Empty => builder,
            Body::Buffered(bytes) => builder.body(bytes),
            Body::Streaming(stream) => builder.body(reqwest::Body::wrap_stream(stream)),
        };

        tracing::debug!(
            request_id = %request.id(),
            method = %method,
            url = %request.url(),
            "Sending request"
        );

        let response = builder.send().await.map_err(|e| {
            tracing::debug!(request_id = %request.id(), error = %e, "Transport failure");
            if e.is_timeout() && request.is_expired() {
                PipelineError::DeadlineExceeded
            } else {
                PipelineError::transport(e)
            }
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(PipelineError::transport)?;

        metrics::record_request(method.as_str(), status.as_u16(), start_time);

        Ok(Response::new(status, headers, body))
    }
}

impl Transport for ReqwestTransport {
    fn handle(&self, request: Request) -> BoxFuture<'_, Result<Response>> {
        Box::pin(self.execute(request))
    }
}
