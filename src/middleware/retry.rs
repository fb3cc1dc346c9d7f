//! Retry logic.
//!
//! # Responsibilities
//! - Determine if a response is retryable (method, status, replayable body)
//! - Wait for the server's `Retry-After` hint, or back off exponentially
//! - Stop at the retry count, the cumulative back-off ceiling, or the call deadline
//!
//! # Design Decisions
//! - Forward-only streaming bodies are never resent
//! - Transport errors are never retried; only status-coded responses are
//! - Exhaustion is not an error: the caller sees the last response
//! - Retry counters live on the call frame, so one handler serves many calls

use std::collections::BTreeSet;
use std::time::Duration;

use futures_util::future::BoxFuture;
use http::{HeaderName, HeaderValue, Method};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::http::{HandlerOption, Request, Response};
use crate::observability::metrics;
use crate::pipeline::{Handler, Next};
use crate::resilience::backoff::calculate_backoff;
use crate::resilience::retry_after::retry_after;
use crate::resilience::timeouts::{check_deadline, sleep_within};

/// Header telling the server which resend this is.
pub static RETRY_ATTEMPT: HeaderName = HeaderName::from_static("retry-attempt");

/// Upper bound accepted for `max_retries`.
pub const MAX_MAX_RETRIES: u32 = 10;

/// Upper bound accepted for `delay_ms`.
pub const MAX_DELAY_MS: u64 = 180_000;

/// Retry policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryOptions {
    /// Master switch.
    pub should_retry: bool,

    /// Maximum number of resends after the first attempt.
    pub max_retries: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub delay_ms: u64,

    /// Ceiling on the cumulative back-off for one call, in seconds.
    pub timeout_secs: u64,

    /// Methods eligible for retry (upper case).
    pub allowed_methods: BTreeSet<String>,

    /// Prefer the server's `Retry-After` over computed backoff.
    pub respect_retry_after_header: bool,

    /// Statuses that trigger a retry.
    pub retry_on_status_codes: BTreeSet<u16>,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            should_retry: true,
            max_retries: 3,
            delay_ms: 3_000,
            timeout_secs: 100,
            allowed_methods: ["HEAD", "GET", "PUT", "POST", "PATCH", "DELETE", "OPTIONS"]
                .into_iter()
                .map(String::from)
                .collect(),
            respect_retry_after_header: true,
            retry_on_status_codes: [429, 503, 504].into_iter().collect(),
        }
    }
}

impl HandlerOption for RetryOptions {
    const KEY: &'static str = "RetryHandlerOption";
}

impl RetryOptions {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn is_method_retryable(&self, method: &Method) -> bool {
        self.allowed_methods.contains(method.as_str())
    }

    /// Method allowed, status listed, and the body can be sent again.
    pub fn should_retry(&self, request: &Request, response: &Response) -> bool {
        self.is_method_retryable(request.method())
            && self
                .retry_on_status_codes
                .contains(&response.status().as_u16())
            && request.is_replayable()
    }

    /// True while `attempt` resends have not used up the budget.
    pub fn check_retry_valid(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }

    /// Delay before resend number `attempt` (1-based).
    pub fn retry_delay(&self, response: &Response, attempt: u32) -> Duration {
        if self.respect_retry_after_header {
            if let Some(delay) = retry_after(response.headers()) {
                return delay;
            }
        }
        calculate_backoff(attempt, self.delay(), self.timeout())
    }
}

/// Resends requests that failed with a transient status.
#[derive(Debug, Clone, Default)]
pub struct RetryHandler {
    options: RetryOptions,
}

impl RetryHandler {
    pub fn new(options: RetryOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RetryOptions {
        &self.options
    }

    pub fn should_retry(&self, request: &Request, response: &Response) -> bool {
        self.options.should_retry(request, response)
    }

    pub fn check_retry_valid(&self, attempt: u32) -> bool {
        self.options.check_retry_valid(attempt)
    }

    async fn send_with_retries(&self, request: Request, next: Next<'_>) -> Result<Response> {
        let options = request.options().resolve(&self.options);
        if !options.should_retry || !options.is_method_retryable(request.method()) {
            return next.run(request).await;
        }

        let template = request;
        let mut attempt: u32 = 0;
        let mut waited = Duration::ZERO;

        loop {
            check_deadline(template.deadline())?;

            let Some(mut outbound) = template.try_clone() else {
                tracing::debug!(
                    request_id = %template.id(),
                    "Streaming body, sending without retry"
                );
                return next.run(template).await;
            };
            if attempt > 0 {
                outbound
                    .headers_mut()
                    .insert(RETRY_ATTEMPT.clone(), HeaderValue::from(attempt));
            }

            let response = next.run(outbound).await?;

            if !options.should_retry(&template, &response) {
                return Ok(response);
            }
            if !options.check_retry_valid(attempt) {
                tracing::info!(
                    request_id = %template.id(),
                    attempts = attempt + 1,
                    status = %response.status(),
                    "Retries exhausted"
                );
                return Ok(response);
            }

            let delay = options.retry_delay(&response, attempt + 1);
            if waited + delay > options.timeout() {
                tracing::info!(
                    request_id = %template.id(),
                    delay = ?delay,
                    waited = ?waited,
                    "Retry delay exceeds timeout, giving up"
                );
                return Ok(response);
            }

            attempt += 1;
            waited += delay;
            metrics::record_retry(template.method().as_str(), response.status().as_u16());
            tracing::info!(
                request_id = %template.id(),
                attempt,
                delay = ?delay,
                status = %response.status(),
                "Retrying request"
            );

            sleep_within(delay, template.deadline()).await?;
        }
    }
}

impl Handler for RetryHandler {
    fn name(&self) -> &'static str {
        "RetryHandler"
    }

    fn send<'a>(&'a self, request: Request, next: Next<'a>) -> BoxFuture<'a, Result<Response>> {
        Box::pin(self.send_with_retries(request, next))
    }
}
