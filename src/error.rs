//! Error types surfaced by the pipeline.
//!
//! # Design Decisions
//! - Transport failures are propagated untouched; no handler retries them
//! - Retry exhaustion is not an error: the last response is returned as-is
//! - Redirect-budget exhaustion and malformed `Location` headers are distinct hard errors
//! - Construction-time problems live in [`crate::config::ConfigError`], never here

use crate::http::RequestHead;

/// Boxed error produced by a concrete transport.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias used throughout the pipeline.
pub type Result<T, E = PipelineError> = std::result::Result<T, E>;

/// Errors raised while driving a request through the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// DNS, connect, TLS or I/O failure reported by the transport.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// More redirects were returned than the configured budget allows.
    #[error("too many redirects (max {max_redirects}, followed {})", history.len())]
    TooManyRedirects {
        max_redirects: u32,
        history: Vec<RequestHead>,
    },

    /// The `Location` header of a redirect response could not be parsed.
    #[error("invalid URL in location header {location:?}: {source}")]
    InvalidRedirectLocation {
        location: String,
        #[source]
        source: url::ParseError,
    },

    /// A handler produced a URL that no longer parses.
    #[error("invalid request URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The caller-supplied per-call deadline passed before the exchange completed.
    #[error("call deadline exceeded")]
    DeadlineExceeded,
}

impl PipelineError {
    /// Wrap any transport-level error.
    pub fn transport(err: impl Into<BoxError>) -> Self {
        PipelineError::Transport(err.into())
    }

    /// Redirect history carried by a [`PipelineError::TooManyRedirects`].
    pub fn redirect_history(&self) -> Option<&[RequestHead]> {
        match self {
            PipelineError::TooManyRedirects { history, .. } => Some(history),
            _ => None,
        }
    }

    /// True if this error came from the call deadline.
    pub fn is_deadline(&self) -> bool {
        matches!(self, PipelineError::DeadlineExceeded)
    }
}
