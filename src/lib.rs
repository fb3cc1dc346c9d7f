//! Outbound HTTP request pipeline.
//!
//! A request passes through an ordered chain of handlers (redirect, retry,
//! query name decoding, URL replacement, User-Agent tagging, header
//! inspection) before a pluggable transport performs the exchange.

// Core
pub mod error;
pub mod http;
pub mod net;
pub mod pipeline;

// Handlers
pub mod middleware;

// Cross-cutting concerns
pub mod config;
pub mod observability;
pub mod resilience;

pub use config::{load_config, ConfigError, PipelineConfig};
pub use error::{PipelineError, Result};
pub use http::{Body, HandlerOption, Request, RequestHead, RequestOptions, Response};
pub use net::{ReqwestTransport, Transport};
pub use pipeline::{Handler, Next, Pipeline, PipelineBuilder};
