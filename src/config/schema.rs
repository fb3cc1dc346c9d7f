//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the pipeline.
//! All types derive Serde traits for deserialization from config files.
//! Handler sections reuse the handlers' own option types, so a config file
//! and a per-request override speak the same shape.

use serde::{Deserialize, Serialize};

use crate::middleware::{
    HeadersInspectionOptions, ParametersNameDecodingOptions, RedirectOptions, RetryOptions,
    UrlReplaceOptions, UserAgentOptions,
};

/// Root configuration for the pipeline and its transport.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Transport timeouts.
    pub timeouts: TimeoutConfig,

    /// Retry handler defaults.
    pub retry: RetryOptions,

    /// Redirect handler defaults.
    pub redirect: RedirectOptions,

    /// Query parameter name decoding defaults.
    pub parameters_decoding: ParametersNameDecodingOptions,

    /// URL replacement defaults.
    pub url_replace: UrlReplaceOptions,

    /// User-Agent tagging defaults.
    pub user_agent: UserAgentOptions,

    /// Header inspection defaults.
    pub headers_inspection: HeadersInspectionOptions,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Timeout configuration for the transport.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 30,
            request_secs: 100,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Install the Prometheus recorder.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
        }
    }
}
