//! Pipeline construction.
//!
//! `PipelineBuilder` assembles an explicit chain; `Pipeline::from_config`
//! installs the default chain with defaults taken from a validated config.

use std::sync::Arc;

use tracing::info;

use crate::config::{validate_config, ConfigError, PipelineConfig};
use crate::middleware::{
    HeadersInspectionHandler, ParametersNameDecodingHandler, RedirectHandler, RetryHandler,
    UrlReplaceHandler, UserAgentHandler,
};
use crate::net::Transport;
use crate::pipeline::{Handler, Pipeline};

/// Step-by-step pipeline assembly.
#[derive(Default)]
pub struct PipelineBuilder {
    handlers: Vec<Arc<dyn Handler>>,
    transport: Option<Arc<dyn Transport>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler; handlers run in the order they are added.
    pub fn handler(mut self, handler: impl Handler + 'static) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    /// Install the default chain built from `config`.
    pub fn default_handlers(mut self, config: &PipelineConfig) -> Self {
        self.handlers.extend(default_handlers(config));
        self
    }

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn build(self) -> Result<Pipeline, ConfigError> {
        let transport = self.transport.ok_or(ConfigError::MissingTransport)?;
        Ok(Pipeline::from_parts(self.handlers, transport))
    }
}

/// The default chain, outermost first.
pub fn default_handlers(config: &PipelineConfig) -> Vec<Arc<dyn Handler>> {
    vec![
        Arc::new(RedirectHandler::new(config.redirect.clone())),
        Arc::new(RetryHandler::new(config.retry.clone())),
        Arc::new(ParametersNameDecodingHandler::new(config.parameters_decoding.clone())),
        Arc::new(UrlReplaceHandler::new(config.url_replace.clone())),
        Arc::new(UserAgentHandler::new(config.user_agent.clone())),
        Arc::new(HeadersInspectionHandler::new(config.headers_inspection.clone())),
    ]
}

impl Pipeline {
    /// Validate `config` and build the default chain over `transport`.
    pub fn from_config(
        config: &PipelineConfig,
        transport: impl Transport + 'static,
    ) -> Result<Self, ConfigError> {
        validate_config(config).map_err(ConfigError::Validation)?;

        let pipeline = PipelineBuilder::new()
            .default_handlers(config)
            .transport(transport)
            .build()?;
        info!(handlers = ?pipeline.handler_names(), "Pipeline built");
        Ok(pipeline)
    }
}
