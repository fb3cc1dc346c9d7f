//! User-Agent tagging.

use futures_util::future::BoxFuture;
use http::header::USER_AGENT;
use http::HeaderValue;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::http::{HandlerOption, Request, Response};
use crate::pipeline::{Handler, Next};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct UserAgentOptions {
    pub enabled: bool,
    pub product_name: String,
    pub product_version: String,
}

impl Default for UserAgentOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            product_name: env!("CARGO_PKG_NAME").to_string(),
            product_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl HandlerOption for UserAgentOptions {
    const KEY: &'static str = "UserAgentHandlerOption";
}

impl UserAgentOptions {
    /// `product/version` token.
    pub fn token(&self) -> String {
        format!("{}/{}", self.product_name, self.product_version)
    }
}

/// Appends a `product/version` token to `User-Agent`.
#[derive(Debug, Clone, Default)]
pub struct UserAgentHandler {
    options: UserAgentOptions,
}

impl UserAgentHandler {
    pub fn new(options: UserAgentOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &UserAgentOptions {
        &self.options
    }
}

impl Handler for UserAgentHandler {
    fn name(&self) -> &'static str {
        "UserAgentHandler"
    }

    fn send<'a>(&'a self, mut request: Request, next: Next<'a>) -> BoxFuture<'a, Result<Response>> {
        let options = request.options().resolve(&self.options);
        if options.enabled {
            let token = options.token();
            let current = request
                .headers()
                .get(USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();

            let updated = if current.is_empty() {
                Some(token)
            } else if !current.contains(&token) {
                Some(format!("{current} {token}"))
            } else {
                None
            };

            if let Some(value) = updated.and_then(|v| HeaderValue::from_str(&v).ok()) {
                request.headers_mut().insert(USER_AGENT, value);
            }
        }
        next.run(request)
    }
}
