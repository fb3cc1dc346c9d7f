//! URL segment replacement.

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{PipelineError, Result};
use crate::http::{HandlerOption, Request, Response};
use crate::pipeline::{Handler, Next};

/// One literal substitution applied to the request URL.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReplacementPair {
    pub pattern: String,
    pub replacement: String,
}

impl ReplacementPair {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct UrlReplaceOptions {
    pub enabled: bool,
    /// Applied in order, each at most once.
    pub replacement_pairs: Vec<ReplacementPair>,
}

impl Default for UrlReplaceOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            replacement_pairs: Vec::new(),
        }
    }
}

impl HandlerOption for UrlReplaceOptions {
    const KEY: &'static str = "UrlReplaceHandlerOption";
}

impl UrlReplaceOptions {
    /// Apply every pair to `url`, first occurrence only.
    pub fn replace_url_segment(&self, url: &str) -> String {
        if !self.enabled {
            return url.to_string();
        }
        self.replacement_pairs
            .iter()
            .fold(url.to_string(), |acc, pair| {
                acc.replacen(&pair.pattern, &pair.replacement, 1)
            })
    }
}

/// Rewrites parts of the request URL before it is sent.
#[derive(Debug, Clone, Default)]
pub struct UrlReplaceHandler {
    options: UrlReplaceOptions,
}

impl UrlReplaceHandler {
    pub fn new(options: UrlReplaceOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &UrlReplaceOptions {
        &self.options
    }
}

impl Handler for UrlReplaceHandler {
    fn name(&self) -> &'static str {
        "UrlReplaceHandler"
    }

    fn send<'a>(&'a self, mut request: Request, next: Next<'a>) -> BoxFuture<'a, Result<Response>> {
        let options = request.options().resolve(&self.options);
        if options.enabled && !options.replacement_pairs.is_empty() {
            let replaced = options.replace_url_segment(request.url().as_str());
            if replaced != request.url().as_str() {
                match Url::parse(&replaced) {
                    Ok(url) => *request.url_mut() = url,
                    Err(source) => {
                        let err = PipelineError::InvalidUrl {
                            url: replaced,
                            source,
                        };
                        return Box::pin(async move { Err::<Response, _>(err) });
                    }
                }
            }
        }
        next.run(request)
    }
}
