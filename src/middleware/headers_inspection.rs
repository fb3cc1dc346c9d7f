//! Header inspection for diagnostics.
//!
//! Captures the outbound headers as this handler forwards them and the
//! inbound headers as they come back, without altering either. The capture is
//! attached to the response extensions as [`InspectedHeaders`].

use futures_util::future::BoxFuture;
use http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::http::{HandlerOption, Request, Response};
use crate::pipeline::{Handler, Next};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HeadersInspectionOptions {
    pub inspect_request_headers: bool,
    pub inspect_response_headers: bool,
}

impl Default for HeadersInspectionOptions {
    fn default() -> Self {
        Self {
            inspect_request_headers: true,
            inspect_response_headers: true,
        }
    }
}

impl HandlerOption for HeadersInspectionOptions {
    const KEY: &'static str = "HeadersInspectionHandlerOption";
}

/// Headers captured for one call.
#[derive(Debug, Clone, Default)]
pub struct InspectedHeaders {
    pub request: HeaderMap,
    pub response: HeaderMap,
}

#[derive(Debug, Clone, Default)]
pub struct HeadersInspectionHandler {
    options: HeadersInspectionOptions,
}

impl HeadersInspectionHandler {
    pub fn new(options: HeadersInspectionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &HeadersInspectionOptions {
        &self.options
    }
}

impl Handler for HeadersInspectionHandler {
    fn name(&self) -> &'static str {
        "HeadersInspectionHandler"
    }

    fn send<'a>(&'a self, request: Request, next: Next<'a>) -> BoxFuture<'a, Result<Response>> {
        let options = request.options().resolve(&self.options);
        if !options.inspect_request_headers && !options.inspect_response_headers {
            return next.run(request);
        }

        let request_headers = if options.inspect_request_headers {
            request.headers().clone()
        } else {
            HeaderMap::new()
        };

        Box::pin(async move {
            let mut response = next.run(request).await?;
            let response_headers = if options.inspect_response_headers {
                response.headers().clone()
            } else {
                HeaderMap::new()
            };
            response.extensions_mut().insert(InspectedHeaders {
                request: request_headers,
                response: response_headers,
            });
            Ok(response)
        })
    }
}
