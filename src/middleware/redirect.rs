//! Redirect following.
//!
//! # Responsibilities
//! - Recognise redirect responses and extract the `Location`
//! - Rebuild the request for the next hop (method, URL, headers, body)
//! - Cap the number of hops and report the chain on the final response
//!
//! # Design Decisions
//! - Method rewriting follows long-standing client/browser convention:
//!   303 and 302 become GET (except HEAD), a POST answered by 301 becomes GET
//! - `Cookie` never crosses a redirect; `Authorization` only stays on the same
//!   origin or on a plain HTTP→HTTPS upgrade of the same host
//! - A hop that must keep a streaming body is not followed
//! - History lives on the call frame, never on the handler

use std::collections::BTreeSet;

use futures_util::future::BoxFuture;
use http::header::{AUTHORIZATION, CONTENT_LENGTH, COOKIE, HOST, LOCATION, TRANSFER_ENCODING};
use http::{HeaderValue, Method, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{PipelineError, Result};
use crate::http::{Body, HandlerOption, Request, RequestHead, Response};
use crate::observability::metrics;
use crate::pipeline::{Handler, Next};
use crate::resilience::timeouts::check_deadline;

/// Upper bound accepted for `max_redirects`.
pub const MAX_MAX_REDIRECTS: u32 = 20;

/// Redirect policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RedirectOptions {
    /// Follow redirects at all.
    pub should_redirect: bool,

    /// Number of hops followed before giving up.
    pub max_redirects: u32,

    /// Statuses treated as redirects.
    pub redirect_on_status_codes: BTreeSet<u16>,
}

impl Default for RedirectOptions {
    fn default() -> Self {
        Self {
            should_redirect: true,
            max_redirects: 5,
            redirect_on_status_codes: [301, 302, 303, 307, 308].into_iter().collect(),
        }
    }
}

impl HandlerOption for RedirectOptions {
    const KEY: &'static str = "RedirectHandlerOption";
}

impl RedirectOptions {
    /// Target of a redirect response, `None` when `response` is not one to follow.
    ///
    /// 301 and 302 are only followed for GET and HEAD. Non-UTF-8 bytes in
    /// `Location` are replaced rather than treated as a missing header.
    pub fn redirect_location(&self, method: &Method, response: &Response) -> Option<String> {
        let status = response.status().as_u16();
        if !self.redirect_on_status_codes.contains(&status) {
            return None;
        }
        if matches!(status, 301 | 302) && !matches!(*method, Method::GET | Method::HEAD) {
            return None;
        }
        response
            .headers()
            .get(LOCATION)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
    }
}

/// Follows HTTP redirects.
#[derive(Debug, Clone, Default)]
pub struct RedirectHandler {
    options: RedirectOptions,
}

impl RedirectHandler {
    pub fn new(options: RedirectOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RedirectOptions {
        &self.options
    }

    async fn send_with_redirects(&self, request: Request, next: Next<'_>) -> Result<Response> {
        let options = request.options().resolve(&self.options);
        if !options.should_redirect {
            return next.run(request).await;
        }

        let mut request = request;
        let mut history: Vec<RequestHead> = Vec::new();
        let mut remaining = options.max_redirects;

        loop {
            check_deadline(request.deadline())?;

            let head = request.head();
            let call_options = request.options().clone();
            let deadline = request.deadline();
            let replay = request.body().try_clone();

            let mut response = next.run(request).await?;

            let Some(location) = options.redirect_location(&head.method, &response) else {
                response.set_history(history);
                return Ok(response);
            };

            if remaining == 0 {
                tracing::warn!(
                    request_id = %head.id,
                    max_redirects = options.max_redirects,
                    location = %location,
                    "Too many redirects"
                );
                return Err(PipelineError::TooManyRedirects {
                    max_redirects: options.max_redirects,
                    history,
                });
            }

            let status = response.status();
            let url = redirect_url(&head.url, &location)?;
            let method = redirect_method(&head.method, status);
            let keeps_body = method == head.method || method != Method::GET;

            let body = if keeps_body {
                match replay {
                    Some(body) => body,
                    None => {
                        tracing::warn!(
                            request_id = %head.id,
                            status = %status,
                            "Redirect would resend a streaming body, not following"
                        );
                        response.set_history(history);
                        return Ok(response);
                    }
                }
            } else {
                Body::Empty
            };

            tracing::debug!(
                request_id = %head.id,
                status = %status,
                from = %head.url,
                to = %url,
                method = %method,
                "Following redirect"
            );
            metrics::record_redirect(status.as_u16());

            remaining -= 1;
            let headers = redirect_headers(&head, &url, &method);
            history.push(head.clone());

            let next_head = RequestHead {
                id: head.id,
                method,
                url,
                headers,
            };
            request = Request::from_parts(next_head, body, call_options, deadline);
        }
    }
}

impl Handler for RedirectHandler {
    fn name(&self) -> &'static str {
        "RedirectHandler"
    }

    fn send<'a>(&'a self, request: Request, next: Next<'a>) -> BoxFuture<'a, Result<Response>> {
        Box::pin(self.send_with_redirects(request, next))
    }
}

/// Method for the next hop.
///
/// `RedirectHandler` never follows 301 or 302 for methods other than GET and
/// HEAD, so the POST rewrites below only matter to direct callers.
pub fn redirect_method(method: &Method, status: StatusCode) -> Method {
    match status.as_u16() {
        303 | 302 if *method != Method::HEAD => Method::GET,
        301 if *method == Method::POST => Method::GET,
        _ => method.clone(),
    }
}

/// Resolve a `Location` header against the URL that was redirected.
pub fn redirect_url(original: &Url, location: &str) -> Result<Url> {
    let invalid = |source| PipelineError::InvalidRedirectLocation {
        location: location.to_string(),
        source,
    };

    let mut url = match Url::parse(location) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => original.join(location).map_err(invalid)?,
        Err(url::ParseError::EmptyHost) => inherit_host(original, location).map_err(invalid)?,
        Err(e) => return Err(invalid(e)),
    };

    if original.fragment().is_some() && url.fragment().is_none() {
        url.set_fragment(original.fragment());
    }
    Ok(url)
}

/// Absolute-form `Location` with no host: keep its scheme, borrow the original authority.
fn inherit_host(original: &Url, location: &str) -> std::result::Result<Url, url::ParseError> {
    let (scheme, rest) = location
        .split_once(':')
        .ok_or(url::ParseError::EmptyHost)?;
    let host = original.host_str().ok_or(url::ParseError::EmptyHost)?;
    let authority = match original.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };
    let rest = rest.trim_start_matches('/');
    Url::parse(&format!("{scheme}://{authority}/{rest}"))
}

/// Headers for the next hop.
pub fn redirect_headers(previous: &RequestHead, url: &Url, method: &Method) -> http::HeaderMap {
    let mut headers = previous.headers.clone();

    if !same_origin(url, &previous.url) {
        if !is_https_redirect(&previous.url, url) {
            headers.remove(AUTHORIZATION);
        }
    }

    // A caller-supplied Host must track the port of a same-origin hop too.
    let host = authority(url);
    let stale = headers
        .get(HOST)
        .is_some_and(|value| value.as_bytes() != host.as_bytes());
    if !same_origin(url, &previous.url) || stale {
        if let Ok(value) = HeaderValue::from_str(&host) {
            headers.insert(HOST, value);
        }
    }

    if *method != previous.method && *method == Method::GET {
        headers.remove(CONTENT_LENGTH);
        headers.remove(TRANSFER_ENCODING);
    }

    headers.remove(COOKIE);
    headers
}

/// Scheme and host match; port is ignored.
pub fn same_origin(url: &Url, other: &Url) -> bool {
    url.scheme() == other.scheme() && hosts_match(url, other)
}

/// Scheme, host and effective port all match.
pub fn same_origin_strict(url: &Url, other: &Url) -> bool {
    same_origin(url, other) && port_or_default(url) == port_or_default(other)
}

/// Explicit port, or the scheme's well-known one.
pub fn port_or_default(url: &Url) -> Option<u16> {
    url.port_or_known_default()
}

/// `location` is an HTTP→HTTPS upgrade of `url` on the same host.
pub fn is_https_redirect(url: &Url, location: &Url) -> bool {
    hosts_match(url, location) && url.scheme() == "http" && location.scheme() == "https"
}

fn hosts_match(a: &Url, b: &Url) -> bool {
    match (a.host_str(), b.host_str()) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        (None, None) => true,
        _ => false,
    }
}

fn authority(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}
