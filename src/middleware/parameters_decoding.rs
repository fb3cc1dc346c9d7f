//! Query parameter name decoding.
//!
//! Some callers percent-encode characters such as `$`, `-`, `~` and `.` that
//! the service expects literally in query parameter *names*
//! (`?%24select=id` instead of `?$select=id`). This handler decodes exactly
//! those triplets in names and leaves values alone.

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::http::{HandlerOption, Request, Response};
use crate::pipeline::{Handler, Next};

/// Parameter name decoding policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ParametersNameDecodingOptions {
    pub enabled: bool,
    pub characters_to_decode: Vec<char>,
}

impl Default for ParametersNameDecodingOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            characters_to_decode: vec!['.', '-', '~', '$'],
        }
    }
}

impl HandlerOption for ParametersNameDecodingOptions {
    const KEY: &'static str = "ParametersNameDecodingHandlerOption";
}

/// Decodes selected characters in query parameter names.
#[derive(Debug, Clone, Default)]
pub struct ParametersNameDecodingHandler {
    options: ParametersNameDecodingOptions,
}

impl ParametersNameDecodingHandler {
    pub fn new(options: ParametersNameDecodingOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParametersNameDecodingOptions {
        &self.options
    }
}

impl Handler for ParametersNameDecodingHandler {
    fn name(&self) -> &'static str {
        "ParametersNameDecodingHandler"
    }

    fn send<'a>(&'a self, mut request: Request, next: Next<'a>) -> BoxFuture<'a, Result<Response>> {
        let options = request.options().resolve(&self.options);
        if options.enabled && !options.characters_to_decode.is_empty() {
            let decoded = request
                .url()
                .query()
                .filter(|query| query.contains('%'))
                .map(|query| decode_query_names(query, &options.characters_to_decode));
            if let Some(query) = decoded {
                tracing::trace!(request_id = %request.id(), query = %query, "Decoded parameter names");
                request.url_mut().set_query(Some(&query));
            }
        }
        next.run(request)
    }
}

/// Decode `characters` in the name part of every `name=value` pair of `query`.
pub fn decode_query_names(query: &str, characters: &[char]) -> String {
    query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) => format!("{}={}", decode_name(name, characters), value),
            None => decode_name(pair, characters),
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn decode_name(name: &str, characters: &[char]) -> String {
    let bytes = name.as_bytes();
    let mut out = String::with_capacity(name.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let Some(decoded) = hex_pair(bytes[i + 1], bytes[i + 2]).map(char::from) {
                if characters.contains(&decoded) {
                    out.push(decoded);
                    i += 3;
                    continue;
                }
            }
        }
        let ch = name[i..].chars().next().unwrap_or_default();
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

fn hex_pair(high: u8, low: u8) -> Option<u8> {
    let high = (high as char).to_digit(16)?;
    let low = (low as char).to_digit(16)?;
    Some((high * 16 + low) as u8)
}
