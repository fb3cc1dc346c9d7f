//! `Retry-After` header parsing.
//!
//! The header is either a number of seconds (`Retry-After: 120`) or an
//! HTTP-date (`Retry-After: Wed, 21 Oct 2015 07:28:00 GMT`). The obsolete
//! RFC 850 and asctime date forms are accepted as well. Dates in the past
//! clamp to zero.

use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use http::header::RETRY_AFTER;
use http::HeaderMap;

/// Delay requested by the server, `None` if the header is absent or unparsable.
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    let delay = parse_retry_after(value, Utc::now());
    if delay.is_none() {
        tracing::debug!(value, "Ignoring unparsable Retry-After");
    }
    delay
}

/// Parse a `Retry-After` value relative to `now`.
pub fn parse_retry_after(value: &str, now: DateTime<Utc>) -> Option<Duration> {
    if let Ok(seconds) = value.parse::<i64>() {
        return Some(Duration::from_secs(seconds.max(0) as u64));
    }

    let date = parse_http_date(value)?;
    Some((date - now).to_std().unwrap_or(Duration::ZERO))
}

/// IMF-fixdate, then RFC 850, then asctime.
fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDateTime::parse_from_str(value, "%A, %d-%b-%y %H:%M:%S GMT") {
        return Some(date.and_utc());
    }
    // asctime pads single-digit days with a space
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    NaiveDateTime::parse_from_str(&collapsed, "%a %b %d %H:%M:%S %Y")
        .ok()
        .map(|date| date.and_utc())
}
