//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (retry and redirect caps, delays, status codes)
//! - Reject method names that are not valid HTTP tokens
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: PipelineConfig → Result<(), Vec<ValidationError>>
//! - Runs before a pipeline is built, so bad config fails at construction time

use http::Method;

use crate::config::schema::PipelineConfig;
use crate::middleware::redirect::MAX_MAX_REDIRECTS;
use crate::middleware::retry::{MAX_DELAY_MS, MAX_MAX_RETRIES};
use crate::middleware::{RedirectOptions, RetryOptions};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("retry.max_retries {0} exceeds the maximum of {MAX_MAX_RETRIES}")]
    TooManyRetries(u32),

    #[error("retry.delay_ms {0} exceeds the maximum of {MAX_DELAY_MS}")]
    DelayTooLong(u64),

    #[error("redirect.max_redirects {0} exceeds the maximum of {MAX_MAX_REDIRECTS}")]
    TooManyRedirects(u32),

    #[error("{field}: {code} is not an HTTP status code")]
    InvalidStatusCode { field: &'static str, code: u16 },

    #[error("retry.allowed_methods: {0:?} is not a valid method")]
    InvalidMethod(String),

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("user_agent.product_name must not be empty")]
    EmptyProductName,
}

/// Validate the whole configuration, collecting every problem.
pub fn validate_config(config: &PipelineConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_retry(&config.retry, &mut errors);
    validate_redirect(&config.redirect, &mut errors);

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }
    if config.user_agent.enabled && config.user_agent.product_name.trim().is_empty() {
        errors.push(ValidationError::EmptyProductName);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub fn validate_retry(options: &RetryOptions, errors: &mut Vec<ValidationError>) {
    if options.max_retries > MAX_MAX_RETRIES {
        errors.push(ValidationError::TooManyRetries(options.max_retries));
    }
    if options.delay_ms > MAX_DELAY_MS {
        errors.push(ValidationError::DelayTooLong(options.delay_ms));
    }
    for method in &options.allowed_methods {
        let valid = Method::from_bytes(method.as_bytes()).is_ok()
            && method.chars().all(|c| c.is_ascii_uppercase());
        if !valid {
            errors.push(ValidationError::InvalidMethod(method.clone()));
        }
    }
    check_status_codes("retry.retry_on_status_codes", &options.retry_on_status_codes, errors);
}

pub fn validate_redirect(options: &RedirectOptions, errors: &mut Vec<ValidationError>) {
    if options.max_redirects > MAX_MAX_REDIRECTS {
        errors.push(ValidationError::TooManyRedirects(options.max_redirects));
    }
    check_status_codes(
        "redirect.redirect_on_status_codes",
        &options.redirect_on_status_codes,
        errors,
    );
}

fn check_status_codes<'a>(
    field: &'static str,
    codes: impl IntoIterator<Item = &'a u16>,
    errors: &mut Vec<ValidationError>,
) {
    for &code in codes {
        if !(100..=599).contains(&code) {
            errors.push(ValidationError::InvalidStatusCode { field, code });
        }
    }
}
