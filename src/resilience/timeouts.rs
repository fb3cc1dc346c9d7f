//! Per-call deadline enforcement.
//!
//! # Responsibilities
//! - Check the caller's deadline before every retry/redirect iteration
//! - Refuse a back-off sleep that would outlive the deadline
//!
//! # Design Decisions
//! - Uses Tokio's non-blocking sleep so other in-flight calls keep running
//! - Deadline errors are distinct from transport errors
//! - A handler-local retry timeout is a ceiling on back-off, not a substitute
//!   for the caller's deadline

use std::time::{Duration, Instant};

use crate::error::{PipelineError, Result};

/// Fail with [`PipelineError::DeadlineExceeded`] if `deadline` has passed.
pub fn check_deadline(deadline: Option<Instant>) -> Result<()> {
    match deadline {
        Some(deadline) if Instant::now() >= deadline => Err(PipelineError::DeadlineExceeded),
        _ => Ok(()),
    }
}

/// Sleep for `delay` unless doing so would run past `deadline`.
pub async fn sleep_within(delay: Duration, deadline: Option<Instant>) -> Result<()> {
    if let Some(deadline) = deadline {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if delay >= remaining {
            return Err(PipelineError::DeadlineExceeded);
        }
    }
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    Ok(())
}
