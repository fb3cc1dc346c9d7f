//! Resilience primitives shared by the retry and redirect handlers.
//!
//! # Data Flow
//! ```text
//! Retryable response:
//!     → retry_after.rs (server hint, seconds or HTTP-date)
//!     → backoff.rs (exponential backoff + jitter when there is no hint)
//!     → timeouts.rs (refuse to sleep past the call deadline)
//! ```
//!
//! # Design Decisions
//! - Sleeps never block the runtime
//! - The call deadline is checked once per loop iteration

pub mod backoff;
pub mod retry_after;
pub mod timeouts;
