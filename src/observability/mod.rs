//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Transport and handlers produce:
//!     → logging.rs (structured log events, request ID on every event)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Prometheus snapshot (CLI)
//! ```

pub mod logging;
pub mod metrics;
