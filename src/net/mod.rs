//! Network transport subsystem.
//!
//! # Data Flow
//! ```text
//! last pipeline link
//!     → transport.rs (Transport contract)
//!     → client.rs (reqwest client: pooling, TLS, HTTP/1.1 + HTTP/2)
//!     → remote server
//! ```
//!
//! # Design Decisions
//! - The pipeline only depends on the `Transport` trait; tests plug in
//!   scripted transports
//! - Transport failures are surfaced as-is and never retried

pub mod client;
pub mod transport;

pub use client::ReqwestTransport;
pub use transport::Transport;
