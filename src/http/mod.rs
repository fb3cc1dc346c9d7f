//! HTTP exchange types.
//!
//! # Data Flow
//! ```text
//! caller builds Request (+ RequestOptions, deadline)
//!     → request.rs (method, URL, headers, replayable or streaming body)
//!     → [pipeline handlers mutate it in place]
//!     → transport
//!     → response.rs (status, headers, body, back-reference, history)
//!     → caller
//! ```

pub mod options;
pub mod request;
pub mod response;

pub use options::{HandlerOption, RequestOptions};
pub use request::{Body, BodyStream, Request, RequestHead};
pub use response::Response;
