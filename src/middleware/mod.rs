//! Concrete pipeline handlers.
//!
//! # Data Flow
//! ```text
//! Default chain (outbound, top to bottom; responses travel back up):
//!     → redirect.rs (follow 3xx, cap hops, sanitize headers)
//!     → retry.rs (resend on 429/503/504 with backoff)
//!     → parameters_decoding.rs (un-escape `$ - ~ .` in query names)
//!     → url_replace.rs (literal URL substitutions)
//!     → user_agent.rs (append product token)
//!     → headers_inspection.rs (capture final outbound/inbound headers)
//!     → transport
//! ```
//!
//! # Design Decisions
//! - Every handler owns an immutable default options value and honours a
//!   per-request override of the same type
//! - Redirect sits above retry so every hop gets its own retry budget

pub mod headers_inspection;
pub mod parameters_decoding;
pub mod redirect;
pub mod retry;
pub mod url_replace;
pub mod user_agent;

pub use headers_inspection::{HeadersInspectionHandler, HeadersInspectionOptions, InspectedHeaders};
pub use parameters_decoding::{ParametersNameDecodingHandler, ParametersNameDecodingOptions};
pub use redirect::{RedirectHandler, RedirectOptions};
pub use retry::{RetryHandler, RetryOptions};
pub use url_replace::{ReplacementPair, UrlReplaceHandler, UrlReplaceOptions};
pub use user_agent::{UserAgentHandler, UserAgentOptions};
