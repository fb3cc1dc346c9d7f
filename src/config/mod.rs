//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → PipelineConfig (validated, immutable)
//!     → Pipeline::from_config (handler defaults + transport timeouts)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; a pipeline is built from it once
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{ObservabilityConfig, PipelineConfig, TimeoutConfig};
pub use validation::{validate_config, ValidationError};
