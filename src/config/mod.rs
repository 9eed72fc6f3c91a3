//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → applied to the engine and transport at startup
//! ```
//!
//! # Design Decisions
//! - Config is read once; there is no hot reload because the routing table
//!   is frozen when serving starts
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    LimitsConfig, ListenerConfig, ObservabilityConfig, RoutingConfig, ServerConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
