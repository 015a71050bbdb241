//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + CLI overrides
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → handed to GatewayServer::new at startup
//! ```
//!
//! # Design Decisions
//! - Config is read once; the upstream never changes at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, read_config, ConfigError};
pub use schema::{
    CorsConfig, GatewayConfig, LimitsConfig, ListenerConfig, ObservabilityConfig, RoutingConfig,
    TimeoutConfig, TrustMode, UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
