//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (read & deserialize)
//!     → CLI overrides (host, port, front end)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → pot registry seeded, listener bound
//! ```
//!
//! # Design Decisions
//! - Config is read once at start-up; there is no reload
//! - All fields have defaults, so an empty file is a valid config
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    Frontend, LimitsConfig, ListenerConfig, LogFormat, ObservabilityConfig, PotConfig,
    ServerConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
