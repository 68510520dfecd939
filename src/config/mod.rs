//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! caller overrides (SassOptions, or the [sass] table of a TOML file)
//!     → loader.rs (parse & deserialize, dev server only)
//!     → SassConfig::resolve (merge over defaults, absolutize locations)
//!     → SassConfig (immutable, shared via Arc by every request)
//! ```
//!
//! # Design Decisions
//! - Overrides are read by reference; the caller's value is never rewritten
//! - Relative locations are resolved against the working directory once
//! - All fields have defaults to allow minimal configs

pub mod loader;
pub mod schema;

pub use loader::{load_config, ConfigError};
pub use schema::{
    Check, ListenerConfig, ObservabilityConfig, SassConfig, SassOptions, ServerConfig, Syntax,
    TimeoutConfig, ENVIRONMENT_VAR,
};
