//! Configuration module for the Herald runtime.
//!
//! Figment-based loading and validation of bootstrap, readiness, notifier
//! and logging settings.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    BootstrapConfig, HeraldConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, NotifierConfig,
    ReadinessConfig, SpanEventConfig,
};
pub use validation::validate_config;
