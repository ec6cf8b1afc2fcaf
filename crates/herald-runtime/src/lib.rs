//! Herald Runtime - host integration layer.
//!
//! This crate provides:
//! - The registry extension the host plugin system calls into (`RegistryExtension`)
//! - One-time platform bootstrap guarded against concurrent initialization
//! - Figment-based configuration (`HeraldConfig`, `ConfigLoader`)
//! - Logging configuration (`LoggingBuilder`)
//!
//! # Example
//!
//! ```ignore
//! use herald_runtime::prelude::*;
//!
//! let extension = RegistryExtension::builder(platform, container, resolver, monitor)
//!     .config_loader(ConfigLoader::new().with_current_dir())
//!     .with_logging()
//!     .build()?;
//!
//! extension.init(registry).await?;
//! ```

pub mod config;
pub mod error;
pub mod extension;
pub mod logging;

pub use config::{
    ConfigError, ConfigLoader, ConfigResult, HeraldConfig, LoggingConfig, validate_config,
};
pub use error::{BootstrapError, RuntimeError, RuntimeResult};
pub use extension::{
    EXTENSION_PLUGIN_TYPE_ID, EXTENSION_PLUGIN_TYPE_NAME, ExtensionBuilder, ExtensionPluginType,
    PLUGIN_ID_PROPERTY, PluginRegistryExtension, RegistryExtension,
};
pub use logging::{LoggingBuilder, SpanEvents};

// Re-export tracing for use by hosts
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{ConfigLoader, HeraldConfig};
    pub use crate::extension::{PluginRegistryExtension, RegistryExtension};
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
