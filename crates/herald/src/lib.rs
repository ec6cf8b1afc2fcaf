//! # Herald
//!
//! Delivers lifecycle events of container-managed components to a host
//! plugin registry, retrying until each component's wiring is ready.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐ init / search_for_type ┌───────────────────┐
//! │ Host plugin │───────────────────────▶│ RegistryExtension │
//! │ registry    │                        └─────────┬─────────┘
//! └──────▲──────┘                                  │ tracks types
//!        │ register / remove                       ▼
//!        │                               ┌───────────────────┐
//!        │                               │ PluginTracker     │◀── service_changed
//!        │                               └─────────┬─────────┘
//!        │                                         │ schedule
//!        │                                         ▼
//! ┌──────┴────────────────────┐ dispatch ┌───────────────────┐
//! │ RegistryLifecycleListener │◀─────────│ Notifier (retry)  │
//! └───────────────────────────┘          └───────────────────┘
//! ```
//!
//! - **Core**: component identities, lifecycle events and the host contracts
//! - **Framework**: readiness gating, the retrying notifier and its scheduler
//! - **Runtime**: the host-facing extension, configuration and logging
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use herald::prelude::*;
//!
//! let extension = RegistryExtension::builder(platform, container, resolver, monitor)
//!     .config_loader(ConfigLoader::new().with_current_dir())
//!     .with_logging()
//!     .build()?;
//!
//! extension.init(registry).await?;
//!
//! // The activation subsystem reports changes to the tracker.
//! extension
//!     .tracker()
//!     .service_changed(ComponentType::plugin_interface(), LifecycleEvent::Added, step);
//! ```
//!
//! ## Features
//!
//! - `toml-config`: TOML configuration files (default)
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub use herald_core as core;
pub use herald_framework as framework;
pub use herald_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use herald::prelude::*;
/// ```
pub mod prelude {
    // Host entry point
    pub use herald_runtime::{
        ConfigLoader, HeraldConfig, PluginRegistryExtension, RegistryExtension, RuntimeError,
    };

    // Delivery machinery
    pub use herald_framework::{
        ActivationPhase, ActivationState, Completion, CompletionListener, NotifierHandle,
        Outcome, PluginTracker,
    };

    // Contracts for host implementations
    pub use herald_core::{
        ActivationMonitor, BeanFactory, BoxedComponent, Component, ComponentType, ContainerBoot,
        ContextResolver, LifecycleEvent, LifecycleListener, ListenerError, PlatformBootstrap,
        PluginInterface, PluginRegistry, PluginTypeDescriptor,
    };
}
