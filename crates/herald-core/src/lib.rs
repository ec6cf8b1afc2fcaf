//! # Herald Core
//!
//! Foundation types for the Herald lifecycle notifier.
//!
//! This crate defines the vocabulary shared by every other layer:
//!
//! - **Components**: type identities ([`ComponentType`]) and type-erased
//!   component instances ([`Component`], [`BoxedComponent`])
//! - **Lifecycle**: event kinds ([`LifecycleEvent`]), one-shot occurrences
//!   ([`LifecycleOccurrence`]) and the [`LifecycleListener`] callback contract
//! - **Integration**: the contracts Herald consumes from its host
//!   ([`ContextResolver`], [`ActivationMonitor`], [`PluginRegistry`],
//!   [`PropertySource`], [`PlatformBootstrap`], [`ContainerBoot`])
//! - **Errors**: structured failures for each of those contracts
//!
//! ## Flow
//!
//! ```text
//! ┌────────────┐ occurrence ┌──────────┐  resolve  ┌───────────────────┐
//! │ Activation │───────────▶│ Notifier │──────────▶│ ContextResolver   │
//! │ subsystem  │            │ (retry)  │           └───────────────────┘
//! └────────────┘            │          │  dispatch ┌───────────────────┐
//!                           │          │──────────▶│ LifecycleListener │
//!                           └──────────┘           └───────────────────┘
//! ```
//!
//! The retry machinery itself lives in `herald-framework`; this crate holds
//! only data and traits.

pub mod component;
pub mod error;
pub mod integration;
pub mod lifecycle;

pub use component::{BoxedComponent, Component, ComponentType, PluginInterface};
pub use error::{
    BoxError, ListenerError, PropertyError, PropertyResult, RegistryError, RegistryResult,
    ResolveError, ResolveResult,
};
pub use integration::{
    ActivationMonitor, ApplicationContext, BeanFactory, BoxedFactory, ContainerBoot,
    ContextResolver, PlatformBootstrap, PluginRegistry, PluginTypeDescriptor, PropertySource,
};
pub use lifecycle::{LifecycleEvent, LifecycleListener, LifecycleOccurrence};

/// Prelude for common imports.
pub mod prelude {
    pub use super::component::*;
    pub use super::error::{BoxError, ListenerError, ResolveError};
    pub use super::integration::*;
    pub use super::lifecycle::*;
}
