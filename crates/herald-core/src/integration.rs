//! Contracts Herald consumes from its host environment.
//!
//! | Trait | Provided by | Used for |
//! |---|---|---|
//! | [`ContextResolver`] | dependency-injection tracker | wiring a component before it is announced |
//! | [`ActivationMonitor`] | activation subsystem | readiness gating |
//! | [`PluginRegistry`] | host plugin system | plugin type and plugin registration |
//! | [`PropertySource`] | tracker | best-effort metadata lookup |
//! | [`PlatformBootstrap`] / [`ContainerBoot`] | host platform | one-time startup |
//!
//! None of these are implemented here; `herald-framework` ships in-process
//! implementations for the ones Herald owns.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Notify;

use crate::component::{BoxedComponent, Component, ComponentType};
use crate::error::{BoxError, PropertyResult, RegistryResult, ResolveResult};

// =============================================================================
// Dependency injection
// =============================================================================

/// A dependency-injection factory able to wire one component.
pub trait BeanFactory: Send + Sync {
    /// Reads a named property of `instance`'s bean definition.
    ///
    /// Returns `Ok(None)` when the property is not defined.
    fn bean_property(&self, instance: &dyn Component, name: &str) -> Result<Option<Value>, BoxError>;
}

/// Shared factory handle.
pub type BoxedFactory = Arc<dyn BeanFactory>;

/// Resolves the dependency-injection factory of a component.
#[async_trait]
pub trait ContextResolver: Send + Sync {
    /// Attempts to find or create the factory for `instance`.
    ///
    /// `Ok(None)` means "not available yet" and is retried by the caller.
    async fn resolve(&self, instance: &BoxedComponent) -> ResolveResult<Option<BoxedFactory>>;

    /// Whether the proxy unwrapper needed to hand out wired components is up.
    fn unwrapper_available(&self) -> bool;
}

// =============================================================================
// Activation subsystem
// =============================================================================

/// Readiness signal of the activation subsystem.
///
/// Implementations must call [`Notify::notify_waiters`] on the wait handle
/// whenever [`should_wait`](ActivationMonitor::should_wait) may have changed.
pub trait ActivationMonitor: Send + Sync {
    /// `true` while the subsystem is in a transitional state.
    fn should_wait(&self) -> bool;

    /// Handle that is notified on every state transition.
    fn wait_handle(&self) -> &Notify;
}

// =============================================================================
// Host plugin registry
// =============================================================================

/// Descriptor of a plugin type known to the host.
pub trait PluginTypeDescriptor: Send + Sync {
    /// Registry identifier of the plugin type.
    fn id(&self) -> &str;

    /// Human-readable name.
    fn name(&self) -> &str;

    /// Component type tracked for this plugin type.
    fn component_type(&self) -> ComponentType;
}

/// The host's plugin registry.
pub trait PluginRegistry: Send + Sync {
    /// Installs a plugin type contributed by an extension.
    fn register_extension_type(&self, descriptor: Arc<dyn PluginTypeDescriptor>);

    /// Registers a plugin instance under `plugin_type`.
    fn register_plugin(&self, plugin_type: &str, instance: &BoxedComponent) -> RegistryResult<()>;

    /// Removes a plugin instance from `plugin_type`.
    fn remove_plugin(&self, plugin_type: &str, instance: &BoxedComponent) -> RegistryResult<()>;
}

/// Reads named properties of tracked components.
#[async_trait]
pub trait PropertySource: Send + Sync {
    /// Reads `name` for `instance` of `plugin_type`.
    async fn get_property(
        &self,
        plugin_type: ComponentType,
        instance: &BoxedComponent,
        name: &str,
    ) -> PropertyResult<Option<Value>>;
}

// =============================================================================
// Bootstrap
// =============================================================================

/// Application context handed to the platform during bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationContext {
    /// Root of the installed solution.
    pub solution_root: PathBuf,
    /// Base path used to resolve relative resources.
    pub base_path: PathBuf,
}

impl ApplicationContext {
    /// Creates a standalone context rooted at `dir` for both paths.
    pub fn standalone(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            solution_root: dir.clone(),
            base_path: dir,
        }
    }
}

/// The host platform's one-time initialization.
///
/// [`init`](Self::init) may block; it runs on the blocking thread pool.
pub trait PlatformBootstrap: Send + Sync {
    /// Whether the platform is already fully initialized.
    fn is_initialized(&self) -> bool;

    /// Initializes the platform with `context`.
    fn init(&self, context: &ApplicationContext) -> Result<(), BoxError>;
}

/// Starts the component container.
///
/// [`startup`](Self::startup) may block until the container is up; it runs
/// on the blocking thread pool.
pub trait ContainerBoot: Send + Sync {
    /// Starts the container with optional arguments.
    fn startup(&self, args: Option<&[String]>) -> Result<(), BoxError>;
}
