//! Lifecycle listener forwarding occurrences into the host plugin registry.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use herald_core::{
    BoxedComponent, LifecycleListener, ListenerError, PluginRegistry, PluginTypeDescriptor,
};

/// Keeps the host [`PluginRegistry`] in sync with tracked components.
///
/// - `added` registers the component under the plugin type.
/// - `removed` removes it.
/// - `modified` removes and registers it again.
///
/// Registry errors become listener errors; an invalid registry context
/// stays an invalid-context error so the notifier retries it.
pub struct RegistryLifecycleListener {
    registry: Arc<dyn PluginRegistry>,
    plugin_type: Arc<dyn PluginTypeDescriptor>,
}

impl RegistryLifecycleListener {
    /// Creates a listener registering components under `plugin_type`.
    pub fn new(registry: Arc<dyn PluginRegistry>, plugin_type: Arc<dyn PluginTypeDescriptor>) -> Self {
        Self {
            registry,
            plugin_type,
        }
    }

    /// The plugin type components are registered under.
    pub fn plugin_type(&self) -> &Arc<dyn PluginTypeDescriptor> {
        &self.plugin_type
    }
}

impl fmt::Debug for RegistryLifecycleListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryLifecycleListener")
            .field("plugin_type", &self.plugin_type.id())
            .finish()
    }
}

#[async_trait]
impl LifecycleListener for RegistryLifecycleListener {
    async fn added(&self, instance: &BoxedComponent) -> Result<(), ListenerError> {
        debug!(plugin_type = %self.plugin_type.id(), component = %instance.id(), "Registering plugin");
        self.registry
            .register_plugin(self.plugin_type.id(), instance)
            .map_err(ListenerError::from)
    }

    async fn removed(&self, instance: &BoxedComponent) -> Result<(), ListenerError> {
        debug!(plugin_type = %self.plugin_type.id(), component = %instance.id(), "Removing plugin");
        self.registry
            .remove_plugin(self.plugin_type.id(), instance)
            .map_err(ListenerError::from)
    }

    async fn modified(&self, instance: &BoxedComponent) -> Result<(), ListenerError> {
        debug!(plugin_type = %self.plugin_type.id(), component = %instance.id(), "Re-registering plugin");
        let plugin_type = self.plugin_type.id();
        self.registry.remove_plugin(plugin_type, instance)?;
        self.registry.register_plugin(plugin_type, instance)?;
        Ok(())
    }
}
