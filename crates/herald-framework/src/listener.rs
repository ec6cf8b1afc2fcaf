//! Listener registry: one [`LifecycleListener`] per [`ComponentType`].

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use herald_core::{ComponentType, LifecycleListener};

/// Shared, type-erased listener.
pub type BoxedListener = Arc<dyn LifecycleListener>;

/// Mapping from component type to its lifecycle listener.
///
/// Shared by `Arc` between the tracker and every in-flight notifier. Lookups
/// take a brief read lock and clone the listener handle out, so callbacks
/// never run while the lock is held and concurrent retries never contend on
/// anything but the lock itself.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: RwLock<HashMap<ComponentType, BoxedListener>>,
}

impl ListenerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` for `component_type`, returning the one it replaced.
    pub fn insert(
        &self,
        component_type: ComponentType,
        listener: BoxedListener,
    ) -> Option<BoxedListener> {
        let previous = self.listeners.write().insert(component_type, listener);
        debug!(
            component_type = %component_type,
            replaced = previous.is_some(),
            "Lifecycle listener registered"
        );
        previous
    }

    /// Removes the listener for `component_type`.
    pub fn remove(&self, component_type: ComponentType) -> Option<BoxedListener> {
        let removed = self.listeners.write().remove(&component_type);
        if removed.is_some() {
            debug!(component_type = %component_type, "Lifecycle listener removed");
        }
        removed
    }

    /// Returns the listener for `component_type`, if any.
    pub fn get(&self, component_type: ComponentType) -> Option<BoxedListener> {
        self.listeners.read().get(&component_type).cloned()
    }

    /// Whether a listener is registered for `component_type`.
    pub fn contains(&self, component_type: ComponentType) -> bool {
        self.listeners.read().contains_key(&component_type)
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    /// `true` when no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.read().is_empty()
    }
}
