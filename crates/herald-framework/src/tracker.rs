//! In-process plugin tracker.
//!
//! [`PluginTracker`] is the hub between the activation subsystem and the
//! notifiers. It owns:
//!
//! - the set of component types the host asked to track,
//! - the shared [`ListenerRegistry`],
//! - the [`ContextResolver`] used to wire components,
//! - the [`NotifierScheduler`] every occurrence runs on.
//!
//! The activation subsystem reports changes through
//! [`service_changed`](PluginTracker::service_changed); each call for a
//! tracked type becomes one scheduled [`DelayedServiceNotifier`].

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, info, trace};

use herald_core::{
    BoxedComponent, ComponentType, ContextResolver, LifecycleEvent, LifecycleOccurrence,
    PropertyError, PropertyResult, PropertySource,
};

use crate::listener::{BoxedListener, ListenerRegistry};
use crate::notifier::{DelayedServiceNotifier, NotifierHandle};
use crate::scheduler::NotifierScheduler;

/// Tracks component types and turns their lifecycle changes into notifiers.
pub struct PluginTracker {
    tracked: RwLock<HashSet<ComponentType>>,
    listeners: Arc<ListenerRegistry>,
    resolver: Arc<dyn ContextResolver>,
    scheduler: Arc<NotifierScheduler>,
}

impl PluginTracker {
    /// Creates a tracker with an empty listener registry.
    pub fn new(resolver: Arc<dyn ContextResolver>, scheduler: Arc<NotifierScheduler>) -> Self {
        Self::with_listeners(resolver, scheduler, Arc::new(ListenerRegistry::new()))
    }

    /// Creates a tracker sharing an existing listener registry.
    pub fn with_listeners(
        resolver: Arc<dyn ContextResolver>,
        scheduler: Arc<NotifierScheduler>,
        listeners: Arc<ListenerRegistry>,
    ) -> Self {
        Self {
            tracked: RwLock::new(HashSet::new()),
            listeners,
            resolver,
            scheduler,
        }
    }

    // ─── Tracking ────────────────────────────────────────────────────────────

    /// Starts tracking `component_type`. Returns `false` if already tracked.
    pub fn register_plugin_class(&self, component_type: ComponentType) -> bool {
        let added = self.tracked.write().insert(component_type);
        if added {
            info!(component_type = %component_type, "Tracking component type");
        }
        added
    }

    /// Whether `component_type` is tracked.
    pub fn is_tracked(&self, component_type: ComponentType) -> bool {
        self.tracked.read().contains(&component_type)
    }

    /// All tracked component types, in no particular order.
    pub fn tracked_types(&self) -> Vec<ComponentType> {
        self.tracked.read().iter().copied().collect()
    }

    // ─── Listeners ───────────────────────────────────────────────────────────

    /// Installs the listener for `component_type`, replacing any previous one.
    pub fn add_lifecycle_listener(
        &self,
        component_type: ComponentType,
        listener: BoxedListener,
    ) -> Option<BoxedListener> {
        self.listeners.insert(component_type, listener)
    }

    /// Removes the listener for `component_type`.
    pub fn remove_lifecycle_listener(&self, component_type: ComponentType) -> Option<BoxedListener> {
        self.listeners.remove(component_type)
    }

    /// The shared listener registry.
    pub fn listeners(&self) -> &Arc<ListenerRegistry> {
        &self.listeners
    }

    /// The scheduler occurrences run on.
    pub fn scheduler(&self) -> &Arc<NotifierScheduler> {
        &self.scheduler
    }

    // ─── Occurrences ─────────────────────────────────────────────────────────

    /// Reports a lifecycle change of `instance`.
    ///
    /// Returns the completion handle of the scheduled notifier, or `None`
    /// when `component_type` is not tracked.
    pub fn service_changed(
        &self,
        component_type: ComponentType,
        kind: LifecycleEvent,
        instance: BoxedComponent,
    ) -> Option<NotifierHandle> {
        if !self.is_tracked(component_type) {
            trace!(
                component_type = %component_type,
                component = %instance.id(),
                "Ignoring change of untracked component type"
            );
            return None;
        }

        debug!(
            component_type = %component_type,
            component = %instance.id(),
            kind = %kind,
            "Scheduling lifecycle notification"
        );
        let occurrence = LifecycleOccurrence::new(component_type, kind, instance);
        let notifier = DelayedServiceNotifier::new(
            occurrence,
            Arc::clone(&self.listeners),
            Arc::clone(&self.resolver),
        );
        Some(self.scheduler.schedule(notifier))
    }

    // ─── Properties ──────────────────────────────────────────────────────────

    /// Reads `name` from `instance`'s bean definition.
    pub async fn bean_plugin_property(
        &self,
        plugin_type: ComponentType,
        instance: &BoxedComponent,
        name: &str,
    ) -> PropertyResult<Option<Value>> {
        trace!(
            plugin_type = %plugin_type,
            component = %instance.id(),
            property = name,
            "Reading bean property"
        );
        let factory = self
            .resolver
            .resolve(instance)
            .await?
            .ok_or_else(|| PropertyError::NoFactory(instance.id().to_string()))?;

        factory
            .bean_property(instance.as_ref(), name)
            .map_err(|source| PropertyError::Lookup {
                name: name.to_string(),
                source,
            })
    }
}

#[async_trait]
impl PropertySource for PluginTracker {
    async fn get_property(
        &self,
        plugin_type: ComponentType,
        instance: &BoxedComponent,
        name: &str,
    ) -> PropertyResult<Option<Value>> {
        self.bean_plugin_property(plugin_type, instance, name).await
    }
}
