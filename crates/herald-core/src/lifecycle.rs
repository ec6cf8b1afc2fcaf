//! Lifecycle events, occurrences and the listener contract.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::component::{BoxedComponent, ComponentType};
use crate::error::ListenerError;

/// Kind of change reported for a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleEvent {
    /// The component arrived.
    Added,
    /// The component departed.
    Removed,
    /// The component's registration changed.
    Modified,
}

impl LifecycleEvent {
    /// Returns the event name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Modified => "modified",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One lifecycle event for one component instance.
///
/// Created when the activation subsystem reports a change and handed to
/// exactly one notifier. Never mutated afterwards.
#[derive(Clone)]
pub struct LifecycleOccurrence {
    component_type: ComponentType,
    kind: LifecycleEvent,
    instance: BoxedComponent,
}

impl LifecycleOccurrence {
    /// Creates a new occurrence.
    pub fn new(component_type: ComponentType, kind: LifecycleEvent, instance: BoxedComponent) -> Self {
        Self {
            component_type,
            kind,
            instance,
        }
    }

    /// The tracked type the listener is looked up by.
    pub fn component_type(&self) -> ComponentType {
        self.component_type
    }

    /// The kind of change.
    pub fn kind(&self) -> LifecycleEvent {
        self.kind
    }

    /// The component instance.
    pub fn instance(&self) -> &BoxedComponent {
        &self.instance
    }

    /// Shortcut for `instance().id()`.
    pub fn component_id(&self) -> &str {
        self.instance.id()
    }
}

impl fmt::Debug for LifecycleOccurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleOccurrence")
            .field("component_type", &self.component_type)
            .field("kind", &self.kind)
            .field("component", &self.instance.id())
            .finish()
    }
}

/// Receives lifecycle callbacks for one component type.
///
/// At most one listener is registered per [`ComponentType`]. A callback that
/// fails with [`ListenerError::InvalidContext`] is retried later; any other
/// failure is logged and the occurrence is considered delivered.
#[async_trait]
pub trait LifecycleListener: Send + Sync {
    /// A component of the tracked type arrived.
    async fn added(&self, instance: &BoxedComponent) -> Result<(), ListenerError>;

    /// A component of the tracked type departed.
    async fn removed(&self, instance: &BoxedComponent) -> Result<(), ListenerError>;

    /// A component of the tracked type changed.
    async fn modified(&self, instance: &BoxedComponent) -> Result<(), ListenerError>;
}
