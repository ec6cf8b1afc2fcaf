//! Component identities and type-erased component instances.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

// =============================================================================
// Component
// =============================================================================

/// A live component instance observed by the activation subsystem.
///
/// Components are shared as [`BoxedComponent`] between the tracker, every
/// notifier spawned for them and the listeners that finally receive them.
/// Listeners that need the concrete type use [`as_any`](Component::as_any)
/// and downcast.
pub trait Component: Any + Send + Sync {
    /// Stable identifier used in logs.
    fn id(&self) -> &str;

    /// Returns `self` as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// Shared, type-erased component instance.
pub type BoxedComponent = Arc<dyn Component>;

/// The generic plugin capability.
///
/// Listeners keyed by this type are installed late during host startup, so a
/// notifier that finds no listener for it keeps retrying instead of treating
/// the occurrence as uninteresting.
pub trait PluginInterface: Component {}

// =============================================================================
// ComponentType
// =============================================================================

/// Identity of a tracked component type.
///
/// Backed by a [`TypeId`], so equality and hashing ignore the display name.
/// Use `dyn Trait` for capability types:
///
/// ```rust
/// use herald_core::{ComponentType, PluginInterface};
///
/// let ty = ComponentType::of::<dyn PluginInterface>();
/// assert!(ty.accepts_plugin_interface());
/// assert_eq!(ty, ComponentType::plugin_interface());
/// ```
#[derive(Clone, Copy)]
pub struct ComponentType {
    name: &'static str,
    type_id: TypeId,
}

impl ComponentType {
    /// Identity of `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }

    /// Identity of the generic [`PluginInterface`] capability.
    pub fn plugin_interface() -> Self {
        Self::of::<dyn PluginInterface>()
    }

    /// Fully qualified type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Underlying [`TypeId`].
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Whether a [`PluginInterface`] component can be treated as this type.
    ///
    /// There is no subtyping between Rust types, so only the plugin
    /// interface itself qualifies.
    pub fn accepts_plugin_interface(&self) -> bool {
        self.type_id == TypeId::of::<dyn PluginInterface>()
    }
}

impl PartialEq for ComponentType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ComponentType {}

impl Hash for ComponentType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComponentType").field(&self.name).finish()
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
