//! # Herald Framework
//!
//! Delivery machinery built on the core contracts.
//!
//! This layer provides:
//! - Readiness gating on the activation subsystem ([`ReadinessGate`], [`ActivationState`])
//! - A registry of one listener per component type ([`ListenerRegistry`])
//! - Retrying delivery of lifecycle occurrences ([`DelayedServiceNotifier`])
//! - A shared task scheduler with exactly-once completion ([`NotifierScheduler`])
//! - Plugin tracking and bean property lookup ([`PluginTracker`])
//! - A listener keeping the host plugin registry in sync ([`RegistryLifecycleListener`])

pub mod listener;
pub mod notifier;
pub mod readiness;
pub mod registry_listener;
pub mod scheduler;
pub mod tracker;

#[cfg(test)]
mod testing;

pub use listener::{BoxedListener, ListenerRegistry};
pub use notifier::{
    Completion, DEFAULT_RETRY_DELAY, DelayedServiceNotifier, NotifierHandle, Outcome, RetryReason,
    Step,
};
pub use readiness::{ActivationPhase, ActivationState, DEFAULT_READINESS_TIMEOUT, ReadinessGate};
pub use registry_listener::RegistryLifecycleListener;
pub use scheduler::{CompletionListener, NotifierScheduler};
pub use tracker::PluginTracker;
