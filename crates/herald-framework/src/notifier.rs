//! Delayed lifecycle notification.
//!
//! A [`DelayedServiceNotifier`] carries one [`LifecycleOccurrence`] from the
//! moment the activation subsystem reports it until exactly one listener
//! callback has been made, or until the occurrence is conclusively
//! undeliverable. Each [`attempt`](DelayedServiceNotifier::attempt) walks the
//! state machine below once and either finishes or asks to be retried:
//!
//! ```text
//!              ┌──────────── retry after delay ◀─────────────┐
//!              ▼                                             │
//!        ┌───────────┐ factory ready / Removed ┌─────────────┐│
//! start ─▶ Resolving ├────────────────────────▶│ Dispatching ├┘ listener missing (base type)
//!        └─────┬─────┘                         └──────┬──────┘  or invalid context
//!              │ pending ─▶ retry after delay         │
//!              │ resolve error                        │ delivered / no listener / failed
//!              ▼                                      ▼
//!        ┌──────────────────────────────────────────────────┐
//!        │                       Done                       │
//!        └──────────────────────────────────────────────────┘
//! ```
//!
//! [`run`](DelayedServiceNotifier::run) drives attempts on a fixed delay and
//! returns a single [`Completion`]; the [`NotifierScheduler`] turns that
//! return into the one-shot completion signal.
//!
//! [`NotifierScheduler`]: crate::scheduler::NotifierScheduler

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use herald_core::{ContextResolver, LifecycleEvent, LifecycleOccurrence, ResolveError};

use crate::listener::ListenerRegistry;

/// Fixed delay between two attempts for the same occurrence.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(100);

// =============================================================================
// Step / Outcome
// =============================================================================

/// Why an attempt asked to be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryReason {
    /// The resolver has no factory for the component yet.
    FactoryUnavailable,
    /// A factory exists but the proxy unwrapper is not up yet.
    UnwrapperUnavailable,
    /// No listener is registered for the base plugin type yet.
    ListenerMissing,
    /// The listener reported that its context is being rebuilt.
    InvalidContext,
}

impl fmt::Display for RetryReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FactoryUnavailable => "factory unavailable",
            Self::UnwrapperUnavailable => "unwrapper unavailable",
            Self::ListenerMissing => "listener missing",
            Self::InvalidContext => "invalid context",
        })
    }
}

/// Terminal result of an occurrence.
#[derive(Debug)]
pub enum Outcome {
    /// The matching listener callback returned successfully.
    Delivered,
    /// The listener was invoked and failed; the occurrence is not retried.
    ListenerFailed(String),
    /// No listener is interested in the component type.
    NoListener,
    /// Factory resolution failed permanently; no listener was invoked.
    ResolveFailed(ResolveError),
    /// The scheduler shut down before the occurrence finished.
    Cancelled,
}

impl Outcome {
    /// `true` when the occurrence ended without reaching dispatch.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::ResolveFailed(_) | Self::Cancelled)
    }

    /// `true` when a listener callback was made.
    pub fn listener_invoked(&self) -> bool {
        matches!(self, Self::Delivered | Self::ListenerFailed(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delivered => f.write_str("delivered"),
            Self::ListenerFailed(reason) => write!(f, "listener failed: {reason}"),
            Self::NoListener => f.write_str("no listener"),
            Self::ResolveFailed(err) => write!(f, "resolve failed: {err}"),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Result of a single attempt.
#[derive(Debug)]
pub enum Step {
    /// Try again after the retry delay.
    Retry(RetryReason),
    /// The occurrence is finished.
    Done(Outcome),
}

/// The single completion record of an occurrence.
#[derive(Debug)]
pub struct Completion {
    /// The occurrence that finished.
    pub occurrence: LifecycleOccurrence,
    /// How it finished.
    pub outcome: Outcome,
    /// Number of attempts made, including the final one.
    pub attempts: u32,
}

impl Completion {
    /// Shortcut for `occurrence.kind()`.
    pub fn kind(&self) -> LifecycleEvent {
        self.occurrence.kind()
    }
}

// =============================================================================
// DelayedServiceNotifier
// =============================================================================

/// Retry state machine for one [`LifecycleOccurrence`].
pub struct DelayedServiceNotifier {
    occurrence: LifecycleOccurrence,
    listeners: Arc<ListenerRegistry>,
    resolver: Arc<dyn ContextResolver>,
    attempts: u32,
}

impl DelayedServiceNotifier {
    /// Creates a notifier for `occurrence`.
    pub fn new(
        occurrence: LifecycleOccurrence,
        listeners: Arc<ListenerRegistry>,
        resolver: Arc<dyn ContextResolver>,
    ) -> Self {
        Self {
            occurrence,
            listeners,
            resolver,
            attempts: 0,
        }
    }

    /// The occurrence this notifier delivers.
    pub fn occurrence(&self) -> &LifecycleOccurrence {
        &self.occurrence
    }

    /// Attempts made so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Runs one pass of the state machine.
    ///
    /// Callers must stop calling once a [`Step::Done`] is returned.
    pub async fn attempt(&mut self) -> Step {
        self.attempts += 1;
        debug!(
            component = %self.occurrence.component_id(),
            attempt = self.attempts,
            "Notifier attempt"
        );

        if let Some(step) = self.resolve().await {
            return step;
        }
        self.dispatch().await
    }

    /// Drives attempts every `retry_delay` until done or `shutdown` fires.
    pub async fn run(mut self, retry_delay: Duration, shutdown: &CancellationToken) -> Completion {
        let outcome = loop {
            if shutdown.is_cancelled() {
                break Outcome::Cancelled;
            }
            match self.attempt().await {
                Step::Done(outcome) => break outcome,
                Step::Retry(reason) => {
                    debug!(
                        component = %self.occurrence.component_id(),
                        reason = %reason,
                        delay_ms = retry_delay.as_millis() as u64,
                        "Notifier rescheduled"
                    );
                    tokio::select! {
                        biased;
                        _ = shutdown.cancelled() => break Outcome::Cancelled,
                        _ = tokio::time::sleep(retry_delay) => {}
                    }
                }
            }
        };

        Completion {
            occurrence: self.occurrence,
            outcome,
            attempts: self.attempts,
        }
    }

    /// Resolving state. `None` means "move on to dispatching".
    async fn resolve(&self) -> Option<Step> {
        // A departing component has no factory left to find.
        if self.occurrence.kind() == LifecycleEvent::Removed {
            return None;
        }

        match self.resolver.resolve(self.occurrence.instance()).await {
            Err(err) => {
                if err.is_tracker() {
                    debug!(
                        component = %self.occurrence.component_id(),
                        error = %err,
                        "Error in the plugin tracker, cannot proceed"
                    );
                } else {
                    debug!(
                        component = %self.occurrence.component_id(),
                        error = %err,
                        "Error resolving factory, giving up"
                    );
                }
                Some(Step::Done(Outcome::ResolveFailed(err)))
            }
            Ok(None) => Some(Step::Retry(RetryReason::FactoryUnavailable)),
            Ok(Some(_)) if !self.resolver.unwrapper_available() => {
                Some(Step::Retry(RetryReason::UnwrapperUnavailable))
            }
            Ok(Some(_)) => None,
        }
    }

    /// Dispatching state.
    async fn dispatch(&self) -> Step {
        let component_type = self.occurrence.component_type();
        let Some(listener) = self.listeners.get(component_type) else {
            if component_type.accepts_plugin_interface() {
                debug!(
                    component_type = %component_type,
                    "No listener registered for base plugin type yet"
                );
                return Step::Retry(RetryReason::ListenerMissing);
            }
            return Step::Done(Outcome::NoListener);
        };

        let instance = self.occurrence.instance();
        let call = async {
            match self.occurrence.kind() {
                LifecycleEvent::Added => listener.added(instance).await,
                LifecycleEvent::Removed => listener.removed(instance).await,
                LifecycleEvent::Modified => listener.modified(instance).await,
            }
        };

        match AssertUnwindSafe(call).catch_unwind().await {
            Ok(Ok(())) => Step::Done(Outcome::Delivered),
            Ok(Err(err)) if err.is_invalid_context() => {
                debug!(
                    component = %self.occurrence.component_id(),
                    error = %err,
                    "Listener context is restarting"
                );
                Step::Retry(RetryReason::InvalidContext)
            }
            Ok(Err(err)) => {
                warn!(
                    component = %self.occurrence.component_id(),
                    kind = %self.occurrence.kind(),
                    error = %err,
                    "Lifecycle listener failed"
                );
                Step::Done(Outcome::ListenerFailed(err.to_string()))
            }
            Err(_) => {
                error!(
                    component = %self.occurrence.component_id(),
                    kind = %self.occurrence.kind(),
                    "Lifecycle listener panicked"
                );
                Step::Done(Outcome::ListenerFailed("listener panicked".to_string()))
            }
        }
    }
}

impl fmt::Debug for DelayedServiceNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelayedServiceNotifier")
            .field("occurrence", &self.occurrence)
            .field("attempts", &self.attempts)
            .finish()
    }
}

// =============================================================================
// NotifierHandle
// =============================================================================

/// Receiving end of an occurrence's completion signal.
pub struct NotifierHandle {
    occurrence: LifecycleOccurrence,
    rx: oneshot::Receiver<Completion>,
}

impl NotifierHandle {
    pub(crate) fn new(occurrence: LifecycleOccurrence, rx: oneshot::Receiver<Completion>) -> Self {
        Self { occurrence, rx }
    }

    /// The occurrence being delivered.
    pub fn occurrence(&self) -> &LifecycleOccurrence {
        &self.occurrence
    }

    /// Waits for the completion signal.
    ///
    /// Returns `None` only if the runtime dropped the notifier task.
    pub async fn completion(self) -> Option<Completion> {
        self.rx.await.ok()
    }

    /// Returns the completion if it has already been signalled.
    pub fn try_completion(&mut self) -> Option<Completion> {
        self.rx.try_recv().ok()
    }
}
