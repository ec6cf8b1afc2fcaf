//! Shared scheduler for delayed notifiers.
//!
//! Every occurrence runs as its own task on one multi-worker tokio runtime.
//! Tasks never block a worker while waiting to retry; they sleep on the
//! runtime's timer. Retries of one occurrence are sequential because the
//! task only sleeps again after its previous attempt returned.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{Instrument, debug, debug_span, error, info};

use crate::notifier::{Completion, DEFAULT_RETRY_DELAY, DelayedServiceNotifier, NotifierHandle};

/// Told about every finished occurrence, exactly once per occurrence.
pub trait CompletionListener: Send + Sync {
    /// Called with the occurrence's completion record.
    fn on_completion(&self, completion: &Completion);
}

/// Runs [`DelayedServiceNotifier`]s until they complete.
pub struct NotifierScheduler {
    runtime: Handle,
    tasks: TaskTracker,
    shutdown: CancellationToken,
    retry_delay: Duration,
    completion_listener: Option<Arc<dyn CompletionListener>>,
}

impl NotifierScheduler {
    /// Creates a scheduler spawning onto `runtime`.
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            tasks: TaskTracker::new(),
            shutdown: CancellationToken::new(),
            retry_delay: DEFAULT_RETRY_DELAY,
            completion_listener: None,
        }
    }

    /// Sets the fixed delay between attempts.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Sets the listener told about every completion.
    pub fn with_completion_listener(mut self, listener: Arc<dyn CompletionListener>) -> Self {
        self.completion_listener = Some(listener);
        self
    }

    /// The fixed delay between attempts.
    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Number of occurrences still in flight.
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Whether [`shutdown`](Self::shutdown) was called.
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Starts delivering `notifier`'s occurrence.
    ///
    /// The first attempt runs as soon as a worker picks the task up. After
    /// shutdown the occurrence completes immediately as cancelled.
    pub fn schedule(&self, notifier: DelayedServiceNotifier) -> NotifierHandle {
        let (tx, rx) = oneshot::channel();
        let occurrence = notifier.occurrence().clone();
        let span = debug_span!(
            "notifier",
            component = %occurrence.component_id(),
            kind = %occurrence.kind(),
            component_type = %occurrence.component_type(),
        );

        let retry_delay = self.retry_delay;
        let shutdown = self.shutdown.clone();
        let completion_listener = self.completion_listener.clone();

        self.tasks.spawn_on(
            async move {
                let completion = notifier.run(retry_delay, &shutdown).await;
                debug!(
                    outcome = %completion.outcome,
                    attempts = completion.attempts,
                    "Notifier finished"
                );
                if let Some(listener) = completion_listener {
                    let notified =
                        panic::catch_unwind(AssertUnwindSafe(|| listener.on_completion(&completion)));
                    if notified.is_err() {
                        error!("Completion listener panicked");
                    }
                }
                let _ = tx.send(completion);
            }
            .instrument(span),
            &self.runtime,
        );

        NotifierHandle::new(occurrence, rx)
    }

    /// Cancels every in-flight notifier and waits for them to complete.
    pub async fn shutdown(&self) {
        info!(in_flight = self.tasks.len(), "Shutting down notifier scheduler");
        self.shutdown.cancel();
        self.tasks.close();
        self.tasks.wait().await;
    }
}

impl fmt::Debug for NotifierScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifierScheduler")
            .field("retry_delay", &self.retry_delay)
            .field("in_flight", &self.tasks.len())
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}
