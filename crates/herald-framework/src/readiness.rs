//! Readiness gating on the activation subsystem.
//!
//! The activation subsystem is known to start, stop and start again during
//! normal host startup. Plugin-type discovery must not race that cycle, so
//! callers park on a [`ReadinessGate`] until
//! [`ActivationMonitor::should_wait`] turns `false`.
//!
//! The wait is best effort: it gives up when the timeout elapses or the
//! caller's [`CancellationToken`] fires, and callers proceed either way.
//!
//! ```rust,ignore
//! let state = Arc::new(ActivationState::new(2));
//! let gate = ReadinessGate::new(state.clone(), Duration::from_secs(120));
//!
//! // elsewhere: state.set_phase(ActivationPhase::Started) ...
//! gate.await_ready(&CancellationToken::new()).await;
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use herald_core::ActivationMonitor;

/// Default per-call readiness timeout.
pub const DEFAULT_READINESS_TIMEOUT: Duration = Duration::from_secs(120);

// =============================================================================
// ReadinessGate
// =============================================================================

/// Bounded, cancellable wait for the activation subsystem to settle.
pub struct ReadinessGate {
    monitor: Arc<dyn ActivationMonitor>,
    timeout: Duration,
}

impl ReadinessGate {
    /// Creates a gate over `monitor` that waits at most `timeout` per call.
    pub fn new(monitor: Arc<dyn ActivationMonitor>, timeout: Duration) -> Self {
        Self { monitor, timeout }
    }

    /// Maximum time a single [`await_ready`](Self::await_ready) call waits.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether the subsystem currently asks callers to wait.
    pub fn is_ready(&self) -> bool {
        !self.monitor.should_wait()
    }

    /// Waits until the subsystem stops asking callers to wait.
    ///
    /// Returns early, without error, when `cancel` fires or the timeout
    /// elapses. A cancelled token stays cancelled, so later calls with the
    /// same token return immediately.
    pub async fn await_ready(&self, cancel: &CancellationToken) {
        let deadline = Instant::now() + self.timeout;
        let handle = self.monitor.wait_handle();

        loop {
            // Register interest before checking the flag so a transition
            // between the check and the await is not lost.
            let notified = handle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if !self.monitor.should_wait() {
                debug!("Activation subsystem ready");
                return;
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Interrupted while waiting for activation subsystem");
                    return;
                }
                _ = &mut notified => {
                    debug!("Activation subsystem changed state, re-checking");
                }
                _ = tokio::time::sleep_until(deadline) => {
                    warn!(
                        timeout_ms = self.timeout.as_millis() as u64,
                        "Activation subsystem still transitioning after timeout, proceeding anyway"
                    );
                    return;
                }
            }
        }
    }
}

impl fmt::Debug for ReadinessGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadinessGate")
            .field("timeout", &self.timeout)
            .field("ready", &self.is_ready())
            .finish()
    }
}

// =============================================================================
// ActivationState
// =============================================================================

/// Phase of the activation subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationPhase {
    /// Not running.
    Stopped,
    /// Start in progress.
    Starting,
    /// Running.
    Started,
    /// Stop in progress.
    Stopping,
}

struct PhaseState {
    phase: ActivationPhase,
    completed_starts: u32,
}

/// In-process [`ActivationMonitor`] tracking start/stop cycles.
///
/// Callers are asked to wait until the subsystem has reached
/// [`ActivationPhase::Started`] `required_starts` times and is still there.
pub struct ActivationState {
    state: Mutex<PhaseState>,
    required_starts: u32,
    notify: Notify,
}

impl ActivationState {
    /// Creates a stopped subsystem that must start `required_starts` times.
    pub fn new(required_starts: u32) -> Self {
        Self {
            state: Mutex::new(PhaseState {
                phase: ActivationPhase::Stopped,
                completed_starts: 0,
            }),
            required_starts,
            notify: Notify::new(),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> ActivationPhase {
        self.state.lock().phase
    }

    /// How many times the subsystem reached [`ActivationPhase::Started`].
    pub fn completed_starts(&self) -> u32 {
        self.state.lock().completed_starts
    }

    /// Records a phase transition and wakes every gate waiter.
    pub fn set_phase(&self, phase: ActivationPhase) {
        {
            let mut state = self.state.lock();
            if phase == ActivationPhase::Started && state.phase != ActivationPhase::Started {
                state.completed_starts += 1;
            }
            state.phase = phase;
            debug!(
                phase = ?phase,
                completed_starts = state.completed_starts,
                "Activation phase changed"
            );
        }
        self.notify.notify_waiters();
    }
}

impl ActivationMonitor for ActivationState {
    fn should_wait(&self) -> bool {
        let state = self.state.lock();
        state.phase != ActivationPhase::Started || state.completed_starts < self.required_starts
    }

    fn wait_handle(&self) -> &Notify {
        &self.notify
    }
}
