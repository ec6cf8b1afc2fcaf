//! Runtime error types.

use std::sync::Arc;

use herald_core::BoxError;
use thiserror::Error;
use tokio::task::JoinError;

use crate::config::ConfigError;

/// Host platform startup failure during extension initialization.
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// The host platform rejected the application context.
    #[error("Failed to initialize host platform: {0}")]
    Platform(#[source] BoxError),

    /// The component container failed to start.
    #[error("Failed to start component container: {0}")]
    Container(#[source] BoxError),

    /// The startup task panicked or was cancelled.
    #[error("Bootstrap task aborted: {0}")]
    Aborted(#[source] JoinError),
}

/// Errors that can occur during runtime operations.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Bootstrap failed; the host should treat this as fatal. Every
    /// concurrent initializer receives the same failure.
    #[error(transparent)]
    Bootstrap(Arc<BootstrapError>),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No tokio runtime to run notifiers on.
    #[error("No tokio runtime available for the notifier scheduler")]
    NoRuntime,
}

impl From<BootstrapError> for RuntimeError {
    fn from(err: BootstrapError) -> Self {
        Self::Bootstrap(Arc::new(err))
    }
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
