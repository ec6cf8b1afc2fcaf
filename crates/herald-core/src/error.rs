//! Error types for the Herald collaborator contracts.
//!
//! Runtime-level errors (bootstrap, configuration) are defined in
//! `herald-runtime`.

use thiserror::Error;

/// Opaque error produced by a host collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// =============================================================================
// Resolve Errors
// =============================================================================

/// Failure to produce a dependency-injection factory for a component.
///
/// Both variants are terminal for the occurrence being resolved. A factory
/// that is merely not available yet is reported as `Ok(None)`, not as an
/// error.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The tracker itself cannot proceed.
    #[error("plugin tracker failure: {0}")]
    Tracker(String),

    /// Any other resolution failure.
    #[error("context resolution failed: {0}")]
    Other(#[source] BoxError),
}

impl ResolveError {
    /// Creates a tracker failure.
    pub fn tracker(msg: impl Into<String>) -> Self {
        Self::Tracker(msg.into())
    }

    /// Wraps any other failure.
    pub fn other(err: impl Into<BoxError>) -> Self {
        Self::Other(err.into())
    }

    /// `true` for [`ResolveError::Tracker`].
    pub fn is_tracker(&self) -> bool {
        matches!(self, Self::Tracker(_))
    }
}

// =============================================================================
// Listener Errors
// =============================================================================

/// Message prefix that identifies an invalid-context failure reported as text.
pub const INVALID_CONTEXT_PREFIX: &str = "Invalid context";

/// Failure raised by a [`LifecycleListener`](crate::LifecycleListener) callback.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The container behind the listener is restarting; retry later.
    #[error("Invalid context: {0}")]
    InvalidContext(String),

    /// The callback failed for any other reason.
    #[error("listener failed: {0}")]
    Failed(#[source] BoxError),
}

impl ListenerError {
    /// Creates an invalid-context error.
    pub fn invalid_context(msg: impl Into<String>) -> Self {
        Self::InvalidContext(msg.into())
    }

    /// Wraps any other failure.
    pub fn failed(err: impl Into<BoxError>) -> Self {
        Self::Failed(err.into())
    }

    /// Classifies a free-text failure message.
    ///
    /// For collaborators that only report text: messages starting with
    /// [`INVALID_CONTEXT_PREFIX`] become [`ListenerError::InvalidContext`],
    /// everything else [`ListenerError::Failed`].
    pub fn from_message(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        match msg.strip_prefix(INVALID_CONTEXT_PREFIX) {
            Some(rest) => {
                Self::InvalidContext(rest.trim_start_matches([':', ' ']).to_string())
            }
            None => Self::Failed(msg.into()),
        }
    }

    /// `true` when the failure should be retried.
    pub fn is_invalid_context(&self) -> bool {
        matches!(self, Self::InvalidContext(_))
    }
}

impl From<RegistryError> for ListenerError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::InvalidContext(msg) => Self::InvalidContext(msg),
            other => Self::Failed(Box::new(other)),
        }
    }
}

// =============================================================================
// Registry Errors
// =============================================================================

/// Errors reported by the host plugin registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The plugin type is not known to the registry.
    #[error("unknown plugin type: {0}")]
    UnknownPluginType(String),

    /// The plugin could not be registered or removed.
    #[error("plugin '{id}' rejected: {reason}")]
    Rejected {
        /// Component identifier.
        id: String,
        /// Reason for rejection.
        reason: String,
    },

    /// The registry's context is being rebuilt.
    #[error("Invalid context: {0}")]
    InvalidContext(String),
}

// =============================================================================
// Property Errors
// =============================================================================

/// Failure to read a named property from a component's factory.
#[derive(Debug, Error)]
pub enum PropertyError {
    /// No factory is available for the component.
    #[error("no factory available for component '{0}'")]
    NoFactory(String),

    /// Resolving the factory failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The factory failed to read the property.
    #[error("failed to read property '{name}': {source}")]
    Lookup {
        /// Property name.
        name: String,
        /// Underlying failure.
        #[source]
        source: BoxError,
    },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for factory resolution.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result type for property lookups.
pub type PropertyResult<T> = Result<T, PropertyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_message_classifies_prefix() {
        let err = ListenerError::from_message("Invalid context: bundle is restarting");
        assert!(err.is_invalid_context());
        assert_eq!(err.to_string(), "Invalid context: bundle is restarting");

        let err = ListenerError::from_message("boom");
        assert!(!err.is_invalid_context());
        assert_eq!(err.to_string(), "listener failed: boom");
    }

    #[test]
    fn test_registry_errors_keep_invalid_context() {
        let err: ListenerError = RegistryError::InvalidContext("restarting".into()).into();
        assert!(err.is_invalid_context());

        let err: ListenerError = RegistryError::UnknownPluginType("x".into()).into();
        assert!(!err.is_invalid_context());
    }

    #[test]
    fn test_resolve_error_kinds() {
        assert!(ResolveError::tracker("broken").is_tracker());
        assert!(!ResolveError::other("io").is_tracker());
    }
}
