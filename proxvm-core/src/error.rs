//! Error types for selector resolution and configuration access.

use thiserror::Error;

/// Errors that can occur while resolving VMs or reading their configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProxvmError {
    /// No VM matched the identifier.
    #[error("VM/CT {0} not found")]
    NotFound(String),

    /// The VM kind is unknown, or the operation is not possible for this kind.
    #[error("Unsupported VM kind: {0}")]
    UnsupportedKind(String),

    /// A configuration value is missing or has the wrong shape.
    #[error("Malformed configuration key '{key}': {reason}")]
    MalformedConfig {
        key: String,
        reason: String,
    },

    /// Snapshot not found.
    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(String),

    /// The cluster collaborator reported a failure.
    #[error("Cluster API error: {0}")]
    Api(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProxvmError {
    pub(crate) fn malformed(key: &str, reason: impl Into<String>) -> Self {
        ProxvmError::MalformedConfig {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for proxvm operations.
pub type Result<T> = std::result::Result<T, ProxvmError>;
