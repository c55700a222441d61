//! Error taxonomy shared by the state-synchronization layers.
//!
//! Strongly-typed errors with a permanent/transient split: reconciliation
//! decides between `FAILED_PERMANENTLY` and `SYNC_NEEDED` purely from
//! [`ChatError::is_permanent`], so the classification lives here rather
//! than in every listener.

use thiserror::Error;

/// Result alias used across the workspace.
pub type ChatResult<T> = Result<T, ChatError>;

/// Errors produced by preconditions, local computation, and the network
/// boundary.
#[derive(Error, Debug)]
pub enum ChatError {
    /// Local precondition failure; never reaches the network and never
    /// mutates state.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Programmer or precondition failure with a plain message.
    #[error("{0}")]
    Generic(String),

    /// Underlying device/IO failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure reported by the server or transport.
    #[error("network error (status {status}): {message}")]
    Network {
        /// HTTP-like status code, 0 when the request never left the device.
        status: u16,
        /// Server-provided description.
        message: String,
        /// Whether a later retry can succeed.
        retryable: bool,
    },
}

impl ChatError {
    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// A transient network failure (connection dropped, 5xx, timeout).
    pub fn transient_network(message: impl Into<String>) -> Self {
        Self::Network { status: 0, message: message.into(), retryable: true }
    }

    /// A permanent network failure (4xx validation by the server).
    pub fn permanent_network(status: u16, message: impl Into<String>) -> Self {
        Self::Network { status, message: message.into(), retryable: false }
    }

    /// True when retrying can never succeed. Terminates the entity's sync
    /// lifecycle at `FAILED_PERMANENTLY`.
    pub fn is_permanent(&self) -> bool {
        match self {
            Self::Validation(_) | Self::Generic(_) => true,
            Self::Io(_) => false,
            Self::Network { retryable, .. } => !retryable,
        }
    }

    /// Inverse of [`Self::is_permanent`], for readability at call sites.
    pub fn is_transient(&self) -> bool {
        !self.is_permanent()
    }
}
