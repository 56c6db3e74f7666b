//! Controller-specific error types.
//!
//! Errors are split into transient outcomes, which carry a retry delay and are
//! never shown to users, and hard errors, which are recorded on the
//! Metal3Data `status.errorMessage`.

use crate::render::RenderError;
use kube::Error as KubeError;
use std::time::Duration;
use store_client::StoreError;
use thiserror::Error;

/// Retry delay after an optimistic-concurrency conflict or create race
pub const CONFLICT_REQUEUE: Duration = Duration::from_secs(1);

/// Errors that can occur in the Metal3Data Controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// Object store error
    #[error("Object store error: {0}")]
    Store(#[from] StoreError),

    /// Dependency not ready yet
    #[error("Requeue after {}s: {reason}", .after.as_secs())]
    Requeue {
        /// Suggested delay
        after: Duration,
        /// What is being waited for
        reason: String,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Missing or broken ownership linkage
    #[error("Ownership error: {0}")]
    Ownership(String),

    /// IP allocation failed
    #[error("IP allocation failed: {0}")]
    AllocationFailed(String),

    /// Rendering failed
    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),
}

impl ControllerError {
    /// Transient outcome retried after `after`
    pub fn requeue(after: Duration, reason: impl Into<String>) -> Self {
        ControllerError::Requeue {
            after,
            reason: reason.into(),
        }
    }

    /// Retry delay for transient outcomes, `None` for hard errors
    pub fn requeue_after(&self) -> Option<Duration> {
        match self {
            ControllerError::Requeue { after, .. } => Some(*after),
            ControllerError::Store(StoreError::Conflict(_) | StoreError::AlreadyExists(_)) => {
                Some(CONFLICT_REQUEUE)
            }
            _ => None,
        }
    }

    /// Whether the error is a transient requeue signal
    pub fn is_transient(&self) -> bool {
        self.requeue_after().is_some()
    }
}
