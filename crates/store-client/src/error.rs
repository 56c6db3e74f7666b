//! Object store client errors

use thiserror::Error;

/// Errors that can occur when reading or writing the object store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Object does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Stored resource version differs from the one written
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Object with the same name already exists
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Kubernetes API returned any other error
    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Map a kube error, treating 404 as `NotFound` and 409 with `on_conflict`
    pub(crate) fn from_kube(err: kube::Error, on_conflict: fn(String) -> StoreError) -> Self {
        match err {
            kube::Error::Api(ae) if ae.code == 404 => StoreError::NotFound(ae.message),
            kube::Error::Api(ae) if ae.code == 409 => on_conflict(ae.message),
            other => StoreError::Api(other),
        }
    }

    /// Whether the object was missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Converts a `NotFound` result into `Ok(None)`
pub trait OptionalExt<T> {
    /// `Ok(Some(v))` on success, `Ok(None)` when the object is missing
    fn optional(self) -> Result<Option<T>, StoreError>;
}

impl<T> OptionalExt<T> for Result<T, StoreError> {
    fn optional(self) -> Result<Option<T>, StoreError> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
