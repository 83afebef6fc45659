//! Domain Layer - Core Entity Trait
//!
//! This trait defines the basic contract for all domain entities.
//! Every entity is identified by an opaque, server-assigned string id.

use serde::Serialize;
use thiserror::Error;

/// Opaque identifier assigned by the backend (usually a UUID)
pub type EntityId = String;

/// Core trait for all domain entities
pub trait Entity: Sized + Send + Sync + Clone + 'static {
    /// Returns the entity's unique identifier
    fn id(&self) -> &str;
}

/// Entities that the Store can create from a draft and merge partial changes into.
///
/// Drafts and patches never carry server-assigned or derived fields
/// (id, timestamps, project progress).
pub trait Patchable: Entity {
    /// Input for `add`; everything the caller chooses on creation
    type Draft: Serialize + Send + Sync;
    /// Sparse change set for `update`; `None` means "do not change"
    type Patch: Serialize + Send + Sync;

    /// Merge a patch into the local copy (optimistic update)
    fn apply_patch(&mut self, patch: &Self::Patch);
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// No backend URL/key has been supplied in settings
    #[error("Backend is not configured")]
    NotConfigured,

    #[error("{0}")]
    Unauthenticated(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend rejected request ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Errors that mean the Store cannot talk to the backend at all
    pub fn is_offline(&self) -> bool {
        matches!(self, DomainError::NotConfigured | DomainError::Network(_))
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(DomainError::NotFound("task t1".into()).to_string(), "Not found: task t1");
        assert_eq!(
            DomainError::Backend { status: 409, message: "duplicate key".into() }.to_string(),
            "Backend rejected request (409): duplicate key"
        );
        // Auth messages are shown verbatim on the login form
        assert_eq!(
            DomainError::Unauthenticated("Invalid login credentials".into()).to_string(),
            "Invalid login credentials"
        );
    }

    #[test]
    fn test_offline_classification() {
        assert!(DomainError::NotConfigured.is_offline());
        assert!(DomainError::Network("timeout".into()).is_offline());
        assert!(!DomainError::Conflict("x".into()).is_offline());
    }
}
