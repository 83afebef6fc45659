//! Gateway Layer - Core Traits
//!
//! Abstract interfaces for the hosted backend: table CRUD and authentication.
//! Implementations: `RestBackend` (HTTP) and `MemoryGateway` (in-process).

use async_trait::async_trait;
use serde_json::Value;

use super::query::SelectQuery;
use crate::domain::DomainResult;
use crate::mapper::WireRecord;

/// Request/response CRUD over backend tables
///
/// Row isolation per user is the backend's job; callers never filter by
/// user id.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait RemoteGateway: Send + Sync {
    /// Insert a record, returning the stored row (server-assigned id, timestamps)
    async fn insert(&self, table: &str, record: WireRecord) -> DomainResult<Value>;

    /// Apply a partial update by id, returning the stored row
    async fn update(&self, table: &str, id: &str, patch: WireRecord) -> DomainResult<Value>;

    /// Delete by id
    async fn delete(&self, table: &str, id: &str) -> DomainResult<()>;

    /// Select rows matching filters, in the requested order
    async fn select(&self, table: &str, query: &SelectQuery) -> DomainResult<Vec<Value>>;
}

/// Identity of the signed-in user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
}

impl UserIdentity {
    /// Display name, falling back to the mailbox part of the email
    pub fn label(&self) -> &str {
        match &self.display_name {
            Some(name) if !name.trim().is_empty() => name,
            _ => self.email.split('@').next().unwrap_or(&self.email),
        }
    }
}

/// Session lifecycle of the hosted auth service
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> DomainResult<UserIdentity>;

    async fn sign_up(&self, email: &str, password: &str, display_name: Option<&str>) -> DomainResult<UserIdentity>;

    async fn sign_out(&self) -> DomainResult<()>;

    /// The user of the live session, if any
    async fn current_user(&self) -> Option<UserIdentity>;
}

/// Basic credential shape check shared by auth implementations
pub(crate) fn validate_credentials(email: &str, password: &str) -> DomainResult<()> {
    use crate::domain::DomainError;

    if email.trim().is_empty() || !email.contains('@') {
        return Err(DomainError::InvalidInput("Enter a valid email address".into()));
    }
    if password.is_empty() {
        return Err(DomainError::InvalidInput("Password is required".into()));
    }
    Ok(())
}
