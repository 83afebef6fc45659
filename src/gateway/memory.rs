//! In-memory backend
//!
//! Keeps every table as a `Vec` of wire records behind a `tokio::sync::RwLock`.
//! Assigns ids and timestamps the way the hosted backend does, so the Store
//! can run offline and tests can exercise it without a network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tokio::sync::RwLock;

use super::query::SelectQuery;
use super::traits::{validate_credentials, AuthProvider, RemoteGateway, UserIdentity};
use crate::domain::{DomainError, DomainResult};
use crate::mapper::{format_timestamp, WireRecord};

#[derive(Default)]
struct Tables {
    rows: HashMap<String, Vec<WireRecord>>,
    /// Last issued timestamp; stamps are strictly increasing
    last_stamp: Option<DateTime<Utc>>,
}

impl Tables {
    fn stamp(&mut self) -> String {
        let now = Utc::now();
        let next = match self.last_stamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_stamp = Some(next);
        format_timestamp(&next)
    }
}

struct Account {
    password: String,
    identity: UserIdentity,
}

/// In-process implementation of `RemoteGateway` + `AuthProvider`
pub struct MemoryGateway {
    tables: RwLock<Tables>,
    accounts: RwLock<HashMap<String, Account>>,
    session: RwLock<Option<UserIdentity>>,
    next_id: AtomicU64,
    offline: AtomicBool,
    requests: AtomicUsize,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            accounts: RwLock::new(HashMap::new()),
            session: RwLock::new(None),
            next_id: AtomicU64::new(1),
            offline: AtomicBool::new(false),
            requests: AtomicUsize::new(0),
        }
    }

    /// Register an account that can sign in
    pub fn with_account(mut self, email: &str, password: &str, display_name: Option<&str>) -> Self {
        let key = email.to_ascii_lowercase();
        let identity = UserIdentity {
            id: format!("user-{}", key),
            email: email.to_string(),
            display_name: display_name.map(str::to_string),
        };
        self.accounts.get_mut().insert(key, Account { password: password.to_string(), identity });
        self
    }

    /// Simulate a dropped connection: every data request fails
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of data requests received (successful or not)
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Current server-side rows of a table
    pub async fn records(&self, table: &str) -> Vec<WireRecord> {
        self.tables.read().await.rows.get(table).cloned().unwrap_or_default()
    }

    /// Put rows straight into a table, bypassing id/timestamp assignment
    pub async fn seed(&self, table: &str, records: Vec<WireRecord>) {
        self.tables.write().await.rows.entry(table.to_string()).or_default().extend(records);
    }

    fn begin_request(&self) -> DomainResult<()> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(DomainError::Network("connection refused".into()));
        }
        Ok(())
    }

    fn next_id(&self, table: &str) -> String {
        format!("{}_{}", table, self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl RemoteGateway for MemoryGateway {
    async fn insert(&self, table: &str, mut record: WireRecord) -> DomainResult<Value> {
        self.begin_request()?;
        let mut tables = self.tables.write().await;

        let id = self.next_id(table);
        record.insert("id".into(), Value::String(id));
        let stamp = tables.stamp();
        record.entry("created_at").or_insert_with(|| Value::String(stamp.clone()));
        record.entry("updated_at").or_insert_with(|| Value::String(stamp));

        tables.rows.entry(table.to_string()).or_default().push(record.clone());
        Ok(Value::Object(record))
    }

    async fn update(&self, table: &str, id: &str, patch: WireRecord) -> DomainResult<Value> {
        self.begin_request()?;
        let mut tables = self.tables.write().await;
        let touches_stamp = patch.contains_key("updated_at");
        let stamp = tables.stamp();

        let row = tables
            .rows
            .get_mut(table)
            .and_then(|rows| rows.iter_mut().find(|r| r.get("id").and_then(Value::as_str) == Some(id)))
            .ok_or_else(|| DomainError::NotFound(format!("{} {}", table, id)))?;

        for (key, value) in patch {
            if key != "id" {
                row.insert(key, value);
            }
        }
        if !touches_stamp {
            row.insert("updated_at".into(), Value::String(stamp));
        }
        Ok(Value::Object(row.clone()))
    }

    async fn delete(&self, table: &str, id: &str) -> DomainResult<()> {
        self.begin_request()?;
        let mut tables = self.tables.write().await;
        if let Some(rows) = tables.rows.get_mut(table) {
            rows.retain(|r| r.get("id").and_then(Value::as_str) != Some(id));
        }
        Ok(())
    }

    async fn select(&self, table: &str, query: &SelectQuery) -> DomainResult<Vec<Value>> {
        self.begin_request()?;
        let tables = self.tables.read().await;
        let rows = tables.rows.get(table).map(|rows| query.apply(rows)).unwrap_or_default();
        Ok(rows.into_iter().map(Value::Object).collect())
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl AuthProvider for MemoryGateway {
    async fn sign_in(&self, email: &str, password: &str) -> DomainResult<UserIdentity> {
        validate_credentials(email, password)?;
        let accounts = self.accounts.read().await;
        let identity = accounts
            .get(&email.to_ascii_lowercase())
            .filter(|account| account.password == password)
            .map(|account| account.identity.clone())
            .ok_or_else(|| DomainError::Unauthenticated("Invalid login credentials".into()))?;

        *self.session.write().await = Some(identity.clone());
        Ok(identity)
    }

    async fn sign_up(&self, email: &str, password: &str, display_name: Option<&str>) -> DomainResult<UserIdentity> {
        validate_credentials(email, password)?;
        let key = email.to_ascii_lowercase();
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&key) {
            return Err(DomainError::Conflict("User already registered".into()));
        }

        let identity = UserIdentity {
            id: format!("user-{}", key),
            email: email.to_string(),
            display_name: display_name.map(str::to_string),
        };
        accounts.insert(key, Account { password: password.to_string(), identity: identity.clone() });
        *self.session.write().await = Some(identity.clone());
        Ok(identity)
    }

    async fn sign_out(&self) -> DomainResult<()> {
        *self.session.write().await = None;
        Ok(())
    }

    async fn current_user(&self) -> Option<UserIdentity> {
        self.session.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> WireRecord {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_timestamps() {
        let gateway = MemoryGateway::new();
        let row = gateway.insert("projects", record(json!({ "title": "Launch" }))).await.unwrap();

        assert_eq!(row["id"], json!("projects_1"));
        assert!(row["created_at"].is_string());
        assert_eq!(row["title"], json!("Launch"));
    }

    #[tokio::test]
    async fn test_update_merges_sparse_patch() {
        let gateway = MemoryGateway::new();
        let row = gateway
            .insert("tasks", record(json!({ "title": "Draft", "status": "todo" })))
            .await
            .unwrap();
        let id = row["id"].as_str().unwrap().to_string();

        let updated = gateway.update("tasks", &id, record(json!({ "status": "done" }))).await.unwrap();
        assert_eq!(updated["title"], json!("Draft"));
        assert_eq!(updated["status"], json!("done"));
        assert_ne!(updated["updated_at"], row["updated_at"]);
    }

    #[tokio::test]
    async fn test_update_missing_row_is_not_found() {
        let gateway = MemoryGateway::new();
        let err = gateway.update("tasks", "nope", WireRecord::new()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_offline_fails_and_counts_requests() {
        let gateway = MemoryGateway::new();
        gateway.set_offline(true);
        let err = gateway.select("notes", &SelectQuery::new()).await.unwrap_err();
        assert!(err.is_offline());
        assert_eq!(gateway.request_count(), 1);
    }

    #[tokio::test]
    async fn test_select_filters_and_orders() {
        let gateway = MemoryGateway::new();
        for title in ["a", "b", "c"] {
            gateway.insert("notes", record(json!({ "title": title }))).await.unwrap();
        }
        let rows = gateway.select("notes", &SelectQuery::new().order_by("created_at", false)).await.unwrap();
        let titles: Vec<_> = rows.iter().map(|r| r["title"].as_str().unwrap()).collect();
        assert_eq!(titles, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_sign_in_checks_password() {
        let gateway = MemoryGateway::new().with_account("ada@example.com", "hunter22", Some("Ada"));

        let err = gateway.sign_in("ada@example.com", "wrong").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid login credentials");
        assert!(gateway.current_user().await.is_none());

        let user = gateway.sign_in("ADA@example.com", "hunter22").await.unwrap();
        assert_eq!(user.label(), "Ada");
        assert_eq!(gateway.current_user().await, Some(user));

        gateway.sign_out().await.unwrap();
        assert!(gateway.current_user().await.is_none());
    }
}
