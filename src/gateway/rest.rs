//! Hosted backend over HTTP
//!
//! Table CRUD goes through the REST endpoint (`/rest/v1/<table>`), auth
//! through `/auth/v1`. Requests carry the public key plus the session's
//! bearer token once signed in.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::sync::RwLock;

use super::query::SelectQuery;
use super::traits::{validate_credentials, AuthProvider, RemoteGateway, UserIdentity};
use crate::config::BackendConfig;
use crate::domain::{DomainError, DomainResult};
use crate::mapper::WireRecord;

#[derive(Debug, Clone)]
struct AuthSession {
    access_token: String,
    user: UserIdentity,
}

/// `RemoteGateway` + `AuthProvider` for the hosted Postgres service
pub struct RestBackend {
    config: BackendConfig,
    client: Client,
    session: RwLock<Option<AuthSession>>,
}

impl RestBackend {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            config,
            client: Client::new(),
            session: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// `<base>/rest/v1/<table>?<query>`
    pub fn table_url(&self, table: &str, query: &str) -> String {
        if query.is_empty() {
            format!("{}/rest/v1/{}", self.config.url, table)
        } else {
            format!("{}/rest/v1/{}?{}", self.config.url, table, query)
        }
    }

    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.config.url, path)
    }

    async fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let session = self.session.read().await;
        let token = session.as_ref().map(|s| s.access_token.as_str()).unwrap_or(&self.config.anon_key);
        builder
            .header("apikey", &self.config.anon_key)
            .header("Authorization", format!("Bearer {}", token))
    }

    async fn send(&self, builder: RequestBuilder) -> DomainResult<Response> {
        let response = builder.send().await.map_err(|e| DomainError::Network(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(error_from_response(status.as_u16(), &body))
    }

    async fn send_json(&self, builder: RequestBuilder) -> DomainResult<Value> {
        let response = self.send(builder).await?;
        let text = response.text().await.map_err(|e| DomainError::Network(e.to_string()))?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    async fn start_session(&self, payload: AuthPayload) -> DomainResult<UserIdentity> {
        let user = payload
            .user
            .ok_or_else(|| DomainError::Decode("auth response without user".into()))?
            .into_identity();
        let access_token = payload.access_token.ok_or_else(|| {
            DomainError::Unauthenticated("Check your inbox to confirm your email, then sign in".into())
        })?;

        *self.session.write().await = Some(AuthSession { access_token, user: user.clone() });
        log::info!("[AUTH] Signed in as {}", user.email);
        Ok(user)
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl RemoteGateway for RestBackend {
    async fn insert(&self, table: &str, record: WireRecord) -> DomainResult<Value> {
        let builder = self
            .client
            .post(self.table_url(table, ""))
            .header("Prefer", "return=representation")
            .json(&record);
        let body = self.send_json(self.authorized(builder).await).await?;
        first_row(body, table, "inserted row")
    }

    async fn update(&self, table: &str, id: &str, patch: WireRecord) -> DomainResult<Value> {
        let builder = self
            .client
            .patch(self.table_url(table, &SelectQuery::by_id(id).filter_string()))
            .header("Prefer", "return=representation")
            .json(&patch);
        let body = self.send_json(self.authorized(builder).await).await?;
        first_row(body, table, id)
    }

    async fn delete(&self, table: &str, id: &str) -> DomainResult<()> {
        let builder = self.client.delete(self.table_url(table, &SelectQuery::by_id(id).filter_string()));
        self.send(self.authorized(builder).await).await?;
        Ok(())
    }

    async fn select(&self, table: &str, query: &SelectQuery) -> DomainResult<Vec<Value>> {
        let builder = self.client.get(self.table_url(table, &query.to_query_string()));
        match self.send_json(self.authorized(builder).await).await? {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            other => Err(DomainError::Decode(format!("expected array from {}, got {}", table, other))),
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl AuthProvider for RestBackend {
    async fn sign_in(&self, email: &str, password: &str) -> DomainResult<UserIdentity> {
        validate_credentials(email, password)?;
        let builder = self
            .client
            .post(self.auth_url("token?grant_type=password"))
            .header("apikey", &self.config.anon_key)
            .json(&json!({ "email": email, "password": password }));
        let body = self.send_json(builder).await?;
        self.start_session(serde_json::from_value(body)?).await
    }

    async fn sign_up(&self, email: &str, password: &str, display_name: Option<&str>) -> DomainResult<UserIdentity> {
        validate_credentials(email, password)?;
        let builder = self
            .client
            .post(self.auth_url("signup"))
            .header("apikey", &self.config.anon_key)
            .json(&json!({
                "email": email,
                "password": password,
                "data": { "full_name": display_name.unwrap_or_default() },
            }));
        let body = self.send_json(builder).await?;
        self.start_session(AuthPayload::from_signup(body)?).await
    }

    async fn sign_out(&self) -> DomainResult<()> {
        let builder = self.client.post(self.auth_url("logout"));
        let result = self.send(self.authorized(builder).await).await;
        // Local session ends even if the server call fails
        *self.session.write().await = None;
        if let Err(e) = &result {
            log::warn!("[AUTH] Remote sign-out failed: {}", e);
        }
        result.map(|_| ())
    }

    async fn current_user(&self) -> Option<UserIdentity> {
        self.session.read().await.as_ref().map(|s| s.user.clone())
    }
}

// ========================
// Wire helpers
// ========================

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<Map<String, Value>>,
}

impl AuthUser {
    fn into_identity(self) -> UserIdentity {
        let display_name = self.user_metadata.as_ref().and_then(|meta| {
            ["full_name", "display_name", "name"]
                .iter()
                .find_map(|key| meta.get(*key).and_then(Value::as_str))
                .filter(|name| !name.trim().is_empty())
                .map(str::to_string)
        });
        UserIdentity {
            id: self.id,
            email: self.email.unwrap_or_default(),
            display_name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AuthPayload {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    user: Option<AuthUser>,
}

impl AuthPayload {
    /// Sign-up returns either a session or, with email confirmation on, a bare user
    fn from_signup(body: Value) -> DomainResult<Self> {
        let payload: AuthPayload = serde_json::from_value(body.clone())?;
        if payload.user.is_some() || payload.access_token.is_some() {
            return Ok(payload);
        }
        let user: AuthUser = serde_json::from_value(body)?;
        Ok(AuthPayload { access_token: None, user: Some(user) })
    }
}

/// Representation responses are arrays; take the single affected row
fn first_row(body: Value, table: &str, what: &str) -> DomainResult<Value> {
    match body {
        Value::Array(rows) => rows
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::NotFound(format!("{} {}", table, what))),
        Value::Object(row) => Ok(Value::Object(row)),
        other => Err(DomainError::Decode(format!("unexpected {} response: {}", table, other))),
    }
}

/// Map an HTTP error status + body to a domain error with a readable message
pub(crate) fn error_from_response(status: u16, body: &str) -> DomainError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "error_description", "msg", "error"]
                .iter()
                .find_map(|key| value.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() { format!("HTTP {}", status) } else { trimmed.to_string() }
        });

    match status {
        400 if message.to_ascii_lowercase().contains("invalid login") => DomainError::Unauthenticated(message),
        401 | 403 => DomainError::Unauthenticated(message),
        404 => DomainError::NotFound(message),
        409 => DomainError::Conflict(message),
        422 => DomainError::InvalidInput(message),
        _ => DomainError::Backend { status, message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> RestBackend {
        RestBackend::new(BackendConfig::new("https://abc.example.co/", "anon").unwrap())
    }

    #[test]
    fn test_urls() {
        let backend = backend();
        assert_eq!(backend.table_url("projects", ""), "https://abc.example.co/rest/v1/projects");
        assert_eq!(
            backend.table_url("tasks", &SelectQuery::by_id("t 1").filter_string()),
            "https://abc.example.co/rest/v1/tasks?id=eq.t%201"
        );
        assert_eq!(backend.auth_url("logout"), "https://abc.example.co/auth/v1/logout");
    }

    #[test]
    fn test_error_mapping() {
        let err = error_from_response(400, r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#);
        assert_eq!(err, DomainError::Unauthenticated("Invalid login credentials".into()));

        let err = error_from_response(409, r#"{"code":"23505","message":"duplicate key value"}"#);
        assert_eq!(err, DomainError::Conflict("duplicate key value".into()));

        let err = error_from_response(500, "");
        assert_eq!(err, DomainError::Backend { status: 500, message: "HTTP 500".into() });

        let err = error_from_response(401, "JWT expired");
        assert_eq!(err, DomainError::Unauthenticated("JWT expired".into()));
    }

    #[test]
    fn test_first_row() {
        let row = first_row(json!([{ "id": "p1" }, { "id": "p2" }]), "projects", "x").unwrap();
        assert_eq!(row["id"], json!("p1"));

        // Row-level security hides the row: empty array
        let err = first_row(json!([]), "projects", "p9").unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn test_auth_user_display_name() {
        let user: AuthUser = serde_json::from_value(json!({
            "id": "u1", "email": "ada@example.com", "user_metadata": { "full_name": "Ada Lovelace" }
        }))
        .unwrap();
        let identity = user.into_identity();
        assert_eq!(identity.display_name.as_deref(), Some("Ada Lovelace"));
    }

    #[test]
    fn test_signup_without_session_keeps_user() {
        let payload = AuthPayload::from_signup(json!({ "id": "u1", "email": "ada@example.com" })).unwrap();
        assert!(payload.access_token.is_none());
        assert_eq!(payload.user.unwrap().id, "u1");
    }

    #[tokio::test]
    async fn test_signup_confirmation_required() {
        let backend = backend();
        let payload = AuthPayload::from_signup(json!({ "id": "u1", "email": "ada@example.com" })).unwrap();
        let err = backend.start_session(payload).await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthenticated(_)));
        assert!(backend.current_user().await.is_none());
    }
}
