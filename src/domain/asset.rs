//! Asset Entity
//!
//! An asset is a bookmark to a resource in an external service. Removing the
//! asset never touches the resource it points at.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use super::entity::{Entity, EntityId, Patchable};

/// Kind of external service an asset links to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(into = "String")]
pub enum AssetKind {
    Github,
    Figma,
    Notion,
    Slack,
    GoogleDrive,
    Linear,
    Jira,
    Vercel,
    #[default]
    Link,
    Other(String),
}

impl AssetKind {
    pub fn as_str(&self) -> &str {
        match self {
            AssetKind::Github => "github",
            AssetKind::Figma => "figma",
            AssetKind::Notion => "notion",
            AssetKind::Slack => "slack",
            AssetKind::GoogleDrive => "google_drive",
            AssetKind::Linear => "linear",
            AssetKind::Jira => "jira",
            AssetKind::Vercel => "vercel",
            AssetKind::Link => "link",
            AssetKind::Other(raw) => raw,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "github" => AssetKind::Github,
            "figma" => AssetKind::Figma,
            "notion" => AssetKind::Notion,
            "slack" => AssetKind::Slack,
            "google_drive" | "gdrive" => AssetKind::GoogleDrive,
            "linear" => AssetKind::Linear,
            "jira" => AssetKind::Jira,
            "vercel" => AssetKind::Vercel,
            "link" => AssetKind::Link,
            _ => AssetKind::Other(s.to_string()),
        }
    }

    /// Guess the service from a pasted URL
    pub fn detect(url: &str) -> Self {
        let host = url
            .split("://")
            .nth(1)
            .unwrap_or(url)
            .split('/')
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();

        let matches = |domain: &str| host == domain || host.ends_with(&format!(".{domain}"));
        if matches("github.com") {
            AssetKind::Github
        } else if matches("figma.com") {
            AssetKind::Figma
        } else if matches("notion.so") || matches("notion.site") {
            AssetKind::Notion
        } else if matches("slack.com") {
            AssetKind::Slack
        } else if matches("drive.google.com") || matches("docs.google.com") {
            AssetKind::GoogleDrive
        } else if matches("linear.app") {
            AssetKind::Linear
        } else if matches("atlassian.net") {
            AssetKind::Jira
        } else if matches("vercel.app") || matches("vercel.com") {
            AssetKind::Vercel
        } else {
            AssetKind::Link
        }
    }
}

impl From<AssetKind> for String {
    fn from(kind: AssetKind) -> Self {
        kind.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub id: EntityId,
    pub project_id: EntityId,
    pub name: String,
    pub kind: AssetKind,
    pub url: String,
    /// Last metadata snapshot fetched from the external service
    pub metadata: Map<String, Value>,
    /// False after a sync attempt failed (e.g. remote 404/401)
    pub is_connected: bool,
    pub synced_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Asset {
    pub fn new(id: impl Into<EntityId>, project_id: impl Into<EntityId>, name: impl Into<String>, url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            id: id.into(),
            project_id: project_id.into(),
            name: name.into(),
            kind: AssetKind::detect(&url),
            url,
            metadata: Map::new(),
            is_connected: true,
            synced_at: None,
            created_at: None,
        }
    }
}

impl Entity for Asset {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AssetDraft {
    pub project_id: EntityId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AssetKind,
    pub url: String,
}

impl AssetDraft {
    /// Draft with the kind detected from the URL
    pub fn from_url(project_id: impl Into<EntityId>, name: impl Into<String>, url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            project_id: project_id.into(),
            name: name.into(),
            kind: AssetKind::detect(&url),
            url,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AssetPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<AssetKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_connected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synced_at: Option<DateTime<Utc>>,
}

impl Patchable for Asset {
    type Draft = AssetDraft;
    type Patch = AssetPatch;

    fn apply_patch(&mut self, patch: &AssetPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(kind) = &patch.kind {
            self.kind = kind.clone();
        }
        if let Some(url) = &patch.url {
            self.url = url.clone();
        }
        if let Some(metadata) = &patch.metadata {
            self.metadata = metadata.clone();
        }
        if let Some(is_connected) = patch.is_connected {
            self.is_connected = is_connected;
        }
        if let Some(synced_at) = patch.synced_at {
            self.synced_at = Some(synced_at);
        }
    }
}

/// Result of checking an asset against its external service
#[derive(Debug, Clone, PartialEq)]
pub enum AssetSyncOutcome {
    /// Resource reachable; carries a fresh metadata snapshot
    Connected { metadata: Map<String, Value> },
    /// Resource gone or access revoked (404/401/403)
    Unreachable { status: u16 },
}

impl AssetSyncOutcome {
    /// Patch recording this outcome on the asset
    pub fn to_patch(&self, now: DateTime<Utc>) -> AssetPatch {
        match self {
            AssetSyncOutcome::Connected { metadata } => AssetPatch {
                metadata: Some(metadata.clone()),
                is_connected: Some(true),
                synced_at: Some(now),
                ..Default::default()
            },
            AssetSyncOutcome::Unreachable { .. } => AssetPatch {
                is_connected: Some(false),
                synced_at: Some(now),
                ..Default::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_kind_from_url() {
        assert_eq!(AssetKind::detect("https://github.com/rust-lang/rust"), AssetKind::Github);
        assert_eq!(AssetKind::detect("https://www.figma.com/file/abc"), AssetKind::Figma);
        assert_eq!(AssetKind::detect("https://acme.atlassian.net/browse/X-1"), AssetKind::Jira);
        assert_eq!(AssetKind::detect("https://example.com/github.com"), AssetKind::Link);
        assert_eq!(AssetKind::detect("not a url"), AssetKind::Link);
    }

    #[test]
    fn test_unreachable_outcome_keeps_metadata() {
        let mut asset = Asset::new("a1", "p1", "Repo", "https://github.com/acme/app");
        asset.metadata.insert("stars".into(), Value::from(12));

        asset.apply_patch(&AssetSyncOutcome::Unreachable { status: 404 }.to_patch(Utc::now()));

        assert!(!asset.is_connected);
        assert!(asset.synced_at.is_some());
        assert_eq!(asset.metadata.get("stars"), Some(&Value::from(12)));
    }
}
