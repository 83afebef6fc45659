//! Project Entity
//!
//! Projects own their tasks; `progress` is derived from them and is never
//! accepted as input on create or update.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::entity::{Entity, EntityId, Patchable};

/// Lifecycle stage of a project
///
/// Unknown wire values are kept verbatim in `Other` so a newer backend never
/// breaks an older client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(into = "String")]
pub enum ProjectStatus {
    #[default]
    Idea,
    Active,
    Paused,
    Completed,
    Archived,
    Other(String),
}

impl ProjectStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ProjectStatus::Idea => "idea",
            ProjectStatus::Active => "active",
            ProjectStatus::Paused => "paused",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Archived => "archived",
            ProjectStatus::Other(raw) => raw,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "idea" => ProjectStatus::Idea,
            "active" => ProjectStatus::Active,
            "paused" => ProjectStatus::Paused,
            "completed" => ProjectStatus::Completed,
            "archived" => ProjectStatus::Archived,
            _ => ProjectStatus::Other(s.to_string()),
        }
    }
}

impl From<ProjectStatus> for String {
    fn from(status: ProjectStatus) -> Self {
        status.as_str().to_string()
    }
}

/// A project with tasks, notes and assets hanging off it
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    pub status: ProjectStatus,
    /// Percentage of Done tasks (0-100), recomputed by the Store
    pub progress: u8,
    /// Ordered set: insertion order kept, duplicates dropped
    pub tags: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Soft-delete marker
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Project {
    pub fn new(id: impl Into<EntityId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            status: ProjectStatus::default(),
            progress: 0,
            tags: Vec::new(),
            created_at: None,
            updated_at: None,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl Entity for Project {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Fields chosen when creating a project
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectDraft {
    pub title: String,
    pub description: String,
    pub status: ProjectStatus,
    pub tags: Vec<String>,
}

/// Sparse project update
///
/// `deleted_at: Some(None)` clears the soft-delete marker.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<Option<DateTime<Utc>>>,
}

impl Patchable for Project {
    type Draft = ProjectDraft;
    type Patch = ProjectPatch;

    fn apply_patch(&mut self, patch: &ProjectPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(status) = &patch.status {
            self.status = status.clone();
        }
        if let Some(tags) = &patch.tags {
            self.tags = normalize_tags(tags.iter().cloned());
        }
        if let Some(deleted_at) = patch.deleted_at {
            self.deleted_at = deleted_at;
        }
    }
}

/// Trim, drop empties and duplicates, keep first-seen order
pub fn normalize_tags(tags: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing_keeps_unknown_values() {
        assert_eq!(ProjectStatus::parse("active"), ProjectStatus::Active);
        assert_eq!(ProjectStatus::parse("Paused"), ProjectStatus::Paused);
        assert_eq!(ProjectStatus::parse("incubating"), ProjectStatus::Other("incubating".into()));
        assert_eq!(ProjectStatus::Other("incubating".into()).as_str(), "incubating");
    }

    #[test]
    fn test_normalize_tags() {
        let tags = normalize_tags(vec![" rust ".into(), "web".into(), "rust".into(), "".into()]);
        assert_eq!(tags, vec!["rust".to_string(), "web".to_string()]);
    }

    #[test]
    fn test_patch_only_touches_present_fields() {
        let mut project = Project::new("p1", "Launch");
        project.description = "Ship v1".into();

        project.apply_patch(&ProjectPatch {
            status: Some(ProjectStatus::Active),
            ..Default::default()
        });

        assert_eq!(project.title, "Launch");
        assert_eq!(project.description, "Ship v1");
        assert_eq!(project.status, ProjectStatus::Active);
        assert!(!project.is_deleted());
    }

    #[test]
    fn test_patch_can_clear_soft_delete() {
        let mut project = Project::new("p1", "Launch");
        project.apply_patch(&ProjectPatch { deleted_at: Some(Some(Utc::now())), ..Default::default() });
        assert!(project.is_deleted());

        project.apply_patch(&ProjectPatch { deleted_at: Some(None), ..Default::default() });
        assert!(!project.is_deleted());
    }
}
