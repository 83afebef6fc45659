//! Note Entity
//!
//! A note without a project is a loose idea; with one it is a project note.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::entity::{Entity, EntityId, Patchable};

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: EntityId,
    pub project_id: Option<EntityId>,
    pub title: String,
    pub content: String,
    pub created_at: Option<DateTime<Utc>>,
    /// Bumped on every title/content edit
    pub updated_at: Option<DateTime<Utc>>,
}

impl Note {
    pub fn new(id: impl Into<EntityId>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            project_id: None,
            title: title.into(),
            content: content.into(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Loose idea (not attached to any project)
    pub fn is_idea(&self) -> bool {
        self.project_id.is_none()
    }
}

impl Entity for Note {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NoteDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<EntityId>,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NotePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Option<EntityId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl NotePatch {
    pub fn touches_text(&self) -> bool {
        self.title.is_some() || self.content.is_some()
    }
}

impl Patchable for Note {
    type Draft = NoteDraft;
    type Patch = NotePatch;

    fn apply_patch(&mut self, patch: &NotePatch) {
        if let Some(project_id) = &patch.project_id {
            self.project_id = project_id.clone();
        }
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
        if patch.touches_text() {
            self.updated_at = Some(Utc::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_edit_bumps_updated_at() {
        let mut note = Note::new("n1", "Idea A", "...");
        assert!(note.updated_at.is_none());

        note.apply_patch(&NotePatch { content: Some("more".into()), ..Default::default() });

        assert_eq!(note.content, "more");
        assert!(note.updated_at.is_some());
    }

    #[test]
    fn test_attaching_to_project_keeps_updated_at() {
        let mut note = Note::new("n1", "Idea A", "...");
        note.apply_patch(&NotePatch { project_id: Some(Some("p1".into())), ..Default::default() });

        assert!(!note.is_idea());
        assert!(note.updated_at.is_none());
    }
}
