//! Wire rows for projects, tasks, notes and assets

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::time::{format_opt, format_timestamp, parse_timestamp};
use super::{to_record, Mapped, WireRecord};
use crate::domain::{
    normalize_tags, Asset, AssetKind, Note, Project, ProjectStatus, SourceRef, Task, TaskPriority,
    TaskStatus,
};

// ========================
// Project
// ========================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectRow {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,
}

impl Mapped for Project {
    const TABLE: &'static str = "projects";
    type Row = ProjectRow;

    fn to_domain(row: ProjectRow) -> Self {
        Project {
            id: row.id,
            title: row.title.unwrap_or_default(),
            description: row.description.unwrap_or_default(),
            status: row.status.as_deref().map(ProjectStatus::parse).unwrap_or_default(),
            // Stored value is only a starting point; the Store recomputes it
            progress: row.progress.map(|p| p.round().clamp(0.0, 100.0) as u8).unwrap_or(0),
            tags: normalize_tags(row.tags.unwrap_or_default()),
            created_at: parse_timestamp(row.created_at.as_deref()),
            updated_at: parse_timestamp(row.updated_at.as_deref()),
            deleted_at: parse_timestamp(row.deleted_at.as_deref()),
        }
    }

    fn to_row(&self) -> ProjectRow {
        ProjectRow {
            id: self.id.clone(),
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            status: Some(self.status.as_str().to_string()),
            progress: Some(f64::from(self.progress)),
            tags: Some(self.tags.clone()),
            created_at: format_opt(&self.created_at),
            updated_at: format_opt(&self.updated_at),
            deleted_at: format_opt(&self.deleted_at),
        }
    }
}

// ========================
// Task
// ========================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskRow {
    pub id: String,
    pub project_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Kept loose: a malformed pointer must not sink the whole row
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

fn parse_source_ref(raw: Option<Value>) -> Option<SourceRef> {
    match raw? {
        Value::Null => None,
        value => match serde_json::from_value(value) {
            Ok(source) => Some(source),
            Err(e) => {
                log::warn!("[MAPPER] Dropping malformed source_ref: {}", e);
                None
            }
        },
    }
}

impl Mapped for Task {
    const TABLE: &'static str = "tasks";
    type Row = TaskRow;

    fn to_domain(row: TaskRow) -> Self {
        Task {
            id: row.id,
            project_id: row.project_id,
            title: row.title.unwrap_or_default(),
            status: row.status.as_deref().map(TaskStatus::parse).unwrap_or_default(),
            priority: row.priority.as_deref().map(TaskPriority::parse).unwrap_or_default(),
            due_date: parse_timestamp(row.due_date.as_deref()),
            source_ref: parse_source_ref(row.source_ref),
            created_at: parse_timestamp(row.created_at.as_deref()),
            updated_at: parse_timestamp(row.updated_at.as_deref()),
        }
    }

    fn to_row(&self) -> TaskRow {
        TaskRow {
            id: self.id.clone(),
            project_id: self.project_id.clone(),
            title: Some(self.title.clone()),
            status: Some(self.status.as_str().to_string()),
            priority: Some(self.priority.as_str().to_string()),
            due_date: format_opt(&self.due_date),
            source_ref: self.source_ref.as_ref().and_then(|s| serde_json::to_value(s).ok()),
            created_at: format_opt(&self.created_at),
            updated_at: format_opt(&self.updated_at),
        }
    }
}

// ========================
// Note
// ========================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteRow {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Mapped for Note {
    const TABLE: &'static str = "notes";
    type Row = NoteRow;

    fn to_domain(row: NoteRow) -> Self {
        Note {
            id: row.id,
            project_id: row.project_id.filter(|id| !id.is_empty()),
            title: row.title.unwrap_or_default(),
            content: row.content.unwrap_or_default(),
            created_at: parse_timestamp(row.created_at.as_deref()),
            updated_at: parse_timestamp(row.updated_at.as_deref()),
        }
    }

    fn to_row(&self) -> NoteRow {
        NoteRow {
            id: self.id.clone(),
            project_id: self.project_id.clone(),
            title: Some(self.title.clone()),
            content: Some(self.content.clone()),
            created_at: format_opt(&self.created_at),
            updated_at: format_opt(&self.updated_at),
        }
    }

    /// Text edits also stamp `updated_at`
    fn patch_to_wire(patch: &Self::Patch) -> WireRecord {
        let mut record = to_record(patch);
        if patch.touches_text() {
            record.insert("updated_at".into(), Value::String(format_timestamp(&chrono::Utc::now())));
        }
        record
    }
}

// ========================
// Asset
// ========================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetRow {
    pub id: String,
    pub project_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_connected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synced_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Mapped for Asset {
    const TABLE: &'static str = "assets";
    type Row = AssetRow;

    fn to_domain(row: AssetRow) -> Self {
        Asset {
            id: row.id,
            project_id: row.project_id,
            name: row.name.unwrap_or_default(),
            kind: row.kind.as_deref().map(AssetKind::parse).unwrap_or_default(),
            url: row.url.unwrap_or_default(),
            metadata: row.metadata.unwrap_or_default(),
            is_connected: row.is_connected.unwrap_or(true),
            synced_at: parse_timestamp(row.synced_at.as_deref()),
            created_at: parse_timestamp(row.created_at.as_deref()),
        }
    }

    fn to_row(&self) -> AssetRow {
        AssetRow {
            id: self.id.clone(),
            project_id: self.project_id.clone(),
            name: Some(self.name.clone()),
            kind: Some(self.kind.as_str().to_string()),
            url: Some(self.url.clone()),
            metadata: Some(self.metadata.clone()),
            is_connected: Some(self.is_connected),
            synced_at: format_opt(&self.synced_at),
            created_at: format_opt(&self.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NotePatch, ProjectDraft, ProjectPatch, TaskPatch};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn round_trip<E: Mapped>(entity: &E) -> E {
        E::from_wire(Value::Object(entity.to_wire())).expect("round trip decode")
    }

    #[test]
    fn test_project_defaults_for_missing_fields() {
        let project = Project::from_wire(json!({ "id": "p1", "title": "Launch" })).unwrap();
        assert_eq!(project.tags, Vec::<String>::new());
        assert_eq!(project.progress, 0);
        assert_eq!(project.status, ProjectStatus::Idea);
        assert_eq!(project.created_at, None);
        assert!(!project.is_deleted());
    }

    #[test]
    fn test_nulls_are_tolerated() {
        let project = Project::from_wire(json!({
            "id": "p1", "title": null, "tags": null, "deleted_at": null, "status": null
        }))
        .unwrap();
        assert_eq!(project.title, "");
        assert!(project.tags.is_empty());
    }

    #[test]
    fn test_unknown_enum_values_pass_through() {
        let task = Task::from_wire(json!({
            "id": "t1", "project_id": "p1", "title": "x", "status": "blocked", "priority": "urgent"
        }))
        .unwrap();
        assert_eq!(task.status, TaskStatus::Other("blocked".into()));
        assert_eq!(task.priority, TaskPriority::Other("urgent".into()));
        assert_eq!(task.to_wire()["status"], json!("blocked"));
    }

    #[test]
    fn test_project_round_trip() {
        let mut project = Project::new("p1", "Launch");
        project.description = "Ship it".into();
        project.status = ProjectStatus::Active;
        project.progress = 67;
        project.tags = vec!["q3".into(), "web".into()];
        project.created_at = Some(Utc.timestamp_millis_opt(1_700_000_000_123).unwrap());
        project.updated_at = Some(Utc.timestamp_millis_opt(1_700_000_100_456).unwrap());

        assert_eq!(round_trip(&project), project);
    }

    #[test]
    fn test_task_round_trip_with_source_ref() {
        let mut task = Task::new("t1", "p1", "Fix login").with_status(TaskStatus::Review);
        task.priority = TaskPriority::Critical;
        task.due_date = Some(Utc.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap());
        task.source_ref = Some(SourceRef {
            provider: "github".into(),
            external_id: "acme/app#42".into(),
            url: Some("https://github.com/acme/app/issues/42".into()),
        });

        assert_eq!(round_trip(&task), task);
    }

    #[test]
    fn test_malformed_source_ref_is_dropped() {
        let task = Task::from_wire(json!({
            "id": "t1", "project_id": "p1", "title": "x", "source_ref": "gh-42"
        }))
        .unwrap();
        assert_eq!(task.source_ref, None);
    }

    #[test]
    fn test_asset_round_trip_and_defaults() {
        let asset = Asset::from_wire(json!({
            "id": "a1", "project_id": "p1", "name": "Designs", "type": "figma",
            "url": "https://figma.com/file/1"
        }))
        .unwrap();
        assert_eq!(asset.kind, AssetKind::Figma);
        assert!(asset.metadata.is_empty());
        assert!(asset.is_connected);

        let mut synced = asset.clone();
        synced.metadata.insert("pages".into(), json!(3));
        synced.is_connected = false;
        assert_eq!(round_trip(&synced), synced);
    }

    #[test]
    fn test_note_round_trip_loose_idea() {
        let note = Note::new("n1", "Idea A", "...");
        let wire = note.to_wire();
        assert!(!wire.contains_key("project_id"));
        assert_eq!(round_trip(&note), note);
    }

    #[test]
    fn test_patch_emits_only_present_fields() {
        let wire = Task::patch_to_wire(&TaskPatch { title: Some("Renamed".into()), ..Default::default() });
        assert_eq!(Value::Object(wire), json!({ "title": "Renamed" }));
    }

    #[test]
    fn test_patch_explicit_clear_is_null() {
        let wire = Task::patch_to_wire(&TaskPatch { due_date: Some(None), ..Default::default() });
        assert_eq!(Value::Object(wire), json!({ "due_date": null }));

        let wire = Project::patch_to_wire(&ProjectPatch { deleted_at: Some(None), ..Default::default() });
        assert_eq!(wire.get("deleted_at"), Some(&Value::Null));
    }

    #[test]
    fn test_draft_never_carries_progress_or_id() {
        let wire = Project::draft_to_wire(&ProjectDraft { title: "New".into(), ..Default::default() });
        assert!(!wire.contains_key("progress"));
        assert!(!wire.contains_key("id"));
        assert_eq!(wire["status"], json!("idea"));
    }

    #[test]
    fn test_note_text_patch_stamps_updated_at() {
        let wire = Note::patch_to_wire(&NotePatch { content: Some("body".into()), ..Default::default() });
        assert!(wire.contains_key("updated_at"));

        let wire = Note::patch_to_wire(&NotePatch { project_id: Some(None), ..Default::default() });
        assert!(!wire.contains_key("updated_at"));
        assert_eq!(wire["project_id"], Value::Null);
    }
}
