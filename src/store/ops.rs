//! Entity-specific store operations built on `add` / `update` / `remove`

use chrono::Utc;

use super::{ClientStore, MutationReceipt};
use crate::domain::{
    Asset, AssetSyncOutcome, DomainError, DomainResult, Note, Project, ProjectDraft, ProjectPatch, ProjectStatus,
    Task, TaskPatch, TaskStatus, Transaction,
};
use crate::financials::{self, FinancialSummary};
use crate::gateway::AssetProbe;
use crate::kanban::{self, KanbanColumn};
use crate::search::{self, SearchCorpus, SearchHit};

impl ClientStore {
    // ========================
    // Projects
    // ========================

    /// Default listing: projects without a deletion mark
    pub fn active_projects(&self) -> Vec<Project> {
        self.all::<Project>().into_iter().filter(|p| !p.is_deleted()).collect()
    }

    pub fn deleted_projects(&self) -> Vec<Project> {
        self.all::<Project>().into_iter().filter(Project::is_deleted).collect()
    }

    /// Mark a project deleted. Its tasks, notes and assets are left alone.
    pub async fn soft_delete_project(&self, id: &str) -> DomainResult<MutationReceipt> {
        let patch = ProjectPatch { deleted_at: Some(Some(Utc::now())), ..Default::default() };
        self.update::<Project>(id, patch).await
    }

    pub async fn restore_project(&self, id: &str) -> DomainResult<MutationReceipt> {
        let patch = ProjectPatch { deleted_at: Some(None), ..Default::default() };
        self.update::<Project>(id, patch).await
    }

    /// New project seeded from a note; the note itself is kept as is
    pub async fn promote_note_to_project(&self, note_id: &str) -> DomainResult<Project> {
        let note = self
            .get::<Note>(note_id)
            .ok_or_else(|| DomainError::NotFound(format!("note {}", note_id)))?;

        let draft = ProjectDraft {
            title: note.title.clone(),
            description: note.content.clone(),
            status: ProjectStatus::Idea,
            tags: Vec::new(),
        };
        let project = self.add::<Project>(draft).await?;
        log::info!("[STORE] Promoted note {} to project {}", note.id, project.id);
        Ok(project)
    }

    // ========================
    // Tasks
    // ========================

    pub fn tasks_for_project(&self, project_id: &str) -> Vec<Task> {
        self.all::<Task>().into_iter().filter(|t| t.project_id == project_id).collect()
    }

    /// Kanban move
    pub async fn set_task_status(&self, task_id: &str, status: TaskStatus) -> DomainResult<MutationReceipt> {
        self.update::<Task>(task_id, TaskPatch::status(status)).await
    }

    /// Checkbox: done <-> todo
    pub async fn toggle_task(&self, task_id: &str) -> DomainResult<MutationReceipt> {
        let task = self
            .get::<Task>(task_id)
            .ok_or_else(|| DomainError::NotFound(format!("task {}", task_id)))?;
        let next = if task.status.is_done() { TaskStatus::Todo } else { TaskStatus::Done };
        self.set_task_status(task_id, next).await
    }

    // ========================
    // Notes and assets
    // ========================

    pub fn notes_for_project(&self, project_id: &str) -> Vec<Note> {
        self.all::<Note>()
            .into_iter()
            .filter(|n| n.project_id.as_deref() == Some(project_id))
            .collect()
    }

    /// Notes not attached to any project
    pub fn ideas(&self) -> Vec<Note> {
        self.all::<Note>().into_iter().filter(Note::is_idea).collect()
    }

    pub fn assets_for_project(&self, project_id: &str) -> Vec<Asset> {
        self.all::<Asset>().into_iter().filter(|a| a.project_id == project_id).collect()
    }

    /// Record the result of checking an asset's external link
    pub async fn apply_asset_sync(&self, asset_id: &str, outcome: AssetSyncOutcome) -> DomainResult<MutationReceipt> {
        if let AssetSyncOutcome::Unreachable { status } = &outcome {
            log::info!("[STORE] Asset {} unreachable (HTTP {})", asset_id, status);
        }
        self.update::<Asset>(asset_id, outcome.to_patch(Utc::now())).await
    }

    /// Probe the asset's link and record the outcome. A probe that could not
    /// run leaves the asset untouched.
    pub async fn sync_asset(&self, asset_id: &str, probe: &dyn AssetProbe) -> DomainResult<MutationReceipt> {
        let asset = self
            .get::<Asset>(asset_id)
            .ok_or_else(|| DomainError::NotFound(format!("asset {}", asset_id)))?;
        let outcome = probe.probe(&asset).await?;
        self.apply_asset_sync(asset_id, outcome).await
    }

    // ========================
    // Derived views
    // ========================

    /// Spotlight results over the current collections
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let (projects, assets) = (self.all::<Project>(), self.all::<Asset>());
        let (tasks, notes) = (self.all::<Task>(), self.all::<Note>());
        let corpus = SearchCorpus { projects: &projects, assets: &assets, tasks: &tasks, notes: &notes };
        search::search(query, &corpus)
    }

    pub fn kanban(&self, project_id: Option<&str>) -> Vec<KanbanColumn> {
        kanban::columns(&self.all::<Task>(), project_id)
    }

    pub fn financial_summary(&self, project_id: Option<&str>) -> FinancialSummary {
        financials::summarize(&self.all::<Transaction>(), project_id)
    }
}
