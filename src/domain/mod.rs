//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! No I/O here; only serde for the input types sent to the backend.

mod entity;
mod project;
mod task;
mod note;
mod asset;
mod records;
pub mod progress;

pub use entity::{Entity, EntityId, Patchable, DomainError, DomainResult};
pub use project::{Project, ProjectStatus, ProjectDraft, ProjectPatch, normalize_tags};
pub use task::{Task, TaskStatus, TaskPriority, TaskDraft, TaskPatch, SourceRef};
pub use note::{Note, NoteDraft, NotePatch};
pub use asset::{Asset, AssetKind, AssetDraft, AssetPatch, AssetSyncOutcome};
pub use records::{
    Stakeholder, StakeholderDraft, StakeholderPatch,
    Resource, ResourceDraft, ResourcePatch,
    AutomationRule, AutomationRuleDraft, AutomationRulePatch,
    Transaction, TransactionKind, TransactionDraft, TransactionPatch,
    Whiteboard, WhiteboardDraft, WhiteboardPatch,
    CodeSnippet, CodeSnippetDraft, CodeSnippetPatch,
};
