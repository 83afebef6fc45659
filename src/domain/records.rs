//! Simple Records
//!
//! Stakeholders, resources, automation rules, transactions, whiteboards and
//! code snippets. Each is CRUD'd on its own; the only link is an optional
//! project id.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::entity::{Entity, EntityId, Patchable};

// ========================
// Stakeholder (CRM)
// ========================

#[derive(Debug, Clone, PartialEq)]
pub struct Stakeholder {
    pub id: EntityId,
    pub project_id: Option<EntityId>,
    pub name: String,
    pub role: String,
    pub email: Option<String>,
    pub notes: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StakeholderDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<EntityId>,
    pub name: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub notes: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StakeholderPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Entity for Stakeholder {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Patchable for Stakeholder {
    type Draft = StakeholderDraft;
    type Patch = StakeholderPatch;

    fn apply_patch(&mut self, patch: &StakeholderPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(role) = &patch.role {
            self.role = role.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(notes) = &patch.notes {
            self.notes = notes.clone();
        }
    }
}

// ========================
// Resource (reading list, links, docs)
// ========================

#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub id: EntityId,
    pub project_id: Option<EntityId>,
    pub title: String,
    pub url: Option<String>,
    pub category: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResourceDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<EntityId>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub category: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResourcePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Entity for Resource {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Patchable for Resource {
    type Draft = ResourceDraft;
    type Patch = ResourcePatch;

    fn apply_patch(&mut self, patch: &ResourcePatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(url) = &patch.url {
            self.url = url.clone();
        }
        if let Some(category) = &patch.category {
            self.category = category.clone();
        }
    }
}

// ========================
// Automation rule
// ========================

#[derive(Debug, Clone, PartialEq)]
pub struct AutomationRule {
    pub id: EntityId,
    pub project_id: Option<EntityId>,
    pub name: String,
    /// Event that fires the rule, e.g. "task.done"
    pub trigger: String,
    /// What happens, e.g. "notify:slack"
    pub action: String,
    pub enabled: bool,
    pub last_run_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AutomationRuleDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<EntityId>,
    pub name: String,
    pub trigger: String,
    pub action: String,
    pub enabled: bool,
}

impl Default for AutomationRuleDraft {
    fn default() -> Self {
        Self {
            project_id: None,
            name: String::new(),
            trigger: String::new(),
            action: String::new(),
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AutomationRulePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl Entity for AutomationRule {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Patchable for AutomationRule {
    type Draft = AutomationRuleDraft;
    type Patch = AutomationRulePatch;

    fn apply_patch(&mut self, patch: &AutomationRulePatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(trigger) = &patch.trigger {
            self.trigger = trigger.clone();
        }
        if let Some(action) = &patch.action {
            self.action = action.clone();
        }
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
    }
}

// ========================
// Financial transaction
// ========================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(into = "String")]
pub enum TransactionKind {
    Income,
    #[default]
    Expense,
    Other(String),
}

impl TransactionKind {
    pub fn as_str(&self) -> &str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
            TransactionKind::Other(raw) => raw,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "income" => TransactionKind::Income,
            "expense" => TransactionKind::Expense,
            _ => TransactionKind::Other(s.to_string()),
        }
    }
}

impl From<TransactionKind> for String {
    fn from(kind: TransactionKind) -> Self {
        kind.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: EntityId,
    pub project_id: Option<EntityId>,
    pub description: String,
    /// Always non-negative; `kind` carries the direction
    pub amount: f64,
    pub kind: TransactionKind,
    pub category: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TransactionDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<EntityId>,
    pub description: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurred_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TransactionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurred_at: Option<Option<DateTime<Utc>>>,
}

impl Entity for Transaction {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Patchable for Transaction {
    type Draft = TransactionDraft;
    type Patch = TransactionPatch;

    fn apply_patch(&mut self, patch: &TransactionPatch) {
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(kind) = &patch.kind {
            self.kind = kind.clone();
        }
        if let Some(category) = &patch.category {
            self.category = category.clone();
        }
        if let Some(occurred_at) = patch.occurred_at {
            self.occurred_at = occurred_at;
        }
    }
}

// ========================
// Whiteboard
// ========================

#[derive(Debug, Clone, PartialEq)]
pub struct Whiteboard {
    pub id: EntityId,
    pub project_id: Option<EntityId>,
    pub title: String,
    /// Opaque scene document owned by the board renderer
    pub elements: Value,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct WhiteboardDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<EntityId>,
    pub title: String,
    pub elements: Value,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct WhiteboardPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elements: Option<Value>,
}

impl Entity for Whiteboard {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Patchable for Whiteboard {
    type Draft = WhiteboardDraft;
    type Patch = WhiteboardPatch;

    fn apply_patch(&mut self, patch: &WhiteboardPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(elements) = &patch.elements {
            self.elements = elements.clone();
            self.updated_at = Some(Utc::now());
        }
    }
}

// ========================
// Code snippet
// ========================

#[derive(Debug, Clone, PartialEq)]
pub struct CodeSnippet {
    pub id: EntityId,
    pub project_id: Option<EntityId>,
    pub title: String,
    pub language: String,
    pub code: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CodeSnippetDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<EntityId>,
    pub title: String,
    pub language: String,
    pub code: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CodeSnippetPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Entity for CodeSnippet {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Patchable for CodeSnippet {
    type Draft = CodeSnippetDraft;
    type Patch = CodeSnippetPatch;

    fn apply_patch(&mut self, patch: &CodeSnippetPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(language) = &patch.language {
            self.language = language.clone();
        }
        if let Some(code) = &patch.code {
            self.code = code.clone();
        }
    }
}
