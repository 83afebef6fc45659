//! Wire rows for the simple record types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::time::{format_opt, parse_timestamp};
use super::Mapped;
use crate::domain::{
    AutomationRule, CodeSnippet, Resource, Stakeholder, Transaction, TransactionKind, Whiteboard,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StakeholderRow {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Mapped for Stakeholder {
    const TABLE: &'static str = "stakeholders";
    type Row = StakeholderRow;

    fn to_domain(row: StakeholderRow) -> Self {
        Stakeholder {
            id: row.id,
            project_id: row.project_id,
            name: row.name.unwrap_or_default(),
            role: row.role.unwrap_or_default(),
            email: row.email,
            notes: row.notes.unwrap_or_default(),
            created_at: parse_timestamp(row.created_at.as_deref()),
        }
    }

    fn to_row(&self) -> StakeholderRow {
        StakeholderRow {
            id: self.id.clone(),
            project_id: self.project_id.clone(),
            name: Some(self.name.clone()),
            role: Some(self.role.clone()),
            email: self.email.clone(),
            notes: Some(self.notes.clone()),
            created_at: format_opt(&self.created_at),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceRow {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Mapped for Resource {
    const TABLE: &'static str = "resources";
    type Row = ResourceRow;

    fn to_domain(row: ResourceRow) -> Self {
        Resource {
            id: row.id,
            project_id: row.project_id,
            title: row.title.unwrap_or_default(),
            url: row.url,
            category: row.category.unwrap_or_default(),
            created_at: parse_timestamp(row.created_at.as_deref()),
        }
    }

    fn to_row(&self) -> ResourceRow {
        ResourceRow {
            id: self.id.clone(),
            project_id: self.project_id.clone(),
            title: Some(self.title.clone()),
            url: self.url.clone(),
            category: Some(self.category.clone()),
            created_at: format_opt(&self.created_at),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomationRuleRow {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_run_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Mapped for AutomationRule {
    const TABLE: &'static str = "automations";
    type Row = AutomationRuleRow;

    fn to_domain(row: AutomationRuleRow) -> Self {
        AutomationRule {
            id: row.id,
            project_id: row.project_id,
            name: row.name.unwrap_or_default(),
            trigger: row.trigger.unwrap_or_default(),
            action: row.action.unwrap_or_default(),
            enabled: row.enabled.unwrap_or(true),
            last_run_at: parse_timestamp(row.last_run_at.as_deref()),
            created_at: parse_timestamp(row.created_at.as_deref()),
        }
    }

    fn to_row(&self) -> AutomationRuleRow {
        AutomationRuleRow {
            id: self.id.clone(),
            project_id: self.project_id.clone(),
            name: Some(self.name.clone()),
            trigger: Some(self.trigger.clone()),
            action: Some(self.action.clone()),
            enabled: Some(self.enabled),
            last_run_at: format_opt(&self.last_run_at),
            created_at: format_opt(&self.created_at),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionRow {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Postgres `numeric` may arrive as a number or a string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Value>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurred_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

fn parse_amount(raw: Option<Value>) -> f64 {
    match raw {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or_else(|_| {
            log::warn!("[MAPPER] Unparseable amount {:?}", s);
            0.0
        }),
        _ => 0.0,
    }
}

impl Mapped for Transaction {
    const TABLE: &'static str = "transactions";
    type Row = TransactionRow;

    fn to_domain(row: TransactionRow) -> Self {
        Transaction {
            id: row.id,
            project_id: row.project_id,
            description: row.description.unwrap_or_default(),
            amount: parse_amount(row.amount),
            kind: row.kind.as_deref().map(TransactionKind::parse).unwrap_or_default(),
            category: row.category,
            occurred_at: parse_timestamp(row.occurred_at.as_deref()),
            created_at: parse_timestamp(row.created_at.as_deref()),
        }
    }

    fn to_row(&self) -> TransactionRow {
        TransactionRow {
            id: self.id.clone(),
            project_id: self.project_id.clone(),
            description: Some(self.description.clone()),
            amount: serde_json::Number::from_f64(self.amount).map(Value::Number),
            kind: Some(self.kind.as_str().to_string()),
            category: self.category.clone(),
            occurred_at: format_opt(&self.occurred_at),
            created_at: format_opt(&self.created_at),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WhiteboardRow {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elements: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Mapped for Whiteboard {
    const TABLE: &'static str = "whiteboards";
    type Row = WhiteboardRow;

    fn to_domain(row: WhiteboardRow) -> Self {
        Whiteboard {
            id: row.id,
            project_id: row.project_id,
            title: row.title.unwrap_or_default(),
            elements: row.elements.unwrap_or_else(|| Value::Array(Vec::new())),
            created_at: parse_timestamp(row.created_at.as_deref()),
            updated_at: parse_timestamp(row.updated_at.as_deref()),
        }
    }

    fn to_row(&self) -> WhiteboardRow {
        WhiteboardRow {
            id: self.id.clone(),
            project_id: self.project_id.clone(),
            title: Some(self.title.clone()),
            elements: Some(self.elements.clone()),
            created_at: format_opt(&self.created_at),
            updated_at: format_opt(&self.updated_at),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeSnippetRow {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Mapped for CodeSnippet {
    const TABLE: &'static str = "snippets";
    type Row = CodeSnippetRow;

    fn to_domain(row: CodeSnippetRow) -> Self {
        CodeSnippet {
            id: row.id,
            project_id: row.project_id,
            title: row.title.unwrap_or_default(),
            language: row.language.unwrap_or_else(|| "text".to_string()),
            code: row.code.unwrap_or_default(),
            created_at: parse_timestamp(row.created_at.as_deref()),
            updated_at: parse_timestamp(row.updated_at.as_deref()),
        }
    }

    fn to_row(&self) -> CodeSnippetRow {
        CodeSnippetRow {
            id: self.id.clone(),
            project_id: self.project_id.clone(),
            title: Some(self.title.clone()),
            language: Some(self.language.clone()),
            code: Some(self.code.clone()),
            created_at: format_opt(&self.created_at),
            updated_at: format_opt(&self.updated_at),
        }
    }
}
