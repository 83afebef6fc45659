//! AI assistant
//!
//! Plan generation and subtask suggestions on top of a text-generation
//! service. Best effort: failures come back as an inline message in place
//! of the result, never as an error.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::domain::{DomainError, DomainResult, Project};
use crate::gateway::error_from_response;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const NOT_CONFIGURED: &str = "AI assistant is not configured. Add an API key in Settings.";

/// Prompt in, text out
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> DomainResult<String>;
}

// ========================
// Gemini client
// ========================

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .map(|part| part.text)
            .collect();
        Some(text).filter(|t| !t.trim().is_empty())
    }
}

/// Google Gemini `generateContent`
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn url(&self) -> String {
        format!("{}/{}:generateContent", GEMINI_ENDPOINT, self.model)
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> DomainResult<String> {
        let body = GenerateRequest {
            contents: vec![Content { parts: vec![RequestPart { text: prompt }] }],
        };
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(error_from_response(status.as_u16(), &text));
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| DomainError::Decode(e.to_string()))?;
        parsed
            .into_text()
            .ok_or_else(|| DomainError::Decode("model returned no text".into()))
    }
}

// ========================
// Assistant
// ========================

#[derive(Clone, Default)]
pub struct Assistant {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl Assistant {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator: Some(generator) }
    }

    /// Gemini when an AI key is set, otherwise a disabled assistant
    pub fn from_settings(settings: &Settings) -> Self {
        match settings.ai_key() {
            Some(key) => Self::new(Arc::new(GeminiClient::new(key))),
            None => Self::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.generator.is_some()
    }

    async fn ask(&self, prompt: &str) -> Result<String, String> {
        let generator = self.generator.as_ref().ok_or_else(|| NOT_CONFIGURED.to_string())?;
        generator.generate(prompt).await.map_err(|e| {
            log::warn!("[AI] Generation failed: {}", e);
            format!("AI request failed: {}", e)
        })
    }

    /// Project plan as free text, or the error message
    pub async fn generate_plan(&self, project: &Project) -> String {
        let mut prompt = format!("Write a short, actionable project plan for \"{}\".", project.title);
        if !project.description.trim().is_empty() {
            prompt.push_str(&format!("\nContext: {}", project.description.trim()));
        }
        self.ask(&prompt).await.unwrap_or_else(|message| message)
    }

    /// Subtask titles for a task; on failure a single entry holding the
    /// error message
    pub async fn suggest_subtasks(&self, task_title: &str) -> Vec<String> {
        let prompt = format!(
            "List 3 to 6 concrete subtasks for the task \"{}\". One per line, as a bulleted list, no extra text.",
            task_title
        );
        match self.ask(&prompt).await {
            Ok(text) => {
                let items = parse_list(&text);
                if items.is_empty() {
                    vec![text.trim().to_string()]
                } else {
                    items
                }
            }
            Err(message) => vec![message],
        }
    }
}

/// Items of a bulleted or numbered list; other lines are dropped
pub fn parse_list(text: &str) -> Vec<String> {
    text.lines().filter_map(list_item).collect()
}

fn list_item(line: &str) -> Option<String> {
    let line = line.trim();
    let rest = if let Some(rest) = line.strip_prefix(['-', '*', '•']) {
        rest
    } else {
        let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        if digits == 0 {
            return None;
        }
        line[digits..].strip_prefix(['.', ')'])?
    };

    let item = rest.trim().trim_matches('*').trim();
    (!item.is_empty()).then(|| item.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Canned(DomainResult<String>);

    #[async_trait]
    impl TextGenerator for Canned {
        async fn generate(&self, _prompt: &str) -> DomainResult<String> {
            self.0.clone()
        }
    }

    fn assistant(reply: DomainResult<String>) -> Assistant {
        Assistant::new(Arc::new(Canned(reply)))
    }

    #[test]
    fn test_parse_list() {
        let text = "Here you go:\n- Draft outline\n* **Collect assets**\n1. Review copy\n2) Publish\n\n-   \n2024 was a year";
        assert_eq!(parse_list(text), vec!["Draft outline", "Collect assets", "Review copy", "Publish"]);
    }

    #[test]
    fn test_response_text_extraction() {
        let response: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "Step 1" }, { "text": ", step 2" }] } }]
        }))
        .unwrap();
        assert_eq!(response.into_text().as_deref(), Some("Step 1, step 2"));

        let empty: GenerateResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(empty.into_text(), None);
    }

    #[tokio::test]
    async fn test_suggest_subtasks() {
        let subtasks = assistant(Ok("- Buy domain\n- Set up DNS".into())).suggest_subtasks("Launch site").await;
        assert_eq!(subtasks, vec!["Buy domain", "Set up DNS"]);
    }

    #[tokio::test]
    async fn test_failures_become_inline_messages() {
        let failing = assistant(Err(DomainError::Network("timeout".into())));
        let plan = failing.generate_plan(&Project::new("p1", "Launch")).await;
        assert!(plan.starts_with("AI request failed"));

        let subtasks = failing.suggest_subtasks("Ship").await;
        assert_eq!(subtasks.len(), 1);
        assert!(subtasks[0].contains("timeout"));
    }

    #[tokio::test]
    async fn test_disabled_assistant() {
        let assistant = Assistant::from_settings(&Settings::default());
        assert!(!assistant.is_enabled());
        assert_eq!(assistant.generate_plan(&Project::new("p1", "Launch")).await, NOT_CONFIGURED);
        assert_eq!(assistant.suggest_subtasks("Ship").await, vec![NOT_CONFIGURED.to_string()]);
    }
}
