//! OpenAI-compatible adapter for natural-language to SQL translation.
//!
//! Supports OpenAI API, Azure OpenAI, and local Ollama instances.
//! Implements `QueryTranslatorPort` with markdown stripping and SQL line extraction.

use crate::domain::DomainError;
use crate::ports::QueryTranslatorPort;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Statement keywords a cleaned answer may start with.
const SQL_KEYWORDS: [&str; 6] = ["select", "with", "insert", "update", "delete", "create"];

/// OpenAI-compatible SQL translator.
///
/// Can be configured to work with:
/// - OpenAI API (api.openai.com)
/// - Azure OpenAI
/// - Ollama (localhost)
/// - Any OpenAI-compatible API
pub struct OpenAiTranslator {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    /// `COL : DESCRIPTION` notes appended to the system prompt.
    column_notes: String,
}

impl OpenAiTranslator {
    /// Create a new translator.
    ///
    /// # Arguments
    /// * `api_url` - API endpoint (e.g., "https://api.openai.com/v1/chat/completions")
    /// * `api_key` - API key (can be empty for local Ollama)
    /// * `model` - Model name (e.g., "gpt-4o-mini", "llama3.2")
    /// * `column_notes` - Per-column descriptions of the HR table
    pub fn new(api_url: String, api_key: String, model: String, column_notes: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            model,
            column_notes,
        }
    }

    /// Build the system prompt for the given schema.
    fn system_prompt(&self, schema_text: &str) -> String {
        format!(
            r#"You are a data assistant working with SQL.
Use this schema:
{schema}

When you write a WHERE clause use UPPER() on the column and upper-case letters in the condition.
Write the query on a single line and do not end it with a semicolon.
Always return only a valid SQL query.
Do NOT include explanations, comments, or markdown.

Column details:
{notes}"#,
            schema = schema_text,
            notes = self.column_notes
        )
    }

    /// Reduce an LLM answer to the SQL statement it contains.
    ///
    /// Strips markdown fences, keeps lines from the first one that starts with a
    /// statement keyword (blank lines dropped), and removes a trailing `;`.
    /// Without any such line the fence-stripped text is returned.
    fn clean_sql(raw: &str) -> String {
        let unfenced = raw.trim().replace("```sql", "").replace("```", "");
        let unfenced = unfenced.trim();

        let mut lines = Vec::new();
        let mut capture = false;
        for line in unfenced.lines() {
            let line = line.trim();
            let lower = line.to_lowercase();
            if !capture && SQL_KEYWORDS.iter().any(|k| lower.starts_with(k)) {
                capture = true;
            }
            if capture && !line.is_empty() {
                lines.push(line);
            }
        }

        if lines.is_empty() {
            return unfenced.to_string();
        }
        lines
            .join("\n")
            .trim()
            .trim_end_matches(';')
            .trim_end()
            .to_string()
    }
}

/// OpenAI API request structure.
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// OpenAI API response structure.
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait::async_trait]
impl QueryTranslatorPort for OpenAiTranslator {
    async fn to_sql(&self, prompt: &str, schema_text: &str) -> Result<String, DomainError> {
        info!(
            prompt_len = prompt.len(),
            model = %self.model,
            "sending question to AI for SQL translation"
        );

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: self.system_prompt(schema_text),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: 0.0,
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::Translator(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %text, "AI API returned error");
            return Err(DomainError::Translator(format!(
                "API error {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Translator(format!("Failed to parse API response: {}", e)))?;

        let raw_content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| DomainError::Translator("No response choices returned".to_string()))?;

        debug!(raw_len = raw_content.len(), "received AI response");

        let sql = Self::clean_sql(&raw_content);
        info!(sql = %sql, "cleaned SQL to execute");
        Ok(sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_sql_plain() {
        let input = "SELECT * FROM HR_DATASET";
        assert_eq!(OpenAiTranslator::clean_sql(input), input);
    }

    #[test]
    fn test_clean_sql_markdown_and_semicolon() {
        let input = "```sql\nSELECT DEPARTMENT, SUM(SALARY) FROM HR_DATASET GROUP BY DEPARTMENT;\n```";
        assert_eq!(
            OpenAiTranslator::clean_sql(input),
            "SELECT DEPARTMENT, SUM(SALARY) FROM HR_DATASET GROUP BY DEPARTMENT"
        );
    }

    #[test]
    fn test_clean_sql_drops_preamble_and_blank_lines() {
        let input = "Here is the query:\n\n  with t as (select 1 as x)\n\n  select x from t;";
        assert_eq!(
            OpenAiTranslator::clean_sql(input),
            "with t as (select 1 as x)\nselect x from t"
        );
    }

    #[test]
    fn test_clean_sql_without_statement_returns_text() {
        let input = "```\nI cannot answer that.\n```";
        assert_eq!(OpenAiTranslator::clean_sql(input), "I cannot answer that.");
    }

    #[test]
    fn test_system_prompt_embeds_schema_and_notes() {
        let t = OpenAiTranslator::new(
            "http://localhost".into(),
            String::new(),
            "gpt-4o-mini".into(),
            "SALARY : CURRENT SALARY".into(),
        );
        let prompt = t.system_prompt("HR_DATASET(\n    SALARY NUMBER\n)");
        assert!(prompt.contains("HR_DATASET("));
        assert!(prompt.contains("SALARY : CURRENT SALARY"));
    }
}
