//! Application configuration. API credentials, SMTP settings, paths.

use crate::shared::schema::TableSchema;
use serde::Deserialize;

/// Default HR table queried by the assistant.
pub const DEFAULT_TABLE_NAME: &str = "HR_DATASET";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Directory for the SQLite database and generated reports. Read from HR_ASSIST_DATA_DIR.
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Table holding the HR dataset. Read from HR_ASSIST_TABLE_NAME.
    #[serde(default)]
    pub table_name: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Query translator (LLM) configuration
    // ─────────────────────────────────────────────────────────────────────────
    /// AI API key (e.g., OpenAI). Read from HR_ASSIST_AI_API_KEY.
    #[serde(default)]
    pub ai_api_key: Option<String>,

    /// AI API URL. Defaults to OpenAI. Read from HR_ASSIST_AI_API_URL.
    #[serde(default)]
    pub ai_api_url: Option<String>,

    /// AI model name. Defaults to "gpt-4o-mini". Read from HR_ASSIST_AI_MODEL.
    #[serde(default)]
    pub ai_model: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Mail (SMTP) configuration
    // ─────────────────────────────────────────────────────────────────────────
    /// SMTP relay host. Read from HR_ASSIST_SMTP_SERVER.
    #[serde(default)]
    pub smtp_server: Option<String>,

    /// SMTP port (STARTTLS). Read from HR_ASSIST_SMTP_PORT.
    #[serde(default)]
    pub smtp_port: Option<u16>,

    /// Sender address, also used as the SMTP login. Read from HR_ASSIST_SENDER_EMAIL.
    #[serde(default)]
    pub sender_email: Option<String>,

    /// SMTP password (app password for Gmail). Read from HR_ASSIST_SENDER_PASSWORD.
    #[serde(default)]
    pub sender_password: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("HR_ASSIST"));
        if let Ok(path) = std::env::var("HR_ASSIST_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        let mut cfg: Self = c.build()?.try_deserialize()?;
        // SMTP_PORT is read directly too so an existing .env with SMTP_PORT=587 works
        if cfg.smtp_port.is_none() {
            if let Ok(s) = std::env::var("SMTP_PORT") {
                if let Ok(port) = s.parse::<u16>() {
                    cfg.smtp_port = Some(port);
                }
            }
        }
        Ok(cfg)
    }

    /// Returns the data directory. Defaults to "./data".
    pub fn data_dir_or_default(&self) -> String {
        self.data_dir.clone().unwrap_or_else(|| "./data".to_string())
    }

    /// Returns the HR table name. Defaults to DEFAULT_TABLE_NAME.
    pub fn table_name_or_default(&self) -> String {
        self.table_name
            .clone()
            .unwrap_or_else(|| DEFAULT_TABLE_NAME.to_string())
    }

    /// Schema of the configured HR table.
    pub fn schema(&self) -> TableSchema {
        TableSchema::hr_dataset(self.table_name_or_default())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // AI Configuration Helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the AI API key if configured. Reads from config or HR_ASSIST_AI_API_KEY env.
    pub fn ai_api_key(&self) -> Option<String> {
        self.ai_api_key
            .clone()
            .or_else(|| std::env::var("HR_ASSIST_AI_API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
    }

    /// Returns the AI API URL. Defaults to OpenAI chat completions endpoint.
    pub fn ai_api_url_or_default(&self) -> String {
        self.ai_api_url
            .clone()
            .unwrap_or_else(|| "https://api.openai.com/v1/chat/completions".to_string())
    }

    /// Returns the AI model name. Defaults to "gpt-4o-mini".
    pub fn ai_model_or_default(&self) -> String {
        self.ai_model
            .clone()
            .unwrap_or_else(|| "gpt-4o-mini".to_string())
    }

    /// Returns true if AI is configured (API key present).
    pub fn is_ai_configured(&self) -> bool {
        self.ai_api_key().is_some()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // SMTP Configuration Helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the SMTP relay host. Defaults to "smtp.gmail.com".
    pub fn smtp_server_or_default(&self) -> String {
        self.smtp_server
            .clone()
            .unwrap_or_else(|| "smtp.gmail.com".to_string())
    }

    /// Returns the SMTP port. Defaults to 587 (STARTTLS).
    pub fn smtp_port_or_default(&self) -> u16 {
        self.smtp_port.unwrap_or(587)
    }

    /// Returns true if sender address and password are both present.
    pub fn is_smtp_configured(&self) -> bool {
        self.sender_email.as_deref().is_some_and(|s| !s.trim().is_empty())
            && self
                .sender_password
                .as_deref()
                .is_some_and(|s| !s.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.data_dir_or_default(), "./data");
        assert_eq!(cfg.table_name_or_default(), "HR_DATASET");
        assert_eq!(cfg.ai_model_or_default(), "gpt-4o-mini");
        assert_eq!(cfg.smtp_server_or_default(), "smtp.gmail.com");
        assert_eq!(cfg.smtp_port_or_default(), 587);
        assert!(!cfg.is_smtp_configured());
    }

    #[test]
    fn test_smtp_configured_requires_both() {
        let cfg = AppConfig {
            sender_email: Some("hr@example.com".into()),
            sender_password: Some("  ".into()),
            ..Default::default()
        };
        assert!(!cfg.is_smtp_configured());
        let cfg = AppConfig {
            sender_email: Some("hr@example.com".into()),
            sender_password: Some("app-password".into()),
            ..Default::default()
        };
        assert!(cfg.is_smtp_configured());
    }

    #[test]
    fn test_schema_uses_table_name() {
        let cfg = AppConfig {
            table_name: Some("EMPLOYEES".into()),
            ..Default::default()
        };
        assert_eq!(cfg.schema().table_name, "EMPLOYEES");
    }
}
