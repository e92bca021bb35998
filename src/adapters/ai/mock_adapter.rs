//! Mock translator for running without an API key.
//!
//! Returns a full-table SELECT without making API calls.

use crate::domain::DomainError;
use crate::ports::QueryTranslatorPort;
use std::time::Duration;
use tracing::info;

/// Mock SQL translator.
///
/// Ignores the question and selects every row of the configured table.
/// Simulates network latency with configurable delay.
pub struct MockTranslator {
    table_name: String,
    /// Simulated network delay in milliseconds.
    delay_ms: u64,
}

impl MockTranslator {
    /// Create a new mock translator with default delay (100ms).
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            delay_ms: 100,
        }
    }

    /// Create a mock translator with custom delay.
    pub fn with_delay(table_name: impl Into<String>, delay_ms: u64) -> Self {
        Self {
            table_name: table_name.into(),
            delay_ms,
        }
    }
}

#[async_trait::async_trait]
impl QueryTranslatorPort for MockTranslator {
    async fn to_sql(&self, prompt: &str, schema_text: &str) -> Result<String, DomainError> {
        info!(
            prompt_len = prompt.len(),
            schema_len = schema_text.len(),
            "[MOCK] Simulating SQL translation"
        );

        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;

        Ok(format!("SELECT * FROM {}", self.table_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_translator() {
        let t = MockTranslator::with_delay("HR_DATASET", 1);
        let sql = t.to_sql("total salary by department", "").await.unwrap();
        assert_eq!(sql, "SELECT * FROM HR_DATASET");
    }
}
