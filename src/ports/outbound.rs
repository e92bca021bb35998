//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{DomainError, Table};
use std::path::{Path, PathBuf};

/// Natural language to SQL (LLM).
#[async_trait::async_trait]
pub trait QueryTranslatorPort: Send + Sync {
    /// Translate `prompt` into a single SQL statement for the described schema.
    ///
    /// The returned text starts with SELECT/WITH/INSERT/UPDATE/DELETE/CREATE when the
    /// model produced one, carries no markdown fences and no trailing `;`.
    async fn to_sql(&self, prompt: &str, schema_text: &str) -> Result<String, DomainError>;
}

/// Relational data store holding the HR dataset.
#[async_trait::async_trait]
pub trait DataStorePort: Send + Sync {
    /// Execute `sql`. Never fails: faults come back as `Table::error(msg)`,
    /// which callers detect with `Table::error_message()`.
    async fn run_query(&self, sql: &str) -> Table;

    /// Create (or replace) `table_name` with the given columns and rows.
    async fn import_table(&self, table_name: &str, table: &Table) -> Result<usize, DomainError>;
}

/// Outgoing mail transport.
#[async_trait::async_trait]
pub trait MailSenderPort: Send + Sync {
    /// Deliver one message. A missing attachment file degrades to a plain message.
    async fn send(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        attachment: Option<&Path>,
    ) -> Result<(), DomainError>;
}

/// Chart/CSV generation for the report attachment.
#[async_trait::async_trait]
pub trait ReportRendererPort: Send + Sync {
    /// Render `table` to a file. Returns `None` for an empty table.
    async fn render(&self, table: &Table) -> Result<Option<PathBuf>, DomainError>;
}
