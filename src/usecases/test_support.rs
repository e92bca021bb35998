//! In-process fakes for the outbound ports, shared by use case tests.

use crate::domain::{DomainError, Table};
use crate::ports::{DataStorePort, MailSenderPort, QueryTranslatorPort, ReportRendererPort};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Returns a fixed table for every query and records the SQL it was given.
pub struct FakeStore {
    pub result: Table,
    pub queries: Mutex<Vec<String>>,
}

impl FakeStore {
    pub fn returning(result: Table) -> Self {
        Self {
            result,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DataStorePort for FakeStore {
    async fn run_query(&self, sql: &str) -> Table {
        self.queries.lock().unwrap().push(sql.to_string());
        self.result.clone()
    }

    async fn import_table(&self, _table_name: &str, table: &Table) -> Result<usize, DomainError> {
        Ok(table.row_count())
    }
}

/// Fails for the listed addresses, records every attempt in order.
#[derive(Default)]
pub struct FakeMailer {
    pub failing: HashSet<String>,
    pub attempts: Mutex<Vec<(String, String, Option<PathBuf>)>>,
}

impl FakeMailer {
    pub fn failing_for(addrs: &[&str]) -> Self {
        Self {
            failing: addrs.iter().map(|a| a.to_string()).collect(),
            attempts: Mutex::new(Vec::new()),
        }
    }

    pub fn attempted(&self) -> Vec<String> {
        self.attempts
            .lock()
            .unwrap()
            .iter()
            .map(|(to, _, _)| to.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl MailSenderPort for FakeMailer {
    async fn send(
        &self,
        to: &str,
        _subject: &str,
        body: &str,
        attachment: Option<&Path>,
    ) -> Result<(), DomainError> {
        self.attempts.lock().unwrap().push((
            to.to_string(),
            body.to_string(),
            attachment.map(Path::to_path_buf),
        ));
        if self.failing.contains(to) {
            return Err(DomainError::Mail("550 mailbox unavailable".to_string()));
        }
        Ok(())
    }
}

/// Pretends to write a report; optionally fails.
pub struct FakeRenderer {
    pub fail: bool,
}

#[async_trait::async_trait]
impl ReportRendererPort for FakeRenderer {
    async fn render(&self, table: &Table) -> Result<Option<PathBuf>, DomainError> {
        if self.fail {
            return Err(DomainError::Report("disk full".to_string()));
        }
        Ok((!table.is_empty()).then(|| PathBuf::from("report.csv")))
    }
}

/// Returns a canned statement or a translation error.
pub struct FakeTranslator {
    pub sql: Result<String, String>,
}

#[async_trait::async_trait]
impl QueryTranslatorPort for FakeTranslator {
    async fn to_sql(&self, _prompt: &str, _schema_text: &str) -> Result<String, DomainError> {
        self.sql.clone().map_err(DomainError::Translator)
    }
}
