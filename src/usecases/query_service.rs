//! Query service. Natural language -> SQL -> table, plus the selector choices
//! offered for indirect delivery.

use crate::domain::Table;
use crate::ports::{DataStorePort, QueryTranslatorPort};
use crate::shared::schema::TableSchema;
use std::sync::Arc;
use tracing::{info, warn};

pub struct QueryService {
    translator: Arc<dyn QueryTranslatorPort>,
    store: Arc<dyn DataStorePort>,
    schema: TableSchema,
}

impl QueryService {
    pub fn new(
        translator: Arc<dyn QueryTranslatorPort>,
        store: Arc<dyn DataStorePort>,
        schema: TableSchema,
    ) -> Self {
        Self {
            translator,
            store,
            schema,
        }
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Translate `prompt` and run it. Translation failures yield an empty table;
    /// execution failures come back as the store's error table.
    pub async fn run(&self, prompt: &str) -> Table {
        let sql = match self
            .translator
            .to_sql(prompt, &self.schema.ddl_text())
            .await
        {
            Ok(sql) => sql,
            Err(e) => {
                warn!(error = %e, "query translation failed");
                return Table::default();
            }
        };
        info!(sql = %sql, "executing generated SQL");
        let table = self.store.run_query(&sql).await;
        match table.error_message() {
            Some(msg) => warn!(error = msg, "query returned error table"),
            None => info!(
                rows = table.row_count(),
                columns = table.column_count(),
                "query complete"
            ),
        }
        table
    }

    /// Columns offered for indirect lookup.
    pub fn email_columns(&self) -> Vec<String> {
        self.schema.email_columns()
    }

    /// Distinct departments currently in the store. Empty on any failure.
    pub async fn department_choices(&self) -> Vec<String> {
        let sql = format!(
            "SELECT DISTINCT DEPARTMENT FROM {} ORDER BY DEPARTMENT",
            self.schema.table_name
        );
        let table = self.store.run_query(&sql).await;
        if let Some(msg) = table.error_message() {
            warn!(error = msg, "could not load departments");
            return Vec::new();
        }
        let mut seen = std::collections::HashSet::new();
        table
            .columns()
            .first()
            .map(|c| {
                c.values
                    .iter()
                    .filter(|v| !v.is_null())
                    .map(|v| v.to_string())
                    .filter(|v| seen.insert(v.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Column, Value};
    use crate::usecases::test_support::{FakeStore, FakeTranslator};

    fn service(sql: Result<String, String>, result: Table) -> (QueryService, Arc<FakeStore>) {
        let store = Arc::new(FakeStore::returning(result));
        let svc = QueryService::new(
            Arc::new(FakeTranslator { sql }),
            store.clone(),
            TableSchema::hr_dataset("HR_DATASET"),
        );
        (svc, store)
    }

    #[tokio::test]
    async fn test_run_executes_translated_sql() {
        let result = Table::new(vec![Column::new("CNT", vec![Value::Integer(3)])]);
        let (svc, store) = service(Ok("SELECT COUNT(*) AS CNT FROM HR_DATASET".into()), result.clone());
        assert_eq!(svc.run("how many employees?").await, result);
        assert_eq!(
            store.queries(),
            vec!["SELECT COUNT(*) AS CNT FROM HR_DATASET".to_string()]
        );
    }

    #[tokio::test]
    async fn test_run_translation_failure_gives_empty_table() {
        let (svc, store) = service(Err("401 Unauthorized".into()), Table::default());
        assert!(svc.run("anything").await.is_empty());
        assert!(store.queries().is_empty());
    }

    #[tokio::test]
    async fn test_department_choices() {
        let result = Table::new(vec![Column::new(
            "DEPARTMENT",
            vec![
                Value::Text("IT".into()),
                Value::Null,
                Value::Text("Sales".into()),
            ],
        )]);
        let (svc, store) = service(Ok(String::new()), result);
        assert_eq!(svc.department_choices().await, vec!["IT", "Sales"]);
        assert!(store.queries()[0].contains("ORDER BY DEPARTMENT"));
    }

    #[tokio::test]
    async fn test_department_choices_on_error() {
        let (svc, _) = service(Ok(String::new()), Table::error("no such table"));
        assert!(svc.department_choices().await.is_empty());
    }
}
