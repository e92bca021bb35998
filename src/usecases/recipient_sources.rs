//! `RecipientSource` implementations: filter the last query result in memory,
//! or issue a DISTINCT lookup against the data store.

use crate::domain::{DomainError, Table};
use crate::ports::{ColumnValues, DataStorePort, RecipientSource};
use std::sync::Arc;
use tracing::{debug, info};

/// Picks the recipient column in `table`: exact name, then case-insensitive,
/// then the first column whose name contains "EMAIL".
pub fn resolve_email_column(table: &Table, requested: &str) -> Option<usize> {
    let names: Vec<&str> = table.column_names().collect();
    names
        .iter()
        .position(|n| *n == requested)
        .or_else(|| {
            let wanted = requested.to_uppercase();
            names.iter().position(|n| n.to_uppercase() == wanted)
        })
        .or_else(|| names.iter().position(|n| n.to_uppercase().contains("EMAIL")))
}

/// First column whose uppercased name contains "DEPARTMENT" or "DEPT".
fn department_filter_column(table: &Table) -> Option<usize> {
    table.column_names().position(|n| {
        let upper = n.to_uppercase();
        upper.contains("DEPARTMENT") || upper.contains("DEPT")
    })
}

/// In-memory lookup over an already fetched table.
pub struct TableSource<'a> {
    table: &'a Table,
}

impl<'a> TableSource<'a> {
    pub fn new(table: &'a Table) -> Self {
        Self { table }
    }

    /// Whether this table can answer the lookup: `column` resolves to a
    /// recipient column and a department-like column is present to filter on.
    pub fn can_serve(&self, column: &str) -> bool {
        resolve_email_column(self.table, column).is_some()
            && department_filter_column(self.table).is_some()
    }
}

#[async_trait::async_trait]
impl RecipientSource for TableSource<'_> {
    async fn column_values(
        &self,
        column: &str,
        department: &str,
    ) -> Result<ColumnValues, DomainError> {
        let idx = resolve_email_column(self.table, column).ok_or_else(|| {
            DomainError::Query(format!("column '{}' not found in result table", column))
        })?;
        let dept_idx = department_filter_column(self.table).ok_or_else(|| {
            DomainError::Query("no department column in result table".to_string())
        })?;
        let values = &self.table.columns()[idx].values;
        let wanted = department.trim();
        let rows: Vec<usize> = self.table.columns()[dept_idx]
            .values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.to_string().trim() == wanted)
            .map(|(i, _)| i)
            .collect();
        let values: Vec<String> = rows
            .into_iter()
            .map(|i| &values[i])
            .filter(|v| !v.is_null())
            .map(|v| v.to_string())
            .collect();
        debug!(
            column = %self.table.columns()[idx].name,
            department = wanted,
            values = values.len(),
            "collected recipient values from result table"
        );
        Ok(ColumnValues {
            values,
            query: None,
        })
    }
}

/// Live lookup: `SELECT DISTINCT <col> FROM <table> WHERE DEPARTMENT = '<dept>'`.
pub struct QuerySource {
    store: Arc<dyn DataStorePort>,
    table_name: String,
}

impl QuerySource {
    pub fn new(store: Arc<dyn DataStorePort>, table_name: impl Into<String>) -> Self {
        Self {
            store,
            table_name: table_name.into(),
        }
    }

    /// Builds the lookup statement. Single quotes in the department are doubled.
    pub fn build_query(&self, column: &str, department: &str) -> String {
        format!(
            "SELECT DISTINCT {} FROM {} WHERE DEPARTMENT = '{}'",
            column,
            self.table_name,
            department.replace('\'', "''")
        )
    }
}

#[async_trait::async_trait]
impl RecipientSource for QuerySource {
    async fn column_values(
        &self,
        column: &str,
        department: &str,
    ) -> Result<ColumnValues, DomainError> {
        let sql = self.build_query(column, department);
        info!(sql = %sql, "looking up recipients in data store");
        let result = self.store.run_query(&sql).await;
        if let Some(msg) = result.error_message() {
            return Err(DomainError::Query(msg.to_string()));
        }
        let values = result
            .columns()
            .first()
            .map(|c| {
                c.values
                    .iter()
                    .filter(|v| !v.is_null())
                    .map(|v| v.to_string())
                    .collect()
            })
            .unwrap_or_default();
        Ok(ColumnValues {
            values,
            query: Some(sql),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Column, Value};
    use crate::usecases::test_support::FakeStore;

    fn staff() -> Table {
        Table::new(vec![
            Column::new(
                "Department",
                vec![
                    Value::Text("IT ".into()),
                    Value::Text("Sales".into()),
                    Value::Text("IT".into()),
                ],
            ),
            Column::new(
                "employee_email",
                vec![
                    Value::Text("a@x.com".into()),
                    Value::Text("s@x.com".into()),
                    Value::Null,
                ],
            ),
        ])
    }

    #[test]
    fn test_resolve_email_column_order() {
        let t = staff();
        assert_eq!(resolve_email_column(&t, "employee_email"), Some(1));
        assert_eq!(resolve_email_column(&t, "EMPLOYEE_EMAIL"), Some(1));
        assert_eq!(resolve_email_column(&t, "MANAGER_EMAIL"), Some(1));
        let no_email = Table::new(vec![Column::new("NAME", vec![Value::Null])]);
        assert_eq!(resolve_email_column(&no_email, "EMPLOYEE_EMAIL"), None);
    }

    #[tokio::test]
    async fn test_table_source_filters_exact_after_trim() {
        let t = staff();
        let src = TableSource::new(&t);
        let got = src.column_values("EMPLOYEE_EMAIL", " IT").await.unwrap();
        // Null cell in the matching row is dropped.
        assert_eq!(got.values, vec!["a@x.com".to_string()]);
        assert_eq!(got.query, None);
        // Exact (case-sensitive) department comparison.
        let none = src.column_values("EMPLOYEE_EMAIL", "it").await.unwrap();
        assert!(none.values.is_empty());
    }

    #[tokio::test]
    async fn test_table_source_requires_department_column() {
        let t = Table::new(vec![
            Column::new("EMPLOYEE_NAME", vec![Value::Text("Ann".into())]),
            Column::new("EMPLOYEE_EMAIL", vec![Value::Text("ann@it.com".into())]),
        ]);
        let src = TableSource::new(&t);
        assert!(!src.can_serve("EMPLOYEE_EMAIL"));
        assert!(src.column_values("EMPLOYEE_EMAIL", "IT").await.is_err());
        assert!(TableSource::new(&staff()).can_serve("EMPLOYEE_EMAIL"));
    }

    #[tokio::test]
    async fn test_query_source_escapes_and_reads_first_column() {
        let store = Arc::new(FakeStore::returning(Table::new(vec![Column::new(
            "MANAGER_EMAIL",
            vec![Value::Text("m@x.com".into()), Value::Null],
        )])));
        let src = QuerySource::new(store.clone(), "HR_DATASET");
        let got = src.column_values("MANAGER_EMAIL", "O'Brien Ops").await.unwrap();
        let expected =
            "SELECT DISTINCT MANAGER_EMAIL FROM HR_DATASET WHERE DEPARTMENT = 'O''Brien Ops'";
        assert_eq!(got.values, vec!["m@x.com".to_string()]);
        assert_eq!(got.query.as_deref(), Some(expected));
        assert_eq!(store.queries(), vec![expected.to_string()]);
    }

    #[tokio::test]
    async fn test_query_source_error_table_is_fault() {
        let store = Arc::new(FakeStore::returning(Table::error("no such table: HR_DATASET")));
        let src = QuerySource::new(store, "HR_DATASET");
        let err = src.column_values("EMPLOYEE_EMAIL", "IT").await.unwrap_err();
        assert!(err.to_string().contains("no such table"));
    }
}
