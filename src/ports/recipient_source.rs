//! Recipient source port. "Fetch values of column C filtered by department D".
//!
//! Two implementations live in `usecases::recipient_sources`: an in-memory filter
//! over the last query result and a live query against the data store.

use crate::domain::DomainError;

/// Raw cell values for the requested column plus the SQL used, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnValues {
    pub values: Vec<String>,
    pub query: Option<String>,
}

#[async_trait::async_trait]
pub trait RecipientSource: Send + Sync {
    /// Non-null values of `column` for rows in `department`, as strings.
    async fn column_values(
        &self,
        column: &str,
        department: &str,
    ) -> Result<ColumnValues, DomainError>;
}
