//! Domain entities. Pure data structures for the core business.
//!
//! No database/HTTP types here; adapters map into these.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Column name used by the data store for its failure table.
pub const ERROR_COLUMN: &str = "Error";

/// A single scalar cell. Dates are carried as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the cell; `None` for null and text.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Real(r) => Some(*r),
            Value::Null | Value::Text(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// A named column of cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// A column is numeric when it holds at least one non-null value and every
    /// non-null value is a number.
    pub fn is_numeric(&self) -> bool {
        let mut seen = false;
        for v in &self.values {
            match v {
                Value::Null => {}
                Value::Integer(_) | Value::Real(_) => seen = true,
                Value::Text(_) => return false,
            }
        }
        seen
    }
}

/// Tabular query result. Column order and row order are significant.
///
/// All columns have the same length; `Table::new` pads short columns with nulls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    pub fn new(mut columns: Vec<Column>) -> Self {
        let rows = columns.iter().map(|c| c.values.len()).max().unwrap_or(0);
        for c in &mut columns {
            c.values.resize(rows, Value::Null);
        }
        Self { columns }
    }

    /// Builds a table from a header row and row-major cells.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let mut columns: Vec<Column> = headers
            .into_iter()
            .map(|name| Column::new(name, Vec::with_capacity(rows.len())))
            .collect();
        for row in rows {
            let mut cells = row.into_iter();
            for col in &mut columns {
                col.values.push(cells.next().unwrap_or(Value::Null));
            }
        }
        Self::new(columns)
    }

    /// Single-column failure table returned by the data store instead of an error.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(vec![Column::new(
            ERROR_COLUMN,
            vec![Value::Text(message.into())],
        )])
    }

    /// Returns the failure message if this is the data store's error table.
    pub fn error_message(&self) -> Option<&str> {
        match self.columns.as_slice() {
            [only] if only.name == ERROR_COLUMN => match only.values.first() {
                Some(Value::Text(msg)) => Some(msg.as_str()),
                _ => Some(""),
            },
            _ => None,
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    /// True when there are no rows or no columns.
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0 || self.columns.is_empty()
    }

    /// Cells of row `idx` in column order.
    pub fn row(&self, idx: usize) -> Vec<&Value> {
        self.columns.iter().map(|c| &c.values[idx]).collect()
    }
}

/// Delivery mode as selected in the shell. Parsed from free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    Direct,
    Indirect,
}

impl DeliveryMode {
    /// Display labels offered by the shell.
    pub const INDIRECT_LABEL: &'static str = "Indirect (by table)";
    pub const DIRECT_LABEL: &'static str = "Direct (manual emails)";

    /// Matches "Direct" before "Indirect", case-sensitively.
    pub fn parse(text: &str) -> Option<Self> {
        if text.contains("Direct") {
            Some(Self::Direct)
        } else if text.contains("Indirect") {
            Some(Self::Indirect)
        } else {
            None
        }
    }
}

/// Resolution result before it is wrapped into a `DeliveryDecision`.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Direct {
        recipients: Vec<String>,
    },
    Indirect {
        recipients: Vec<String>,
        department: String,
        query: Option<String>,
    },
    NeedsInput {
        message: String,
    },
}

impl Outcome {
    pub fn needs_input(message: impl Into<String>) -> Self {
        Self::NeedsInput {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryAction {
    Direct,
    Indirect,
    AiDecision,
}

impl DeliveryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryAction::Direct => "direct",
            DeliveryAction::Indirect => "indirect",
            DeliveryAction::AiDecision => "ai_decision",
        }
    }

    /// Whether a decision with this action carries recipients to send to.
    pub fn is_sendable(&self) -> bool {
        matches!(self, DeliveryAction::Direct | DeliveryAction::Indirect)
    }
}

impl fmt::Display for DeliveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recipient decision shown in the preview and consumed by the send step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryDecision {
    pub action: DeliveryAction,
    pub recipients: Vec<String>,
    pub email_column: Option<String>,
    pub department: Option<String>,
    pub decision: String,
    pub draft: Option<String>,
}

impl DeliveryDecision {
    /// Wraps an outcome. A sendable outcome without recipients is downgraded to
    /// `ai_decision`, so `direct`/`indirect` always carry at least one address.
    pub fn from_outcome(
        outcome: Outcome,
        email_column: Option<String>,
        department: Option<String>,
        draft: Option<String>,
    ) -> Self {
        let (action, recipients, decision) = match outcome {
            Outcome::Direct { recipients } if !recipients.is_empty() => {
                let msg = format!(
                    "Found {} explicit email(s) in instruction.",
                    recipients.len()
                );
                (DeliveryAction::Direct, recipients, msg)
            }
            Outcome::Indirect {
                recipients,
                department: dept,
                query,
            } if !recipients.is_empty() => {
                let mut msg = format!(
                    "Found {} recipient(s) for department '{}'.",
                    recipients.len(),
                    dept
                );
                if let Some(sql) = query {
                    msg.push_str(&format!(" SQL: {}", sql));
                }
                (DeliveryAction::Indirect, recipients, msg)
            }
            Outcome::Direct { .. } | Outcome::Indirect { .. } => (
                DeliveryAction::AiDecision,
                Vec::new(),
                "No recipients resolved. Please check your inputs.".to_string(),
            ),
            Outcome::NeedsInput { message } => (DeliveryAction::AiDecision, Vec::new(), message),
        };
        Self {
            action,
            recipients,
            email_column,
            department,
            decision,
            draft,
        }
    }
}

/// One failed send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendFailure {
    pub email: String,
    pub error: String,
}

/// Per-address outcome of a confirm-and-send run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryReport {
    pub sent: Vec<String>,
    pub failures: Vec<SendFailure>,
}

impl DeliveryReport {
    /// Number of failures quoted in the summary line.
    const SAMPLE_FAILURES: usize = 5;

    pub fn summary(&self) -> String {
        let mut out = format!(
            "Sent: {}. Failures: {}.",
            self.sent.len(),
            self.failures.len()
        );
        if !self.failures.is_empty() {
            let sample: Vec<String> = self
                .failures
                .iter()
                .take(Self::SAMPLE_FAILURES)
                .map(|f| format!("{} ({})", f.email, f.error))
                .collect();
            out.push_str(&format!(" Sample failures: {}", sample.join("; ")));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_pads_short_columns() {
        let t = Table::new(vec![
            Column::new("A", vec![Value::Integer(1), Value::Integer(2)]),
            Column::new("B", vec![Value::Text("x".into())]),
        ]);
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.row(1), vec![&Value::Integer(2), &Value::Null]);
    }

    #[test]
    fn test_error_table_detected() {
        let t = Table::error("ORA-00942: table or view does not exist");
        assert_eq!(
            t.error_message(),
            Some("ORA-00942: table or view does not exist")
        );
        let ok = Table::new(vec![Column::new("Errors", vec![Value::Integer(1)])]);
        assert_eq!(ok.error_message(), None);
    }

    #[test]
    fn test_numeric_column_ignores_nulls() {
        let c = Column::new("S", vec![Value::Null, Value::Real(1.5), Value::Integer(2)]);
        assert!(c.is_numeric());
        let all_null = Column::new("N", vec![Value::Null]);
        assert!(!all_null.is_numeric());
        let mixed = Column::new("M", vec![Value::Integer(1), Value::Text("a".into())]);
        assert!(!mixed.is_numeric());
    }

    #[test]
    fn test_delivery_mode_parse() {
        assert_eq!(
            DeliveryMode::parse(DeliveryMode::INDIRECT_LABEL),
            Some(DeliveryMode::Indirect)
        );
        assert_eq!(
            DeliveryMode::parse(DeliveryMode::DIRECT_LABEL),
            Some(DeliveryMode::Direct)
        );
        assert_eq!(DeliveryMode::parse("by table"), None);
    }

    #[test]
    fn test_empty_sendable_outcome_downgraded() {
        let d = DeliveryDecision::from_outcome(
            Outcome::Direct { recipients: vec![] },
            None,
            None,
            None,
        );
        assert_eq!(d.action, DeliveryAction::AiDecision);
        assert!(d.recipients.is_empty());
    }

    #[test]
    fn test_action_serializes_snake_case() {
        let json = serde_json::to_string(&DeliveryAction::AiDecision).unwrap();
        assert_eq!(json, "\"ai_decision\"");
    }

    #[test]
    fn test_decision_json_round_trip() {
        let d = DeliveryDecision::from_outcome(
            Outcome::Indirect {
                recipients: vec!["a@x.com".into()],
                department: "IT".into(),
                query: None,
            },
            Some("EMPLOYEE_EMAIL".into()),
            Some("IT".into()),
            Some("Hi,".into()),
        );
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains("\"action\":\"indirect\""));
        let back: DeliveryDecision = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn test_value_json_is_untagged() {
        let cells = vec![
            Value::Null,
            Value::Integer(5),
            Value::Real(1.5),
            Value::Text("IT".into()),
        ];
        let json = serde_json::to_string(&cells).unwrap();
        assert_eq!(json, "[null,5,1.5,\"IT\"]");
        let back: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cells);
    }

    #[test]
    fn test_report_summary_samples_failures() {
        let report = DeliveryReport {
            sent: vec!["ok@x.com".into()],
            failures: vec![SendFailure {
                email: "bad@x.com".into(),
                error: "550 mailbox unavailable".into(),
            }],
        };
        assert_eq!(
            report.summary(),
            "Sent: 1. Failures: 1. Sample failures: bad@x.com (550 mailbox unavailable)"
        );
    }
}
