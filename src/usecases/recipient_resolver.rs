//! Recipient resolution. Turns a follow-up instruction plus the shell selectors into
//! a `DeliveryDecision`.
//!
//! Rules are checked in order; the first that applies wins:
//! 1. no instruction and no delivery mode -> needs input
//! 2. addresses embedded in the instruction -> direct
//! 3. "Direct" mode without addresses -> needs input
//! 4. "Indirect" mode -> column/department lookup (in memory or via the store)
//! 5. anything else -> needs input
//!
//! The draft is computed independently and attached to every decision.

use crate::domain::draft::draft_for;
use crate::domain::email::{collect_addresses, extract_emails};
use crate::domain::{DeliveryDecision, DeliveryMode, Outcome, Table};
use crate::ports::{DataStorePort, RecipientSource};
use crate::usecases::recipient_sources::{QuerySource, TableSource};
use std::sync::Arc;
use tracing::{debug, info, warn};

const MSG_MISSING_INPUT: &str =
    "Please provide an instruction or select a delivery mode (Direct/Indirect).";
const MSG_DIRECT_WITHOUT_ADDRESSES: &str = "Direct delivery selected but no email addresses found in instruction. Please provide comma-separated emails.";
const MSG_MISSING_EMAIL_COLUMN: &str = "Please select an email column for indirect lookup.";
const MSG_MISSING_DEPARTMENT: &str = "Please select a department for indirect lookup.";
const MSG_UNDECIDED: &str = "Could not decide. Please check your inputs.";

/// Everything the shell knows when the user asks for a preview.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveRequest<'a> {
    pub instruction: &'a str,
    /// Schema description; forwarded for the translator, not read here.
    pub table_schema: &'a str,
    /// Last query result, if any.
    pub table: Option<&'a Table>,
    /// Free text expected to contain "Direct" or "Indirect".
    pub delivery_mode: Option<&'a str>,
    pub email_column: Option<&'a str>,
    pub department: Option<&'a str>,
}

pub struct RecipientResolver {
    store: Arc<dyn DataStorePort>,
    table_name: String,
}

impl RecipientResolver {
    pub fn new(store: Arc<dyn DataStorePort>, table_name: impl Into<String>) -> Self {
        Self {
            store,
            table_name: table_name.into(),
        }
    }

    /// Resolve recipients. Never fails; faults become `ai_decision` messages.
    pub async fn resolve(&self, req: ResolveRequest<'_>) -> DeliveryDecision {
        let email_column = non_blank(req.email_column);
        let department = non_blank(req.department);
        debug!(schema_len = req.table_schema.len(), "resolving recipients");

        let draft = draft_for(req.table, department);
        let outcome = self.decide(&req, email_column, department).await;

        let decision = DeliveryDecision::from_outcome(
            outcome,
            email_column.map(str::to_string),
            department.map(str::to_string),
            draft,
        );
        info!(
            action = %decision.action,
            recipients = decision.recipients.len(),
            "recipient decision ready"
        );
        decision
    }

    async fn decide(
        &self,
        req: &ResolveRequest<'_>,
        email_column: Option<&str>,
        department: Option<&str>,
    ) -> Outcome {
        let instruction = req.instruction.trim();
        let mode_text = req.delivery_mode.unwrap_or_default().trim();

        if instruction.is_empty() && mode_text.is_empty() {
            return Outcome::needs_input(MSG_MISSING_INPUT);
        }

        let found = extract_emails(instruction);
        if !found.is_empty() {
            return Outcome::Direct { recipients: found };
        }

        match DeliveryMode::parse(mode_text) {
            Some(DeliveryMode::Direct) => Outcome::needs_input(MSG_DIRECT_WITHOUT_ADDRESSES),
            Some(DeliveryMode::Indirect) => {
                self.resolve_indirect(req.table, email_column, department)
                    .await
            }
            None => Outcome::needs_input(MSG_UNDECIDED),
        }
    }

    async fn resolve_indirect(
        &self,
        table: Option<&Table>,
        email_column: Option<&str>,
        department: Option<&str>,
    ) -> Outcome {
        let Some(column) = email_column else {
            return Outcome::needs_input(MSG_MISSING_EMAIL_COLUMN);
        };
        let Some(department) = department else {
            return Outcome::needs_input(MSG_MISSING_DEPARTMENT);
        };

        // In-memory when the last result carries email and department columns, else a live query.
        let in_memory = table
            .map(TableSource::new)
            .filter(|src| src.can_serve(column));
        let remote;
        let source: &dyn RecipientSource = match &in_memory {
            Some(src) => src,
            None => {
                remote = QuerySource::new(Arc::clone(&self.store), self.table_name.as_str());
                &remote
            }
        };

        let fetched = match source.column_values(column, department).await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, column, department, "recipient lookup failed");
                return Outcome::needs_input(format!("Error while collecting recipients: {}", e));
            }
        };

        let recipients = collect_addresses(fetched.values.iter().map(String::as_str));
        if recipients.is_empty() {
            let extra = fetched
                .query
                .as_deref()
                .map(|sql| format!(" SQL: {}", sql))
                .unwrap_or_default();
            return Outcome::needs_input(format!(
                "No valid email addresses found for column '{}' in department '{}'.{}",
                column, department, extra
            ));
        }

        Outcome::Indirect {
            recipients,
            department: department.to_string(),
            query: fetched.query,
        }
    }
}

/// Blank selectors count as absent.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
