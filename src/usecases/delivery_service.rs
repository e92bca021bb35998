//! Delivery service. Confirm-and-send step for a previewed `DeliveryDecision`.
//!
//! Renders the report once, then sends to each recipient in order. A failed
//! address is recorded and the loop moves on; there is no retry.

use crate::domain::{DeliveryDecision, DeliveryReport, DomainError, SendFailure, Table};
use crate::ports::{MailSenderPort, ReportRendererPort};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

pub const REPORT_SUBJECT: &str = "Automated HR Report";

const DEFAULT_BODY: &str =
    "Hello,\n\nPlease find the requested report attached.\n\nRegards,\nAI HR Assistant";

/// Result of a confirm action: either nothing was attempted, or a report.
#[derive(Debug, Clone, PartialEq)]
pub enum SendStatus {
    /// Nothing sent; the message says why.
    Skipped(String),
    Completed(DeliveryReport),
}

impl SendStatus {
    /// One-line status shown in the shell.
    pub fn message(&self) -> String {
        match self {
            SendStatus::Skipped(msg) => msg.clone(),
            SendStatus::Completed(report) => report.summary(),
        }
    }
}

pub struct DeliveryService {
    mailer: Arc<dyn MailSenderPort>,
    renderer: Arc<dyn ReportRendererPort>,
}

impl DeliveryService {
    pub fn new(mailer: Arc<dyn MailSenderPort>, renderer: Arc<dyn ReportRendererPort>) -> Self {
        Self { mailer, renderer }
    }

    /// Send the report for `pending` built from `table`.
    pub async fn confirm_and_send(
        &self,
        pending: Option<&DeliveryDecision>,
        table: Option<&Table>,
    ) -> SendStatus {
        let Some(decision) = pending else {
            return SendStatus::Skipped("Please preview first.".to_string());
        };
        if !decision.action.is_sendable() {
            return SendStatus::Skipped(format!(
                "Action is '{}' — nothing to send. Decision: {}",
                decision.action, decision.decision
            ));
        }

        let recipients = dedup_trimmed(&decision.recipients);
        if recipients.is_empty() {
            return SendStatus::Skipped(format!(
                "No recipients found for action '{}'. Decision: {}",
                decision.action, decision.decision
            ));
        }

        let attachment = match table {
            Some(t) => match self.renderer.render(t).await {
                Ok(path) => path,
                Err(e) => return SendStatus::Skipped(format!("Failed to generate report: {}", e)),
            },
            None => None,
        };

        let body = decision.draft.as_deref().unwrap_or(DEFAULT_BODY);
        let mut report = DeliveryReport::default();
        for email in recipients {
            match self
                .mailer
                .send(&email, REPORT_SUBJECT, body, attachment.as_deref())
                .await
            {
                Ok(()) => {
                    info!(to = %email, "report sent");
                    report.sent.push(email);
                }
                Err(e) => {
                    warn!(to = %email, error = %e, "send failed");
                    report.failures.push(SendFailure {
                        email,
                        error: error_text(&e),
                    });
                }
            }
        }
        info!(
            sent = report.sent.len(),
            failed = report.failures.len(),
            "delivery finished"
        );
        SendStatus::Completed(report)
    }
}

fn dedup_trimmed(recipients: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    recipients
        .iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty() && seen.insert(*r))
        .map(str::to_string)
        .collect()
}

/// Transport message without the error-kind prefix.
fn error_text(e: &DomainError) -> String {
    match e {
        DomainError::Mail(msg) => msg.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Column, DeliveryAction, Outcome, Value};
    use crate::usecases::test_support::{FakeMailer, FakeRenderer};
    use std::path::PathBuf;

    fn direct(recipients: &[&str], draft: Option<&str>) -> DeliveryDecision {
        DeliveryDecision::from_outcome(
            Outcome::Direct {
                recipients: recipients.iter().map(|r| r.to_string()).collect(),
            },
            None,
            None,
            draft.map(str::to_string),
        )
    }

    fn table() -> Table {
        Table::new(vec![Column::new("SALARY", vec![Value::Integer(1)])])
    }

    fn service(mailer: Arc<FakeMailer>, fail_render: bool) -> DeliveryService {
        DeliveryService::new(mailer, Arc::new(FakeRenderer { fail: fail_render }))
    }

    #[tokio::test]
    async fn test_requires_preview() {
        let svc = service(Arc::new(FakeMailer::default()), false);
        assert_eq!(
            svc.confirm_and_send(None, None).await.message(),
            "Please preview first."
        );
    }

    #[tokio::test]
    async fn test_ai_decision_is_not_sent() {
        let mailer = Arc::new(FakeMailer::default());
        let svc = service(mailer.clone(), false);
        let d = DeliveryDecision::from_outcome(
            Outcome::needs_input("Please select a department for indirect lookup."),
            None,
            None,
            None,
        );
        let msg = svc.confirm_and_send(Some(&d), None).await.message();
        assert!(msg.starts_with("Action is 'ai_decision'"));
        assert!(mailer.attempted().is_empty());
    }

    #[tokio::test]
    async fn test_partial_failure_reported() {
        let mailer = Arc::new(FakeMailer::failing_for(&["bad@x.com"]));
        let svc = service(mailer.clone(), false);
        let d = direct(&["ok@x.com", "bad@x.com"], Some("Hi,"));
        let t = table();
        let status = svc.confirm_and_send(Some(&d), Some(&t)).await;
        let SendStatus::Completed(report) = &status else {
            panic!("expected completed, got {:?}", status);
        };
        assert_eq!(report.sent, vec!["ok@x.com"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].email, "bad@x.com");
        assert_eq!(
            status.message(),
            "Sent: 1. Failures: 1. Sample failures: bad@x.com (550 mailbox unavailable)"
        );
        assert_eq!(mailer.attempted(), vec!["ok@x.com", "bad@x.com"]);
    }

    #[tokio::test]
    async fn test_continues_after_failure_in_order() {
        let mailer = Arc::new(FakeMailer::failing_for(&["a@x.com"]));
        let svc = service(mailer.clone(), false);
        let mut d = direct(&["a@x.com", "b@x.com", "c@x.com"], None);
        d.recipients.push(" b@x.com ".to_string());
        svc.confirm_and_send(Some(&d), None).await;
        assert_eq!(mailer.attempted(), vec!["a@x.com", "b@x.com", "c@x.com"]);
    }

    #[tokio::test]
    async fn test_uses_draft_and_attachment() {
        let mailer = Arc::new(FakeMailer::default());
        let svc = service(mailer.clone(), false);
        let d = direct(&["ok@x.com"], None);
        let t = table();
        svc.confirm_and_send(Some(&d), Some(&t)).await;
        let attempts = mailer.attempts.lock().unwrap().clone();
        assert_eq!(attempts[0].1, DEFAULT_BODY);
        assert_eq!(attempts[0].2, Some(PathBuf::from("report.csv")));
        assert_eq!(d.action, DeliveryAction::Direct);
    }

    #[tokio::test]
    async fn test_render_failure_aborts_before_sending() {
        let mailer = Arc::new(FakeMailer::default());
        let svc = service(mailer.clone(), true);
        let d = direct(&["ok@x.com"], None);
        let t = table();
        let msg = svc.confirm_and_send(Some(&d), Some(&t)).await.message();
        assert!(msg.starts_with("Failed to generate report:"));
        assert!(mailer.attempted().is_empty());
    }
}
