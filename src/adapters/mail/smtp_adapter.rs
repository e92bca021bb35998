//! SMTP mail sender via lettre. Implements MailSenderPort.
//!
//! STARTTLS relay with login; one connection per message. Attachment MIME type is
//! guessed from the file extension.

use crate::domain::DomainError;
use crate::ports::MailSenderPort;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::path::Path;
use tracing::{debug, warn};

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build a STARTTLS transport for `host:port`, logging in as `sender`.
    pub fn new(host: &str, port: u16, sender: &str, password: &str) -> Result<Self, DomainError> {
        let from: Mailbox = sender
            .parse()
            .map_err(|e| DomainError::Config(format!("invalid sender address '{}': {}", sender, e)))?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| DomainError::Config(format!("SMTP relay {}: {}", host, e)))?
            .port(port)
            .credentials(Credentials::new(sender.to_string(), password.to_string()))
            .build();
        Ok(Self { transport, from })
    }
}

/// Attachment part for `path`, or `None` when the file cannot be read.
async fn load_attachment(path: &Path) -> Option<SinglePart> {
    let bytes = match tokio::fs::read(path).await {
        Ok(b) => b,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "attachment missing; sending without it");
            return None;
        }
    };
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let content_type = ContentType::parse(mime.as_ref()).unwrap_or(ContentType::TEXT_PLAIN);
    Some(Attachment::new(filename).body(bytes, content_type))
}

/// Compose the message. A missing attachment degrades to plain text.
pub async fn build_message(
    from: &Mailbox,
    to: &str,
    subject: &str,
    body: &str,
    attachment: Option<&Path>,
) -> Result<Message, DomainError> {
    let to: Mailbox = to
        .trim()
        .parse()
        .map_err(|e| DomainError::Mail(format!("invalid address: {}", e)))?;
    let builder = Message::builder()
        .from(from.clone())
        .to(to)
        .subject(subject);

    let part = match attachment {
        Some(path) => load_attachment(path).await,
        None => None,
    };
    let message = match part {
        Some(part) => builder.multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(body.to_string()))
                .singlepart(part),
        ),
        None => builder
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string()),
    };
    message.map_err(|e| DomainError::Mail(e.to_string()))
}

#[async_trait::async_trait]
impl MailSenderPort for SmtpMailer {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        attachment: Option<&Path>,
    ) -> Result<(), DomainError> {
        let message = build_message(&self.from, to, subject, body, attachment).await?;
        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| DomainError::Mail(e.to_string()))?;
        debug!(to, code = %response.code(), "SMTP accepted message");
        Ok(())
    }
}

/// Stand-in used when no sender credentials are configured. Every send fails.
pub struct UnconfiguredMailer;

#[async_trait::async_trait]
impl MailSenderPort for UnconfiguredMailer {
    async fn send(
        &self,
        _to: &str,
        _subject: &str,
        _body: &str,
        _attachment: Option<&Path>,
    ) -> Result<(), DomainError> {
        Err(DomainError::Config(
            "SMTP not configured: set HR_ASSIST_SENDER_EMAIL and HR_ASSIST_SENDER_PASSWORD"
                .to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender() -> Mailbox {
        "hr@corp.com".parse().unwrap()
    }

    fn formatted(m: &Message) -> String {
        String::from_utf8_lossy(&m.formatted()).into_owned()
    }

    #[tokio::test]
    async fn test_plain_message_without_attachment() {
        let m = build_message(&sender(), "ann@corp.com", "Automated HR Report", "Hello", None)
            .await
            .unwrap();
        let text = formatted(&m);
        assert!(text.contains("Subject: Automated HR Report"));
        assert!(text.contains("To: ann@corp.com"));
        assert!(!text.contains("multipart/mixed"));
    }

    #[tokio::test]
    async fn test_missing_attachment_degrades_to_plain() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.svg");
        let m = build_message(&sender(), "ann@corp.com", "S", "Hello", Some(&missing))
            .await
            .unwrap();
        assert!(!formatted(&m).contains("multipart/mixed"));
    }

    #[tokio::test]
    async fn test_attachment_included() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        std::fs::write(&path, "A,B\n1,2\n").unwrap();
        let m = build_message(&sender(), "ann@corp.com", "S", "Hello", Some(&path))
            .await
            .unwrap();
        let text = formatted(&m);
        assert!(text.contains("multipart/mixed"));
        assert!(text.contains("report.csv"));
        assert!(text.contains("text/csv"));
    }

    #[tokio::test]
    async fn test_invalid_recipient_is_mail_error() {
        let err = build_message(&sender(), "not-an-address", "S", "B", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Mail(_)));
    }

    #[tokio::test]
    async fn test_unconfigured_mailer_fails() {
        let err = UnconfiguredMailer
            .send("ann@corp.com", "S", "B", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Config(_)));
    }
}
