//! Mail adapter. Implements MailSenderPort over SMTP.

pub mod smtp_adapter;

pub use smtp_adapter::{SmtpMailer, UnconfiguredMailer};
