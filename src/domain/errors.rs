//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Query translation failed: {0}")]
    Translator(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Mail delivery failed: {0}")]
    Mail(String),

    #[error("Report generation failed: {0}")]
    Report(String),

    #[error("Dataset import failed: {0}")]
    Import(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("UI error: {0}")]
    Ui(String),
}
