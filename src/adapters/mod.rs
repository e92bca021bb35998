//! Infrastructure adapters. Implement outbound ports.
//!
//! LLM, SQLite, SMTP, chart/CSV files, terminal UI. Map errors to DomainError.

pub mod ai;
pub mod mail;
pub mod persistence;
pub mod report;
pub mod ui;
