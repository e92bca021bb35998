//! Core domain layer. No external I/O dependencies.
//!
//! Entities, address extraction and the draft rules live here. Dependencies flow inward.

pub mod draft;
pub mod email;
pub mod entities;
pub mod errors;

pub use entities::{
    Column, DeliveryAction, DeliveryDecision, DeliveryMode, DeliveryReport, ERROR_COLUMN,
    Outcome, SendFailure, Table, Value,
};
pub use errors::DomainError;
