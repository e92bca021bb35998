//! Port traits. API boundaries for the hexagon.
//!
//! - Inbound: Called by UI/adapter into the application
//! - Outbound: Called by application into infrastructure
//! - Recipient source: column/department lookup used by the resolver

pub mod inbound;
pub mod outbound;
pub mod recipient_source;

pub use inbound::InputPort;
pub use outbound::{DataStorePort, MailSenderPort, QueryTranslatorPort, ReportRendererPort};
pub use recipient_source::{ColumnValues, RecipientSource};
