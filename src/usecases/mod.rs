//! Application use cases. Orchestrate domain logic via ports.

pub mod delivery_service;
pub mod query_service;
pub mod recipient_resolver;
pub mod recipient_sources;

#[cfg(test)]
pub(crate) mod test_support;

pub use delivery_service::{DeliveryService, SendStatus};
pub use query_service::QueryService;
pub use recipient_resolver::{RecipientResolver, ResolveRequest};
pub use recipient_sources::{QuerySource, TableSource};
