//! hr-assist: HR data assistant with Hexagonal Architecture. Natural-language
//! queries, recipient resolution, and emailed chart/CSV reports.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
