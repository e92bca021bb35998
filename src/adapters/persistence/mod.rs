//! Persistence adapters. SQLite HR store and CSV dataset import.

pub mod csv_import;
pub mod sqlite_store;

pub use csv_import::import_csv;
pub use sqlite_store::SqliteStore;
