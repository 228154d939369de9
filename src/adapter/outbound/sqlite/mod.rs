//! SQLite persistence adapters.
//!
//! Provides the SQLite-backed cart store using Diesel ORM.

pub mod database;
pub mod store;

pub use store::SqliteCartStore;
