//! Outbound adapters (driven side).

pub mod fakestore;
pub mod memory;
pub mod sqlite;
