//! In-process adapters for tests and ephemeral runs.

pub mod store;

pub use store::MemoryCartStore;
