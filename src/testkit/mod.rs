//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`domain`] - Builders for products and cart lines.
//! - [`catalog`] - `StubCatalog`, a scriptable [`Catalog`](crate::port::Catalog)
//!   with per-request gates for ordering tests.
//! - [`store`] - `FailingCartStore`, a cart store whose reads or writes can be
//!   made to fail on demand.

pub mod catalog;
pub mod domain;
pub mod store;
