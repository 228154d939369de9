//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the infrastructure the cart core depends on:
//! the persistent cart table and the remote product catalog.

pub mod catalog;
pub mod store;
