//! Application services (use cases).
//!
//! These services orchestrate domain logic and coordinate adapters
//! to implement the storefront's use cases.

pub mod cart;
pub mod checkout;
pub mod presentation;
