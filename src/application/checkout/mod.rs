//! Simulated order placement.

pub mod service;

pub use service::CheckoutService;
