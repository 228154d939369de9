//! Cart synchronization between the persistent store and its observers.

pub mod service;

pub use service::CartService;
