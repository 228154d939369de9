//! Screen-facing state adapters.
//!
//! Each adapter owns a [`TaskScope`] for its background work and publishes
//! its state through a `watch` channel. Subscribers always see the latest
//! state; intermediate states may be skipped.

pub mod cart;
pub mod detail;
pub mod listing;
pub mod scope;

pub use cart::{CartScreenAdapter, CartScreenState};
pub use detail::{DetailAdapter, DetailState};
pub use listing::{ListingAdapter, ListingState};
pub use scope::TaskScope;
