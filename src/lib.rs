//! Storefront - catalog browsing, a persisted shopping cart, and checkout.
//!
//! The cart is the one piece of durable state. Every mutation goes to the
//! [`port::CartStore`], and every view of the cart is derived from the
//! snapshots the store publishes after each commit, so the listing badge,
//! the cart screen and the checkout always agree.
//!
//! # Architecture
//!
//! Hexagonal layout:
//!
//! - [`domain`] - Products, cart lines, snapshots and checkout types. No I/O.
//! - [`port`] - Outbound traits: [`port::Catalog`] and [`port::CartStore`].
//! - [`adapter`] - Fake Store HTTP catalog, SQLite and in-memory cart stores,
//!   and the CLI.
//! - [`application`] - Cart synchronization, screen state adapters, checkout.
//! - [`infrastructure`] - Configuration and wiring.
//! - [`error`] - Error types for the crate.
//!
//! # Example
//!
//! ```no_run
//! use storefront::infrastructure::bootstrap::Storefront;
//! use storefront::infrastructure::config::Config;
//!
//! # async fn run() -> storefront::error::Result<()> {
//! let app = Storefront::build(Config::default(), true)?;
//! let product = app.catalog().get_product(1.into()).await?;
//! app.cart().add_to_cart(&product, 2).await?;
//! println!("total: {}", app.cart().snapshot().await?.total());
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
