//! Storefront domain types. No I/O lives here.

pub mod cart;
pub mod checkout;
pub mod error;
pub mod id;
pub mod money;
pub mod product;

pub use cart::{CartLine, CartSnapshot};
pub use checkout::{CheckoutForm, OrderReceipt};
pub use error::DomainError;
pub use id::ProductId;
pub use money::Price;
pub use product::{CategoryFilter, Product, Rating, ALL_CATEGORIES};
