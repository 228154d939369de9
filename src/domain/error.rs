//! Domain validation errors for core domain types.
//!
//! These errors are returned when a cart invariant would be violated by a
//! caller-supplied value.
//!
//! # Examples
//!
//! ```
//! use storefront::domain::error::DomainError;
//!
//! let err = DomainError::NonPositiveQuantity { quantity: 0 };
//! assert_eq!(err.to_string(), "quantity must be positive, got 0");
//! ```

use thiserror::Error;

use super::id::ProductId;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Quantities added to the cart must be at least one.
    #[error("quantity must be positive, got {quantity}")]
    NonPositiveQuantity {
        /// The invalid quantity that was provided.
        quantity: i64,
    },

    /// A line cannot hold more items than fit the storage column, and the
    /// cart total must fit a `Decimal`.
    #[error("quantity for product {product_id} would overflow")]
    QuantityOverflow {
        /// The product whose line would overflow.
        product_id: ProductId,
    },

    /// Prices are never negative.
    #[error("price must not be negative, got {price}")]
    NegativePrice {
        /// The invalid price that was provided.
        price: rust_decimal::Decimal,
    },
}
