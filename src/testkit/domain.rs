//! Builders for domain primitives used across tests.

use chrono::Utc;
use rust_decimal::Decimal;

use crate::domain::{CartLine, Product, ProductId, Rating};

/// Create a product with the given id and unit price.
pub fn product(id: i64, price: Decimal) -> Product {
    product_in(id, price, "electronics")
}

/// Create a product in a specific category.
pub fn product_in(id: i64, price: Decimal, category: &str) -> Product {
    Product {
        id: ProductId::new(id),
        title: format!("Product {id}"),
        price,
        description: format!("Description of product {id}"),
        category: category.to_string(),
        image: format!("https://img.example/{id}.jpg"),
        rating: Rating {
            rate: 4.5,
            count: 10,
        },
    }
}

/// Create a cart line stamped with the current time.
///
/// Quantity is not validated so tests can build invalid lines on purpose.
pub fn line(id: i64, price: Decimal, quantity: i32) -> CartLine {
    CartLine {
        product_id: ProductId::new(id),
        title: format!("Product {id}"),
        price,
        image: format!("https://img.example/{id}.jpg"),
        quantity,
        added_at: Utc::now(),
    }
}
