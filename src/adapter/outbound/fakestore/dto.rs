//! Fake Store API response payloads.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::{DomainError, Product, ProductId, Rating};

/// Product as returned by `GET /products` and friends.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductDto {
    pub id: i64,
    pub title: String,
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub rating: Option<RatingDto>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RatingDto {
    pub rate: f64,
    pub count: u32,
}

impl TryFrom<ProductDto> for Product {
    type Error = DomainError;

    fn try_from(dto: ProductDto) -> Result<Self, Self::Error> {
        if dto.price < Decimal::ZERO {
            return Err(DomainError::NegativePrice { price: dto.price });
        }
        Ok(Self {
            id: ProductId::new(dto.id),
            title: dto.title,
            price: dto.price,
            description: dto.description,
            category: dto.category,
            image: dto.image,
            rating: dto
                .rating
                .map(|r| Rating {
                    rate: r.rate,
                    count: r.count,
                })
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const PRODUCT_JSON: &str = r#"{
        "id": 1,
        "title": "Fjallraven - Foldsack No. 1 Backpack, Fits 15 Laptops",
        "price": 109.95,
        "description": "Your perfect pack for everyday use and walks in the forest.",
        "category": "men's clothing",
        "image": "https://fakestoreapi.com/img/81fPKd-2AYL._AC_SL1500_.jpg",
        "rating": { "rate": 3.9, "count": 120 }
    }"#;

    #[test]
    fn decodes_catalog_product() {
        let dto: ProductDto = serde_json::from_str(PRODUCT_JSON).unwrap();
        let product = Product::try_from(dto).unwrap();

        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.price, dec!(109.95));
        assert_eq!(product.category, "men's clothing");
        assert_eq!(product.rating.count, 120);
    }

    #[test]
    fn missing_rating_defaults_to_zero() {
        let dto: ProductDto =
            serde_json::from_str(r#"{"id": 5, "title": "Ring", "price": 9.99}"#).unwrap();
        let product = Product::try_from(dto).unwrap();

        assert_eq!(product.rating, Rating::default());
        assert!(product.description.is_empty());
    }

    #[test]
    fn negative_price_is_rejected() {
        let dto: ProductDto =
            serde_json::from_str(r#"{"id": 3, "title": "Refund", "price": -1.5}"#).unwrap();
        assert!(matches!(
            Product::try_from(dto),
            Err(DomainError::NegativePrice { .. })
        ));
    }

    #[test]
    fn integer_price_decodes() {
        let dto: ProductDto =
            serde_json::from_str(r#"{"id": 2, "title": "Drive", "price": 64}"#).unwrap();
        assert_eq!(dto.price, dec!(64));
    }
}
