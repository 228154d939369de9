//! Simulated checkout types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cart::CartLine;
use super::money::Price;

/// Shipping and payment details entered at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutForm {
    pub name: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub card_number: String,
}

impl CheckoutForm {
    /// Name of the first blank field, if any.
    #[must_use]
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("name", &self.name),
            ("address", &self.address),
            ("city", &self.city),
            ("zip_code", &self.zip_code),
            ("card_number", &self.card_number),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
    }

    /// True when every field has a non-blank value.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_field().is_none()
    }
}

/// Confirmation for a placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderReceipt {
    /// Generated as UUID v4.
    pub order_id: String,
    pub lines: Vec<CartLine>,
    pub total: Price,
    pub placed_at: DateTime<Utc>,
}
