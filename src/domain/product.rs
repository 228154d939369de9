//! Catalog product types.
//!
//! Products are owned by the catalog and are read-only from the cart's
//! point of view. Cart lines copy the display subset they need at add time.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::money::Price;

/// Label of the synthetic category meaning "no filter".
pub const ALL_CATEGORIES: &str = "All";

/// Average customer rating for a product.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rating {
    /// Average score.
    pub rate: f64,
    /// Number of ratings the average is computed over.
    pub count: u32,
}

/// Immutable catalog record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    /// Unit price.
    pub price: Price,
    pub description: String,
    pub category: String,
    /// Image URL.
    pub image: String,
    #[serde(default)]
    pub rating: Rating,
}

/// Category selection for the product listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// No filter; list every product.
    #[default]
    All,
    /// Only products in the named category.
    Named(String),
}

impl CategoryFilter {
    /// Interpret a category label as shown in the category list.
    ///
    /// The synthetic [`ALL_CATEGORIES`] label maps to [`CategoryFilter::All`].
    pub fn from_label(label: impl Into<String>) -> Self {
        let label = label.into();
        if label == ALL_CATEGORIES {
            Self::All
        } else {
            Self::Named(label)
        }
    }

    /// Label to display for this filter.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::All => ALL_CATEGORIES,
            Self::Named(name) => name,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_label_means_no_filter() {
        assert_eq!(CategoryFilter::from_label("All"), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::from_label("jewelery"),
            CategoryFilter::Named("jewelery".into())
        );
    }

    #[test]
    fn label_round_trips_through_display() {
        let filter = CategoryFilter::from_label("men's clothing");
        assert_eq!(filter.to_string(), "men's clothing");
        assert_eq!(CategoryFilter::All.to_string(), ALL_CATEGORIES);
    }
}
