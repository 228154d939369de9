//! Catalog port: the read-only product source.

use async_trait::async_trait;

use crate::domain::{Product, ProductId};
use crate::error::CatalogError;

/// Read-only product catalog.
///
/// Every call is a single request that either returns data or fails; no
/// pagination, auth or retry contract is assumed by callers.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Every product.
    async fn list_products(&self) -> Result<Vec<Product>, CatalogError>;

    /// One product by id.
    async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError>;

    /// Category names, without the synthetic "All" entry.
    async fn list_categories(&self) -> Result<Vec<String>, CatalogError>;

    /// Products in one category.
    async fn list_products_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<Product>, CatalogError>;
}
