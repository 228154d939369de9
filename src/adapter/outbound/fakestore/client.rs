//! Fake Store REST API client.
//!
//! Read-only catalog access over HTTPS. Failures are passed straight back to
//! the caller; there is no retry.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

use super::dto::ProductDto;
use super::settings::CatalogConfig;
use crate::domain::{Product, ProductId};
use crate::error::CatalogError;
use crate::port::outbound::catalog::Catalog;

/// HTTP client for the Fake Store catalog API.
pub struct FakeStoreClient {
    http: HttpClient,
    base_url: Url,
}

impl FakeStoreClient {
    /// Create a client with default HTTP settings.
    ///
    /// # Errors
    /// Returns an error if `base_url` is not an absolute hierarchical URL.
    pub fn new(base_url: &str) -> Result<Self, CatalogError> {
        Ok(Self {
            http: HttpClient::new(),
            base_url: parse_base_url(base_url)?,
        })
    }

    /// Create a client using configured timeouts.
    ///
    /// # Errors
    /// Returns an error if the configured base URL is invalid.
    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let http = HttpClient::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Ok(Self {
            http,
            base_url: parse_base_url(&config.base_url)?,
        })
    }

    /// Base URL joined with percent-encoded path segments.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, CatalogError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| CatalogError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_body(&self, url: Url) -> Result<Vec<u8>, CatalogError> {
        info!(url = %url, "Fetching from catalog");

        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    async fn get_json<T>(&self, url: Url) -> Result<T, CatalogError>
    where
        T: DeserializeOwned,
    {
        let body = self.get_body(url).await?;
        decode(&body)
    }
}

fn parse_base_url(base_url: &str) -> Result<Url, CatalogError> {
    let url = Url::parse(base_url)?;
    if url.cannot_be_a_base() {
        return Err(CatalogError::Url(
            url::ParseError::RelativeUrlWithCannotBeABaseBase,
        ));
    }
    Ok(url)
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, CatalogError> {
    serde_json::from_slice(body).map_err(|e| CatalogError::Decode(e.to_string()))
}

/// Decode a single-product body; the API answers an unknown id with an
/// empty body or `null` rather than 404.
fn decode_product(id: ProductId, body: &[u8]) -> Result<Product, CatalogError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(CatalogError::NotFound(id));
    }
    let dto: Option<ProductDto> = decode(body)?;
    let dto = dto.ok_or(CatalogError::NotFound(id))?;
    to_product(dto)
}

fn to_product(dto: ProductDto) -> Result<Product, CatalogError> {
    Product::try_from(dto).map_err(|e| CatalogError::Decode(e.to_string()))
}

fn to_products(dtos: Vec<ProductDto>) -> Result<Vec<Product>, CatalogError> {
    dtos.into_iter().map(to_product).collect()
}

#[async_trait]
impl Catalog for FakeStoreClient {
    async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        let url = self.endpoint(&["products"])?;
        let products: Vec<ProductDto> = self.get_json(url).await?;
        debug!(count = products.len(), "Fetched products");
        to_products(products)
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let id_segment = id.to_string();
        let url = self.endpoint(&["products", &id_segment])?;
        let body = self.get_body(url).await?;
        decode_product(id, &body)
    }

    async fn list_categories(&self) -> Result<Vec<String>, CatalogError> {
        let url = self.endpoint(&["products", "categories"])?;
        let categories: Vec<String> = self.get_json(url).await?;
        debug!(count = categories.len(), "Fetched categories");
        Ok(categories)
    }

    async fn list_products_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<Product>, CatalogError> {
        let url = self.endpoint(&["products", "category", category])?;
        let products: Vec<ProductDto> = self.get_json(url).await?;
        debug!(category, count = products.len(), "Fetched products by category");
        to_products(products)
    }
}
