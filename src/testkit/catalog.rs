//! Scriptable in-memory catalog.
//!
//! Requests are keyed as `products`, `categories`, `category:<name>` and
//! `product:<id>`. Any key can be made to fail, or held until the test
//! releases it, which lets tests force a specific completion order.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::domain::{Product, ProductId};
use crate::error::CatalogError;
use crate::port::outbound::catalog::Catalog;

/// Handle that lets one held request proceed.
pub struct Gate {
    notify: Arc<Notify>,
}

impl Gate {
    /// Let the held request complete.
    pub fn release(&self) {
        self.notify.notify_one();
    }
}

#[derive(Default)]
struct Script {
    products: Vec<Product>,
    categories: Vec<String>,
    failures: HashMap<String, String>,
}

/// Catalog whose responses are scripted by the test.
#[derive(Default)]
pub struct StubCatalog {
    script: Mutex<Script>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    calls: Mutex<Vec<String>>,
}

impl StubCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog serving `products`; categories are derived from them.
    pub fn with_products(products: Vec<Product>) -> Self {
        let stub = Self::new();
        stub.set_products(products);
        stub
    }

    /// Replace the product list and derive categories in first-seen order.
    pub fn set_products(&self, products: Vec<Product>) {
        let mut categories: Vec<String> = Vec::new();
        for product in &products {
            if !categories.contains(&product.category) {
                categories.push(product.category.clone());
            }
        }
        let mut script = self.script.lock();
        script.products = products;
        script.categories = categories;
    }

    /// Make every request for `key` fail with `message`.
    pub fn fail(&self, key: &str, message: &str) {
        self.script
            .lock()
            .failures
            .insert(key.to_string(), message.to_string());
    }

    /// Stop failing requests for `key`.
    pub fn succeed(&self, key: &str) {
        self.script.lock().failures.remove(key);
    }

    /// Hold the next request for `key` until the returned gate is released.
    pub fn hold(&self, key: &str) -> Gate {
        let notify = Arc::new(Notify::new());
        self.gates.lock().insert(key.to_string(), Arc::clone(&notify));
        Gate { notify }
    }

    /// Keys of every request received so far, in arrival order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    async fn respond(&self, key: String) -> Result<(), CatalogError> {
        self.calls.lock().push(key.clone());

        let gate = self.gates.lock().remove(&key);
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let failure = self.script.lock().failures.get(&key).cloned();
        match failure {
            Some(message) => Err(CatalogError::Unavailable(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Catalog for StubCatalog {
    async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        self.respond("products".into()).await?;
        Ok(self.script.lock().products.clone())
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.respond(format!("product:{id}")).await?;
        self.script
            .lock()
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(CatalogError::NotFound(id))
    }

    async fn list_categories(&self) -> Result<Vec<String>, CatalogError> {
        self.respond("categories".into()).await?;
        Ok(self.script.lock().categories.clone())
    }

    async fn list_products_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<Product>, CatalogError> {
        self.respond(format!("category:{category}")).await?;
        Ok(self
            .script
            .lock()
            .products
            .iter()
            .filter(|p| p.category == category)
            .cloned()
            .collect())
    }
}
