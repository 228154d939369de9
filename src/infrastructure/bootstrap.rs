//! Composition root: builds the store, catalog and services from config.

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::fakestore::FakeStoreClient;
use crate::adapter::outbound::memory::MemoryCartStore;
use crate::adapter::outbound::sqlite::database::connection::{
    create_pool, database_url, run_migrations,
};
use crate::adapter::outbound::sqlite::SqliteCartStore;
use crate::application::cart::CartService;
use crate::application::checkout::CheckoutService;
use crate::application::presentation::{CartScreenAdapter, DetailAdapter, ListingAdapter};
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::catalog::Catalog;
use crate::port::outbound::store::CartStore;

/// Build the cart store selected by configuration.
///
/// `ephemeral` forces an in-process store regardless of `database`.
///
/// # Errors
/// Returns an error if the database cannot be opened or migrated.
pub fn build_store(config: &Config, ephemeral: bool) -> Result<Arc<dyn CartStore>> {
    if ephemeral {
        info!("Using ephemeral in-memory cart");
        return Ok(Arc::new(MemoryCartStore::with_capacity(
            config.cart.channel_capacity,
        )));
    }

    let url = database_url(&config.database);
    let pool = create_pool(&url)?;
    run_migrations(&pool)?;
    info!(database = %config.database, "Cart database ready");
    Ok(Arc::new(SqliteCartStore::new(
        pool,
        config.cart.channel_capacity,
    )))
}

/// Build the remote catalog client.
///
/// # Errors
/// Returns an error if the configured base URL is invalid.
pub fn build_catalog(config: &Config) -> Result<Arc<dyn Catalog>> {
    Ok(Arc::new(FakeStoreClient::from_config(&config.catalog)?))
}

/// Wired application.
///
/// One store and one cart service are shared by everything built from it,
/// so every adapter observes the same cart.
pub struct Storefront {
    config: Config,
    store: Arc<dyn CartStore>,
    catalog: Arc<dyn Catalog>,
    cart: CartService,
}

impl Storefront {
    /// Build from configuration.
    ///
    /// # Errors
    /// Returns an error if the store or catalog cannot be built.
    pub fn build(config: Config, ephemeral: bool) -> Result<Self> {
        let store = build_store(&config, ephemeral)?;
        let catalog = build_catalog(&config)?;
        Ok(Self::from_parts(config, store, catalog))
    }

    /// Wire pre-built adapters.
    pub fn from_parts(config: Config, store: Arc<dyn CartStore>, catalog: Arc<dyn Catalog>) -> Self {
        let cart = CartService::new(Arc::clone(&store));
        Self {
            config,
            store,
            catalog,
            cart,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &Arc<dyn Catalog> {
        &self.catalog
    }

    pub fn cart(&self) -> &CartService {
        &self.cart
    }

    pub fn checkout(&self) -> CheckoutService {
        CheckoutService::new(self.cart.clone(), self.config.checkout.processing_delay())
    }

    pub fn listing(&self) -> ListingAdapter {
        ListingAdapter::new(Arc::clone(&self.catalog), self.cart.clone())
    }

    pub fn detail(&self) -> DetailAdapter {
        DetailAdapter::new(Arc::clone(&self.catalog), self.cart.clone())
    }

    pub fn cart_screen(&self) -> CartScreenAdapter {
        CartScreenAdapter::new(self.cart.clone())
    }

    /// Close the store. Cart observers receive a final error.
    pub fn shutdown(&self) {
        self.store.close();
    }
}
