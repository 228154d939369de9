//! Product listing screen state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::StreamExt;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use super::scope::TaskScope;
use crate::application::cart::CartService;
use crate::domain::{CartLine, CategoryFilter, Product, ALL_CATEGORIES};
use crate::error::Result;
use crate::port::outbound::catalog::Catalog;

/// What the listing screen renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingState {
    pub products: Vec<Product>,
    /// `"All"` followed by the catalog's categories, or empty until loaded.
    pub categories: Vec<String>,
    pub selected: CategoryFilter,
    pub is_loading: bool,
    /// Last product fetch failure. Category failures never land here.
    pub error: Option<String>,
    /// Total units in the cart.
    pub cart_badge: i64,
}

/// Drives the product listing.
///
/// Product and category fetches are independent: each only writes its own
/// part of the state. Selecting a category supersedes any product fetch
/// still in flight.
pub struct ListingAdapter {
    catalog: Arc<dyn Catalog>,
    cart: CartService,
    state: Arc<watch::Sender<ListingState>>,
    /// Token of the most recent product fetch.
    latest: Arc<AtomicU64>,
    in_flight: Mutex<Option<AbortHandle>>,
    scope: TaskScope,
}

impl ListingAdapter {
    pub fn new(catalog: Arc<dyn Catalog>, cart: CartService) -> Self {
        let (state, _) = watch::channel(ListingState::default());
        Self {
            catalog,
            cart,
            state: Arc::new(state),
            latest: Arc::new(AtomicU64::new(0)),
            in_flight: Mutex::new(None),
            scope: TaskScope::new(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ListingState> {
        self.state.subscribe()
    }

    /// Copy of the current state.
    pub fn state(&self) -> ListingState {
        self.state.borrow().clone()
    }

    /// Start the screen: fetch products and categories, and follow the cart.
    ///
    /// Calling this again restarts all background work.
    pub fn activate(&self) {
        self.scope.shutdown();
        info!("Activating product listing");
        self.load_categories();
        self.follow_cart();
        let selected = self.state.borrow().selected.clone();
        self.fetch_products(selected);
    }

    /// Show only `filter`'s products. [`CategoryFilter::All`] lists everything.
    pub fn select_category(&self, filter: CategoryFilter) {
        debug!(category = %filter, "Category selected");
        self.state.send_modify(|s| s.selected = filter.clone());
        self.fetch_products(filter);
    }

    /// Re-issue the product fetch for the current selection.
    pub fn retry(&self) {
        let selected = self.state.borrow().selected.clone();
        self.fetch_products(selected);
    }

    /// Stop all background work. Pending responses are discarded.
    pub fn deactivate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
        self.in_flight.lock().take();
        self.scope.shutdown();
        self.state.send_if_modified(|s| std::mem::replace(&mut s.is_loading, false));
    }

    /// Add one unit of `product` to the cart.
    ///
    /// # Errors
    /// Propagates cart store failures.
    pub async fn add_to_cart(&self, product: &Product) -> Result<CartLine> {
        self.cart.add_one(product).await
    }

    fn fetch_products(&self, filter: CategoryFilter) {
        let mut in_flight = self.in_flight.lock();
        if let Some(previous) = in_flight.take() {
            previous.abort();
        }

        let token = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });

        let catalog = Arc::clone(&self.catalog);
        let state = Arc::clone(&self.state);
        let latest = Arc::clone(&self.latest);

        *in_flight = Some(self.scope.spawn(async move {
            let result = match &filter {
                CategoryFilter::All => catalog.list_products().await,
                CategoryFilter::Named(category) => {
                    catalog.list_products_by_category(category).await
                }
            };

            state.send_if_modified(|s| {
                if latest.load(Ordering::SeqCst) != token {
                    debug!(token, category = %filter, "Discarding superseded product response");
                    return false;
                }
                s.is_loading = false;
                match result {
                    Ok(products) => {
                        debug!(count = products.len(), category = %filter, "Products loaded");
                        s.products = products;
                        s.error = None;
                    }
                    Err(e) => {
                        warn!(error = %e, category = %filter, "Product fetch failed");
                        s.error = Some(e.to_string());
                    }
                }
                true
            });
        }));
    }

    fn load_categories(&self) {
        let catalog = Arc::clone(&self.catalog);
        let state = Arc::clone(&self.state);

        self.scope.spawn(async move {
            match catalog.list_categories().await {
                Ok(categories) => {
                    debug!(count = categories.len(), "Categories loaded");
                    state.send_modify(|s| {
                        s.categories = std::iter::once(ALL_CATEGORIES.to_string())
                            .chain(categories)
                            .collect();
                    });
                }
                Err(e) => warn!(error = %e, "Category fetch failed"),
            }
        });
    }

    fn follow_cart(&self) {
        let updates = self.cart.observe_cart();
        let state = Arc::clone(&self.state);

        self.scope.spawn(async move {
            tokio::pin!(updates);
            while let Some(update) = updates.next().await {
                match update {
                    Ok(snapshot) => {
                        let badge = snapshot.item_count();
                        state.send_if_modified(|s| {
                            if s.cart_badge == badge {
                                return false;
                            }
                            s.cart_badge = badge;
                            true
                        });
                    }
                    Err(e) => warn!(error = %e, "Cart badge stopped updating"),
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::adapter::outbound::memory::MemoryCartStore;
    use crate::testkit::catalog::StubCatalog;
    use crate::testkit::domain::product_in;
    use rust_decimal_macros::dec;

    async fn drained(scope: &TaskScope) {
        for _ in 0..200 {
            if scope.active() == 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("background tasks never finished");
    }

    #[tokio::test]
    async fn response_finishing_after_newer_fetch_is_discarded() {
        let catalog = Arc::new(StubCatalog::with_products(vec![
            product_in(1, dec!(10), "electronics"),
            product_in(2, dec!(20), "jewelery"),
        ]));
        let cart = CartService::new(Arc::new(MemoryCartStore::new()));
        let listing = ListingAdapter::new(catalog.clone(), cart);
        let mut rx = listing.subscribe();
        let slow = catalog.hold("category:jewelery");

        listing.select_category(CategoryFilter::from_label("jewelery"));
        // Detached, the older fetch runs to completion instead of being aborted.
        listing.in_flight.lock().take();
        listing.select_category(CategoryFilter::All);
        rx.wait_for(|s| !s.is_loading).await.unwrap();

        slow.release();
        drained(&listing.scope).await;

        let state = listing.state();
        let ids: Vec<i64> = state.products.iter().map(|p| p.id.get()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(state.selected, CategoryFilter::All);
        assert!(!state.is_loading);
        assert!(catalog.calls().contains(&"category:jewelery".to_string()));
    }
}
