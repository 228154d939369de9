//! Product detail screen state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

use super::scope::TaskScope;
use crate::application::cart::CartService;
use crate::domain::{CartLine, Product, ProductId};
use crate::error::Result;
use crate::port::outbound::catalog::Catalog;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailState {
    pub product: Option<Product>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Loads one product and adds it to the cart on request.
pub struct DetailAdapter {
    catalog: Arc<dyn Catalog>,
    cart: CartService,
    state: Arc<watch::Sender<DetailState>>,
    latest: Arc<AtomicU64>,
    in_flight: Mutex<Option<AbortHandle>>,
    scope: TaskScope,
}

impl DetailAdapter {
    pub fn new(catalog: Arc<dyn Catalog>, cart: CartService) -> Self {
        let (state, _) = watch::channel(DetailState::default());
        Self {
            catalog,
            cart,
            state: Arc::new(state),
            latest: Arc::new(AtomicU64::new(0)),
            in_flight: Mutex::new(None),
            scope: TaskScope::new(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> DetailState {
        self.state.borrow().clone()
    }

    /// Fetch product `id`, superseding any load still in flight.
    ///
    /// A previously shown product is kept while the same id reloads and
    /// cleared when switching to a different one.
    pub fn load(&self, id: ProductId) {
        let mut in_flight = self.in_flight.lock();
        if let Some(previous) = in_flight.take() {
            previous.abort();
        }

        let token = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
            if s.product.as_ref().map(|p| p.id) != Some(id) {
                s.product = None;
            }
        });

        let catalog = Arc::clone(&self.catalog);
        let state = Arc::clone(&self.state);
        let latest = Arc::clone(&self.latest);

        *in_flight = Some(self.scope.spawn(async move {
            let result = catalog.get_product(id).await;

            state.send_if_modified(|s| {
                if latest.load(Ordering::SeqCst) != token {
                    debug!(product_id = %id, "Discarding superseded product response");
                    return false;
                }
                s.is_loading = false;
                match result {
                    Ok(product) => s.product = Some(product),
                    Err(e) => {
                        warn!(product_id = %id, error = %e, "Product fetch failed");
                        s.error = Some(e.to_string());
                    }
                }
                true
            });
        }));
    }

    /// Add one unit of the loaded product to the cart.
    ///
    /// Returns `Ok(None)` without touching the cart when nothing is loaded.
    ///
    /// # Errors
    /// Propagates cart store failures.
    pub async fn add_to_cart(&self) -> Result<Option<CartLine>> {
        let product = self.state.borrow().product.clone();
        match product {
            Some(product) => self.cart.add_one(&product).await.map(Some),
            None => Ok(None),
        }
    }

    /// Stop any pending load. Its response is discarded.
    pub fn deactivate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
        self.in_flight.lock().take();
        self.scope.shutdown();
        self.state.send_if_modified(|s| std::mem::replace(&mut s.is_loading, false));
    }
}
