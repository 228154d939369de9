//! Cart screen state.

use futures_util::StreamExt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::warn;

use super::scope::TaskScope;
use crate::application::cart::CartService;
use crate::domain::{CartLine, CartSnapshot, ProductId};
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartScreenState {
    pub snapshot: CartSnapshot,
    /// True until the first snapshot arrives after activation.
    pub is_loading: bool,
    /// Set when the cart can no longer be observed.
    pub error: Option<String>,
}

/// Mirrors the persisted cart for the cart screen.
pub struct CartScreenAdapter {
    cart: CartService,
    state: Arc<watch::Sender<CartScreenState>>,
    scope: TaskScope,
}

impl CartScreenAdapter {
    pub fn new(cart: CartService) -> Self {
        let (state, _) = watch::channel(CartScreenState::default());
        Self {
            cart,
            state: Arc::new(state),
            scope: TaskScope::new(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<CartScreenState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> CartScreenState {
        self.state.borrow().clone()
    }

    /// Start following the cart. Calling again restarts the subscription.
    pub fn activate(&self) {
        self.scope.shutdown();
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });

        let updates = self.cart.observe_cart();
        let state = Arc::clone(&self.state);
        self.scope.spawn(async move {
            tokio::pin!(updates);
            while let Some(update) = updates.next().await {
                state.send_modify(|s| {
                    s.is_loading = false;
                    match update {
                        Ok(snapshot) => {
                            s.snapshot = snapshot;
                            s.error = None;
                        }
                        Err(e) => {
                            warn!(error = %e, "Cart observation failed");
                            s.error = Some(e.to_string());
                        }
                    }
                });
            }
        });
    }

    /// Stop following the cart. The last snapshot stays visible.
    pub fn deactivate(&self) {
        self.scope.shutdown();
    }

    /// # Errors
    /// Propagates cart store failures.
    pub async fn update_quantity(
        &self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Option<CartLine>> {
        self.cart.update_quantity(product_id, quantity).await
    }

    /// # Errors
    /// Propagates cart store failures.
    pub async fn remove_item(&self, product_id: ProductId) -> Result<bool> {
        self.cart.remove_from_cart(product_id).await
    }

    /// # Errors
    /// Propagates cart store failures.
    pub async fn clear_cart(&self) -> Result<usize> {
        self.cart.clear_cart().await
    }
}
