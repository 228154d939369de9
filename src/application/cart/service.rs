//! Cart mutation and observation service.
//!
//! The service holds no copy of the cart. Every mutation goes straight to
//! the [`CartStore`], and observers are fed from the store's own snapshot
//! channel, so the cart seen by any consumer is always what was committed.
//!
//! Mutations pass through a FIFO write gate. Each store operation is atomic
//! on its own, but `add_to_cart` and `update_quantity` read a line before
//! writing it back, and two of those interleaving would lose an increment.
//! Every write is checked against the cart total so a stored cart can always
//! be priced.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use futures_util::Stream;
use tokio::sync::{broadcast::error::RecvError, Mutex};
use tracing::{debug, info, warn};

use crate::domain::{CartLine, CartSnapshot, DomainError, Product, ProductId};
use crate::error::{Result, StoreError};
use crate::port::outbound::store::CartStore;

/// Shared handle to the cart. Cheap to clone.
#[derive(Clone)]
pub struct CartService {
    store: Arc<dyn CartStore>,
    write_gate: Arc<Mutex<()>>,
}

impl CartService {
    /// Create a service over the given store.
    pub fn new(store: Arc<dyn CartStore>) -> Self {
        Self {
            store,
            write_gate: Arc::new(Mutex::new(())),
        }
    }

    /// Add `quantity` units of `product`.
    ///
    /// Merges into the existing line if there is one; otherwise creates a line
    /// caching the product's title, price and image. Returns the stored line.
    ///
    /// # Errors
    /// `DomainError::NonPositiveQuantity` for a zero quantity (nothing is
    /// written), `DomainError::QuantityOverflow` if the line quantity or the
    /// cart total would overflow, or a store error.
    pub async fn add_to_cart(&self, product: &Product, quantity: u32) -> Result<CartLine> {
        if quantity == 0 {
            return Err(DomainError::NonPositiveQuantity { quantity: 0 }.into());
        }
        let added = i32::try_from(quantity)
            .map_err(|_| DomainError::QuantityOverflow { product_id: product.id })?;

        let _gate = self.write_gate.lock().await;
        let current = self.snapshot().await?;
        let line = match current.line(product.id).cloned() {
            Some(existing) => {
                let total = existing
                    .quantity
                    .checked_add(added)
                    .ok_or(DomainError::QuantityOverflow { product_id: product.id })?;
                existing.with_quantity(total)
            }
            None => CartLine::from_product(product, added, Utc::now()),
        };

        ensure_priceable(&current, &line)?;
        debug!(product_id = %product.id, added, quantity = line.quantity, "Adding to cart");
        self.store.upsert(&line).await?;
        Ok(line)
    }

    /// Add a single unit of `product`.
    ///
    /// # Errors
    /// Propagates store failures.
    pub async fn add_one(&self, product: &Product) -> Result<CartLine> {
        self.add_to_cart(product, 1).await
    }

    /// Set a line's quantity. A quantity of zero or less removes the line.
    ///
    /// Does nothing if the product is not in the cart. Returns the stored
    /// line, or `None` when no line remains.
    ///
    /// # Errors
    /// `DomainError::QuantityOverflow` for quantities beyond the storage
    /// range or a cart total that would overflow, or a store error.
    pub async fn update_quantity(
        &self,
        product_id: ProductId,
        new_quantity: i64,
    ) -> Result<Option<CartLine>> {
        let _gate = self.write_gate.lock().await;
        let current = self.snapshot().await?;
        let Some(existing) = current.line(product_id).cloned() else {
            debug!(product_id = %product_id, "Quantity update for product not in cart");
            return Ok(None);
        };

        if new_quantity <= 0 {
            debug!(product_id = %product_id, new_quantity, "Quantity driven to zero, removing line");
            self.store.delete(product_id).await?;
            return Ok(None);
        }

        let quantity = i32::try_from(new_quantity)
            .map_err(|_| DomainError::QuantityOverflow { product_id })?;
        let line = existing.with_quantity(quantity);
        ensure_priceable(&current, &line)?;
        self.store.upsert(&line).await?;
        Ok(Some(line))
    }

    /// Remove a product's line. Missing products are not an error.
    ///
    /// Returns whether a line was removed.
    ///
    /// # Errors
    /// Propagates store failures.
    pub async fn remove_from_cart(&self, product_id: ProductId) -> Result<bool> {
        let _gate = self.write_gate.lock().await;
        let removed = self.store.delete(product_id).await?;
        debug!(product_id = %product_id, removed, "Removed from cart");
        Ok(removed)
    }

    /// Remove every line. Returns how many were removed.
    ///
    /// # Errors
    /// Propagates store failures.
    pub async fn clear_cart(&self) -> Result<usize> {
        let _gate = self.write_gate.lock().await;
        let removed = self.store.delete_all().await?;
        info!(removed, "Cart cleared");
        Ok(removed)
    }

    /// Write a line built outside the service.
    ///
    /// A non-positive quantity is never persisted: the line is deleted
    /// instead. Returns the stored line, or `None` when no line remains.
    ///
    /// # Errors
    /// `DomainError::QuantityOverflow` if the cart total would overflow, or a
    /// store error.
    pub async fn put_line(&self, line: CartLine) -> Result<Option<CartLine>> {
        let _gate = self.write_gate.lock().await;
        if !line.is_persistable() {
            warn!(
                product_id = %line.product_id,
                quantity = line.quantity,
                "Refusing to store non-positive quantity, deleting line"
            );
            self.store.delete(line.product_id).await?;
            return Ok(None);
        }
        ensure_priceable(&self.snapshot().await?, &line)?;
        self.store.upsert(&line).await?;
        Ok(Some(line))
    }

    /// Empty the cart once `settle` completes and return what was in it.
    ///
    /// Other mutations queue behind the write gate until the cart has been
    /// emptied, so the returned lines are exactly the lines removed. `settle`
    /// is not run for an empty cart, which is returned as is.
    ///
    /// # Errors
    /// Propagates store failures. The cart is left untouched if reading it
    /// fails.
    pub async fn take_cart<F>(&self, settle: F) -> Result<CartSnapshot>
    where
        F: Future<Output = ()>,
    {
        let _gate = self.write_gate.lock().await;
        let taken = self.snapshot().await?;
        if taken.is_empty() {
            return Ok(taken);
        }

        settle.await;
        let removed = self.store.delete_all().await?;
        info!(removed, "Cart taken");
        Ok(taken)
    }

    /// Current cart contents.
    ///
    /// # Errors
    /// Propagates store failures.
    pub async fn snapshot(&self) -> Result<CartSnapshot> {
        Ok(CartSnapshot::new(self.store.get_all().await?))
    }

    /// Live view of the cart.
    ///
    /// Yields the current snapshot first, then one snapshot per committed
    /// change. Each call gets an independent stream; dropping it
    /// unsubscribes. If the store becomes unavailable the stream yields a
    /// final error and ends.
    pub fn observe_cart(&self) -> impl Stream<Item = Result<CartSnapshot>> + Send + 'static {
        let store = Arc::clone(&self.store);

        async_stream::stream! {
            // Subscribe before the initial read so no commit falls in between.
            let mut rx = store.subscribe();

            let initial = match store.get_all().await {
                Ok(lines) => CartSnapshot::new(lines),
                Err(e) => {
                    warn!(error = %e, "Initial cart read failed");
                    yield Err(e);
                    return;
                }
            };
            // A commit between subscribing and the read is already in `initial`.
            let mut unconfirmed = Some(initial.clone());
            yield Ok(initial);

            loop {
                match rx.recv().await {
                    Ok(snapshot) => {
                        if unconfirmed.take().is_some_and(|initial| initial == snapshot) {
                            continue;
                        }
                        yield Ok(snapshot);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Cart observer lagged, some snapshots missed");
                    }
                    Err(RecvError::Closed) => {
                        warn!("Cart store closed, ending observation");
                        yield Err(StoreError::Unavailable.into());
                        return;
                    }
                }
            }
        }
    }
}

fn ensure_priceable(current: &CartSnapshot, line: &CartLine) -> Result<()> {
    if current.checked_total_with(line).is_none() {
        return Err(DomainError::QuantityOverflow {
            product_id: line.product_id,
        }
        .into());
    }
    Ok(())
}
