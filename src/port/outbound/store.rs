//! Persistence port for cart lines.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::{CartLine, CartSnapshot, ProductId};
use crate::error::Result;

/// Durable table of cart lines keyed by product id.
///
/// Every mutation is atomic for its key. After each successful mutation the
/// store publishes the fresh full snapshot to every receiver obtained from
/// [`CartStore::subscribe`]; published snapshots are totally ordered and
/// equal a fresh [`CartStore::get_all`] taken at that instant.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// All current lines.
    async fn get_all(&self) -> Result<Vec<CartLine>>;

    /// Receive a snapshot after every committed change.
    ///
    /// The receiver reports `Closed` once the store has been shut down.
    fn subscribe(&self) -> broadcast::Receiver<CartSnapshot>;

    /// Line for a product, if present.
    async fn get(&self, product_id: ProductId) -> Result<Option<CartLine>>;

    /// Insert the line, replacing any line with the same product id.
    async fn upsert(&self, line: &CartLine) -> Result<()>;

    /// Delete a line. Returns whether a line existed.
    async fn delete(&self, product_id: ProductId) -> Result<bool>;

    /// Delete every line. Returns the number deleted.
    async fn delete_all(&self) -> Result<usize>;

    /// Stop accepting work and end every active subscription.
    fn close(&self);
}
