//! Thread-safe in-memory cart store with snapshot notifications.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::{CartLine, CartSnapshot, ProductId};
use crate::error::{Result, StoreError};
use crate::port::outbound::store::CartStore;

/// Default broadcast buffer for snapshot notifications.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Cart store that lives only as long as the process.
pub struct MemoryCartStore {
    lines: RwLock<HashMap<ProductId, CartLine>>,
    /// `None` once the store has been closed.
    tx: Mutex<Option<broadcast::Sender<CartSnapshot>>>,
}

impl MemoryCartStore {
    /// Create an empty store with the default notification buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create an empty store whose subscribers buffer `capacity` snapshots.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            lines: RwLock::new(HashMap::new()),
            tx: Mutex::new(Some(tx)),
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.tx.lock().is_none() {
            return Err(StoreError::Unavailable.into());
        }
        Ok(())
    }

    /// Apply a mutation and publish the resulting snapshot.
    ///
    /// The write lock is held across the publish so snapshots reach
    /// subscribers in commit order.
    fn mutate<T>(&self, f: impl FnOnce(&mut HashMap<ProductId, CartLine>) -> T) -> Result<T> {
        self.ensure_open()?;
        let mut lines = self.lines.write();
        let out = f(&mut lines);
        let snapshot = CartSnapshot::new(lines.values().cloned().collect());

        // No receivers is fine.
        if let Some(tx) = self.tx.lock().as_ref() {
            let _ = tx.send(snapshot);
        }
        Ok(out)
    }

    /// Number of lines currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.read().len()
    }

    /// Returns true if the store holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryCartStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CartStore for MemoryCartStore {
    async fn get_all(&self) -> Result<Vec<CartLine>> {
        self.ensure_open()?;
        Ok(CartSnapshot::new(self.lines.read().values().cloned().collect()).into_lines())
    }

    fn subscribe(&self) -> broadcast::Receiver<CartSnapshot> {
        match self.tx.lock().as_ref() {
            Some(tx) => tx.subscribe(),
            None => {
                // Sender dropped at end of scope, so the receiver reports Closed.
                let (_, rx) = broadcast::channel(1);
                rx
            }
        }
    }

    async fn get(&self, product_id: ProductId) -> Result<Option<CartLine>> {
        self.ensure_open()?;
        Ok(self.lines.read().get(&product_id).cloned())
    }

    async fn upsert(&self, line: &CartLine) -> Result<()> {
        let line = line.clone();
        debug!(product_id = %line.product_id, quantity = line.quantity, "Upserting cart line");
        self.mutate(move |lines| {
            lines.insert(line.product_id, line);
        })
    }

    async fn delete(&self, product_id: ProductId) -> Result<bool> {
        self.mutate(|lines| lines.remove(&product_id).is_some())
    }

    async fn delete_all(&self) -> Result<usize> {
        self.mutate(|lines| {
            let count = lines.len();
            lines.clear();
            count
        })
    }

    fn close(&self) {
        self.tx.lock().take();
    }
}
