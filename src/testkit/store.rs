//! Cart store wrapper with injectable failures.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::adapter::outbound::memory::MemoryCartStore;
use crate::domain::{CartLine, CartSnapshot, ProductId};
use crate::error::{Result, StoreError};
use crate::port::outbound::store::CartStore;

/// In-memory store whose reads and writes can be switched to fail.
#[derive(Default)]
pub struct FailingCartStore {
    inner: MemoryCartStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FailingCartStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check(&self, flag: &AtomicBool, op: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Database(format!("injected {op} failure")).into());
        }
        Ok(())
    }
}

#[async_trait]
impl CartStore for FailingCartStore {
    async fn get_all(&self) -> Result<Vec<CartLine>> {
        self.check(&self.fail_reads, "read")?;
        self.inner.get_all().await
    }

    fn subscribe(&self) -> broadcast::Receiver<CartSnapshot> {
        self.inner.subscribe()
    }

    async fn get(&self, product_id: ProductId) -> Result<Option<CartLine>> {
        self.check(&self.fail_reads, "read")?;
        self.inner.get(product_id).await
    }

    async fn upsert(&self, line: &CartLine) -> Result<()> {
        self.check(&self.fail_writes, "write")?;
        self.inner.upsert(line).await
    }

    async fn delete(&self, product_id: ProductId) -> Result<bool> {
        self.check(&self.fail_writes, "write")?;
        self.inner.delete(product_id).await
    }

    async fn delete_all(&self) -> Result<usize> {
        self.check(&self.fail_writes, "write")?;
        self.inner.delete_all().await
    }

    fn close(&self) {
        self.inner.close();
    }
}
