//! SQLite cart store implementation.
//!
//! Provides persistent storage for cart lines using SQLite and Diesel ORM.
//! Diesel calls block, so every operation runs on the Tokio blocking pool.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tokio::sync::broadcast;
use tracing::debug;

use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::adapter::outbound::sqlite::database::model::CartLineRow;
use crate::adapter::outbound::sqlite::database::schema::cart_lines;
use crate::domain::{CartLine, CartSnapshot, ProductId};
use crate::error::{Error, Result, StoreError};
use crate::port::outbound::store::CartStore;

/// SQLite-backed cart store.
///
/// Implements the [`CartStore`] trait. Writes are serialized by a
/// store-wide lock that also covers the post-commit re-read and publish.
pub struct SqliteCartStore {
    inner: Arc<Inner>,
}

struct Inner {
    /// Database connection pool.
    pool: DbPool,
    /// `None` once the store has been closed.
    tx: Mutex<Option<broadcast::Sender<CartSnapshot>>>,
    write: Mutex<()>,
}

impl SqliteCartStore {
    /// Create a new SQLite cart store with the given connection pool.
    ///
    /// The pool's schema must already be migrated.
    #[must_use]
    pub fn new(pool: DbPool, channel_capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(channel_capacity.max(1));
        Self {
            inner: Arc::new(Inner {
                pool,
                tx: Mutex::new(Some(tx)),
                write: Mutex::new(()),
            }),
        }
    }

    fn to_row(line: &CartLine) -> CartLineRow {
        CartLineRow {
            product_id: line.product_id.get(),
            title: line.title.clone(),
            price: line.price.to_string(),
            image: line.image.clone(),
            quantity: line.quantity,
            added_at: line.added_at.to_rfc3339_opts(SecondsFormat::Nanos, true),
        }
    }

    fn from_row(row: CartLineRow) -> Result<CartLine> {
        let price = Decimal::from_str(&row.price).map_err(|e| {
            StoreError::Corrupt(format!("price {:?} for product {}: {e}", row.price, row.product_id))
        })?;
        let added_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&row.added_at)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?
            .with_timezone(&Utc);

        Ok(CartLine {
            product_id: ProductId::new(row.product_id),
            title: row.title,
            price,
            image: row.image,
            quantity: row.quantity,
            added_at,
        })
    }

    /// Run a read on the blocking pool.
    async fn read<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            inner.ensure_open()?;
            let mut conn = inner.connection()?;
            op(&mut *conn)
        })
        .await?
    }

    /// Run a mutation on the blocking pool and publish the new snapshot.
    async fn mutate<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> QueryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || inner.mutate_blocking(op)).await?
    }
}

impl Inner {
    fn connection(
        &self,
    ) -> Result<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<SqliteConnection>>>
    {
        self.pool
            .get()
            .map_err(|e| StoreError::Connection(e.to_string()).into())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.tx.lock().is_none() {
            return Err(StoreError::Unavailable.into());
        }
        Ok(())
    }

    fn mutate_blocking<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> QueryResult<T>,
    {
        let _guard = self.write.lock();
        let tx = self.tx.lock().clone().ok_or(StoreError::Unavailable)?;
        let mut pooled = self.connection()?;
        let conn: &mut SqliteConnection = &mut pooled;

        // A failed re-read rolls the write back, so an error always means
        // nothing changed.
        let (out, lines) = conn.transaction::<_, Error, _>(|conn| {
            let out = op(conn).map_err(|e| StoreError::Database(e.to_string()))?;
            Ok((out, load_all(conn)?))
        })?;
        let snapshot = CartSnapshot::new(lines);

        // No receivers is fine.
        let _ = tx.send(snapshot);
        Ok(out)
    }
}

fn load_all(conn: &mut SqliteConnection) -> Result<Vec<CartLine>> {
    let rows: Vec<CartLineRow> = cart_lines::table
        .select(CartLineRow::as_select())
        .order((cart_lines::added_at.asc(), cart_lines::product_id.asc()))
        .load(conn)
        .map_err(|e| StoreError::Database(e.to_string()))?;

    rows.into_iter().map(SqliteCartStore::from_row).collect()
}

#[async_trait]
impl CartStore for SqliteCartStore {
    async fn get_all(&self) -> Result<Vec<CartLine>> {
        self.read(load_all).await
    }

    fn subscribe(&self) -> broadcast::Receiver<CartSnapshot> {
        match self.inner.tx.lock().as_ref() {
            Some(tx) => tx.subscribe(),
            None => {
                // Sender is dropped immediately, so the receiver reports Closed.
                let (_, rx) = broadcast::channel(1);
                rx
            }
        }
    }

    async fn get(&self, product_id: ProductId) -> Result<Option<CartLine>> {
        self.read(move |conn| {
            let row: Option<CartLineRow> = cart_lines::table
                .find(product_id.get())
                .select(CartLineRow::as_select())
                .first(conn)
                .optional()
                .map_err(|e| StoreError::Database(e.to_string()))?;

            row.map(SqliteCartStore::from_row).transpose()
        })
        .await
    }

    async fn upsert(&self, line: &CartLine) -> Result<()> {
        let row = Self::to_row(line);
        debug!(product_id = row.product_id, quantity = row.quantity, "Upserting cart line");
        self.mutate(move |conn| {
            diesel::replace_into(cart_lines::table)
                .values(&row)
                .execute(conn)
                .map(|_| ())
        })
        .await
    }

    async fn delete(&self, product_id: ProductId) -> Result<bool> {
        self.mutate(move |conn| {
            diesel::delete(cart_lines::table.find(product_id.get()))
                .execute(conn)
                .map(|deleted| deleted > 0)
        })
        .await
    }

    async fn delete_all(&self) -> Result<usize> {
        self.mutate(|conn| diesel::delete(cart_lines::table).execute(conn))
            .await
    }

    fn close(&self) {
        self.inner.tx.lock().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::sqlite::database::connection::{
        create_pool, database_url, run_migrations, IN_MEMORY,
    };
    use crate::testkit::domain::line;
    use rust_decimal_macros::dec;

    fn setup_test_db() -> DbPool {
        let pool = create_pool(IN_MEMORY).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        pool
    }

    fn store() -> SqliteCartStore {
        SqliteCartStore::new(setup_test_db(), 16)
    }

    // -------------------------------------------------------------------------
    // Basic CRUD operations
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn sqlite_cart_line_roundtrip() {
        let store = store();
        let original = line(1, dec!(109.95), 2);

        store.upsert(&original).await.unwrap();
        let loaded = store.get(ProductId::new(1)).await.unwrap().unwrap();

        assert_eq!(loaded.product_id, original.product_id);
        assert_eq!(loaded.title, original.title);
        assert_eq!(loaded.price, dec!(109.95));
        assert_eq!(loaded.quantity, 2);
        assert!((loaded.added_at - original.added_at).num_seconds().abs() < 1);
    }

    #[tokio::test]
    async fn upsert_replaces_existing_line() {
        let store = store();

        store.upsert(&line(1, dec!(10), 1)).await.unwrap();
        store.upsert(&line(1, dec!(10), 5)).await.unwrap();

        let all = store.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].quantity, 5);
    }

    #[tokio::test]
    async fn delete_reports_whether_line_existed() {
        let store = store();
        store.upsert(&line(3, dec!(1), 1)).await.unwrap();

        assert!(store.delete(ProductId::new(3)).await.unwrap());
        assert!(store.get(ProductId::new(3)).await.unwrap().is_none());
        assert!(!store.delete(ProductId::new(3)).await.unwrap());
    }

    #[tokio::test]
    async fn delete_all_returns_count() {
        let store = store();
        for id in 1..=3 {
            store.upsert(&line(id, dec!(1), 1)).await.unwrap();
        }

        assert_eq!(store.delete_all().await.unwrap(), 3);
        assert!(store.get_all().await.unwrap().is_empty());
        assert_eq!(store.delete_all().await.unwrap(), 0);
    }

    // -------------------------------------------------------------------------
    // Invariants enforced by the schema
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn schema_rejects_non_positive_quantity() {
        let store = store();

        let result = store.upsert(&line(1, dec!(1), 0)).await;

        assert!(matches!(
            result,
            Err(crate::error::Error::Store(StoreError::Database(_)))
        ));
        assert!(store.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_price_is_reported() {
        let pool = setup_test_db();
        {
            let mut conn = pool.get().unwrap();
            diesel::sql_query(
                "INSERT INTO cart_lines VALUES (9, 'bad', 'not-a-number', '', 1, '2026-01-01T00:00:00Z')",
            )
            .execute(&mut conn)
            .unwrap();
        }
        let store = SqliteCartStore::new(pool, 4);

        let result = store.get_all().await;
        assert!(matches!(
            result,
            Err(crate::error::Error::Store(StoreError::Corrupt(_)))
        ));
    }

    #[tokio::test]
    async fn write_is_rolled_back_when_reload_fails() {
        let pool = setup_test_db();
        {
            let mut conn = pool.get().unwrap();
            diesel::sql_query(
                "INSERT INTO cart_lines VALUES (9, 'bad', 'not-a-number', '', 1, '2026-01-01T00:00:00Z')",
            )
            .execute(&mut conn)
            .unwrap();
        }
        let store = SqliteCartStore::new(pool.clone(), 4);
        let mut rx = store.subscribe();

        let result = store.upsert(&line(1, dec!(2), 1)).await;

        assert!(matches!(
            result,
            Err(crate::error::Error::Store(StoreError::Corrupt(_)))
        ));
        let mut conn = pool.get().unwrap();
        let persisted: i64 = cart_lines::table
            .find(1_i64)
            .count()
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(persisted, 0);
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    // -------------------------------------------------------------------------
    // Notifications
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn mutations_publish_fresh_snapshot() {
        let store = store();
        let mut rx = store.subscribe();

        store.upsert(&line(1, dec!(10.00), 2)).await.unwrap();
        let snapshot = rx.recv().await.unwrap();
        assert_eq!(snapshot.total(), dec!(20.00));
        assert_eq!(snapshot.lines(), store.get_all().await.unwrap().as_slice());

        store.delete(ProductId::new(1)).await.unwrap();
        assert!(rx.recv().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_mutation_publishes_nothing() {
        let store = store();
        let mut rx = store.subscribe();

        let _ = store.upsert(&line(1, dec!(1), -1)).await;

        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn close_ends_subscriptions() {
        let store = store();
        let mut rx = store.subscribe();
        store.close();

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Closed)
        ));
        assert!(matches!(
            store.delete_all().await,
            Err(crate::error::Error::Store(StoreError::Unavailable))
        ));
    }

    // -------------------------------------------------------------------------
    // Durability and concurrency
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn lines_survive_reopening_the_database() {
        let dir = tempfile::tempdir().unwrap();
        let url = database_url(&dir.path().join("cart.db").to_string_lossy());

        {
            let pool = create_pool(&url).unwrap();
            run_migrations(&pool).unwrap();
            let store = SqliteCartStore::new(pool, 4);
            store.upsert(&line(7, dec!(3.25), 4)).await.unwrap();
        }

        let pool = create_pool(&url).unwrap();
        run_migrations(&pool).unwrap();
        let store = SqliteCartStore::new(pool, 4);
        let all = store.get_all().await.unwrap();

        assert_eq!(all.len(), 1);
        assert_eq!(all[0].quantity, 4);
        assert_eq!(all[0].price, dec!(3.25));
    }

    #[tokio::test]
    async fn concurrent_upserts_do_not_corrupt_data() {
        let store = Arc::new(store());

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store.upsert(&line(i, dec!(1.5), 1)).await.unwrap();
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.get_all().await.unwrap().len(), 10);
    }
}
