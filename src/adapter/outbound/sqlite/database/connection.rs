//! Database connection management using Diesel ORM.
//!
//! Provides connection pooling, migration support, and connection
//! configuration for SQLite databases.

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::error::{Result, StoreError};

/// Embedded database migrations compiled from the migrations/ directory.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Type alias for a SQLite connection pool.
pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Database location that lives only inside one connection.
pub const IN_MEMORY: &str = ":memory:";

const MAX_POOL_SIZE: u32 = 5;

/// Build a Diesel connection URL for a database path.
#[must_use]
pub fn database_url(path: &str) -> String {
    if path == IN_MEMORY || path.starts_with("sqlite://") || path.starts_with("file:") {
        path.to_string()
    } else {
        format!("sqlite://{path}")
    }
}

/// Pragmas applied to every pooled connection on checkout.
#[derive(Debug, Clone, Copy)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(
        &self,
        conn: &mut SqliteConnection,
    ) -> std::result::Result<(), diesel::r2d2::Error> {
        configure_sqlite_connection(conn).map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Create a connection pool for the given database URL.
///
/// An in-memory database exists per connection, so it gets a single
/// connection that is never recycled.
///
/// # Errors
/// Returns an error if the pool cannot be created.
pub fn create_pool(database_url: &str) -> Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let builder = Pool::builder().connection_customizer(Box::new(SqlitePragmas));

    let builder = if database_url == IN_MEMORY {
        builder
            .max_size(1)
            .min_idle(Some(1))
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        builder.max_size(MAX_POOL_SIZE)
    };

    builder
        .build(manager)
        .map_err(|e| StoreError::Connection(e.to_string()).into())
}

/// Run all pending database migrations.
///
/// # Errors
/// Returns an error if migrations fail.
pub fn run_migrations(pool: &DbPool) -> Result<()> {
    let mut conn = pool
        .get()
        .map_err(|e| StoreError::Connection(e.to_string()))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| StoreError::Database(e.to_string()))?;
    Ok(())
}

/// Configure SQLite connection pragmas used for cart writes.
///
/// # Errors
/// Returns an error if a pragma fails to apply.
pub fn configure_sqlite_connection(conn: &mut SqliteConnection) -> QueryResult<()> {
    diesel::sql_query("PRAGMA busy_timeout = 5000").execute(conn)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(diesel::QueryableByName)]
    struct TableName {
        #[diesel(sql_type = diesel::sql_types::Text)]
        name: String,
    }

    #[test]
    fn database_url_prefixes_file_paths() {
        assert_eq!(database_url(IN_MEMORY), ":memory:");
        assert_eq!(database_url("cart.db"), "sqlite://cart.db");
        assert_eq!(database_url("sqlite://cart.db"), "sqlite://cart.db");
    }

    #[test]
    fn create_pool_with_memory_db() {
        let pool = create_pool(IN_MEMORY).unwrap();
        assert_eq!(pool.max_size(), 1);
        assert!(pool.get().is_ok());
    }

    #[test]
    fn run_migrations_creates_cart_table() {
        let pool = create_pool(IN_MEMORY).unwrap();
        run_migrations(&pool).unwrap();

        let mut conn = pool.get().unwrap();
        let tables: Vec<String> = diesel::sql_query(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '__diesel_schema_migrations' ORDER BY name",
        )
        .load::<TableName>(&mut conn)
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();

        assert_eq!(tables, vec!["cart_lines".to_string()]);
    }

    #[test]
    fn run_migrations_is_idempotent() {
        let pool = create_pool(IN_MEMORY).unwrap();
        run_migrations(&pool).unwrap();
        run_migrations(&pool).unwrap();
    }

    #[test]
    fn memory_pool_keeps_schema_across_checkouts() {
        let pool = create_pool(IN_MEMORY).unwrap();
        run_migrations(&pool).unwrap();

        for _ in 0..3 {
            let mut conn = pool.get().unwrap();
            let result = diesel::sql_query("SELECT product_id FROM cart_lines").execute(&mut conn);
            assert!(result.is_ok());
        }
    }

    #[test]
    fn file_pool_handles_concurrent_access() {
        use std::sync::Arc;
        use std::thread;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.db");
        let pool = Arc::new(create_pool(&database_url(&path.to_string_lossy())).unwrap());
        run_migrations(&pool).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || {
                    let mut conn = pool.get().unwrap();
                    diesel::sql_query("SELECT COUNT(*) FROM cart_lines")
                        .execute(&mut conn)
                        .unwrap();
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("thread should complete without panic");
        }
    }
}
