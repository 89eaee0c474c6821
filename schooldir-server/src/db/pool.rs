//! Database connection pool construction
//!
//! Pool creation sits behind [`Connector`] so the provider's lifecycle can be
//! driven without a live database.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::schema;
use crate::settings::DatabaseSettings;

/// Builds pools and prepares the schema (testable)
#[async_trait]
pub trait Connector: Send + Sync {
    /// Build a pool and prove one connection can be checked out.
    async fn connect(&self) -> Result<PgPool, sqlx::Error>;

    /// Idempotently create the schema on a freshly built pool.
    async fn ensure_schema(&self, pool: &PgPool) -> Result<(), sqlx::Error>;
}

/// Real PostgreSQL connector
#[derive(Debug, Clone)]
pub struct PgConnector {
    settings: DatabaseSettings,
}

impl PgConnector {
    pub fn new(settings: DatabaseSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl Connector for PgConnector {
    async fn connect(&self) -> Result<PgPool, sqlx::Error> {
        create_pool(&self.settings).await
    }

    async fn ensure_schema(&self, pool: &PgPool) -> Result<(), sqlx::Error> {
        schema::ensure_schools_table(pool).await
    }
}

/// Create a PostgreSQL connection pool and verify connectivity.
///
/// The pool is built lazily, then one connection is checked out and
/// returned. If that fails the pool is closed before the error is returned.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&DatabaseSettings::from_env()).await?;
/// ```
pub async fn create_pool(settings: &DatabaseSettings) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout)
        .connect_lazy_with(settings.connect_options()?);

    match pool.acquire().await {
        Ok(conn) => {
            drop(conn);
            tracing::info!(
                max_connections = settings.max_connections,
                "database connected"
            );
            Ok(pool)
        }
        Err(e) => {
            pool.close().await;
            Err(e)
        }
    }
}
