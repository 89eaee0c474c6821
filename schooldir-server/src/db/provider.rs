//! Process-wide connection provider
//!
//! Holds at most one pool. The first `acquire()` builds it, checks
//! connectivity, and creates the schema; everyone else gets a clone.
//! Initialisation runs under an async mutex, so concurrent first callers
//! wait for the one in flight instead of racing to build their own pool.

use std::sync::atomic::{AtomicBool, Ordering};

use sqlx::PgPool;
use tokio::sync::Mutex;

use super::pool::Connector;

/// Failure to obtain a pool (storage unavailable)
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("failed to prepare schema: {0}")]
    Schema(#[source] sqlx::Error),
}

enum PoolState {
    Uninitialized,
    Ready(PgPool),
}

/// Owner of the shared database pool
pub struct ConnectionProvider {
    connector: Box<dyn Connector>,
    state: Mutex<PoolState>,
    /// Mirrors `state` for readers that must not wait on an init in flight
    ready: AtomicBool,
}

impl ConnectionProvider {
    pub fn new(connector: impl Connector + 'static) -> Self {
        Self {
            connector: Box::new(connector),
            state: Mutex::new(PoolState::Uninitialized),
            ready: AtomicBool::new(false),
        }
    }

    /// Get the shared pool, creating it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the pool cannot connect or the schema
    /// cannot be created. The provider stays uninitialised, so the next call
    /// retries from scratch.
    pub async fn acquire(&self) -> Result<PgPool, ProviderError> {
        let mut state = self.state.lock().await;

        if let PoolState::Ready(pool) = &*state {
            return Ok(pool.clone());
        }

        tracing::info!("creating database connection pool");
        let pool = self
            .connector
            .connect()
            .await
            .map_err(ProviderError::Connect)?;

        if let Err(e) = self.connector.ensure_schema(&pool).await {
            pool.close().await;
            return Err(ProviderError::Schema(e));
        }

        *state = PoolState::Ready(pool.clone());
        self.ready.store(true, Ordering::Release);
        Ok(pool)
    }

    /// Close the pool and forget it. No-op when nothing was created.
    pub async fn release(&self) {
        let mut state = self.state.lock().await;

        if let PoolState::Ready(pool) = std::mem::replace(&mut *state, PoolState::Uninitialized) {
            self.ready.store(false, Ordering::Release);
            pool.close().await;
            tracing::info!("database connection pool closed");
        }
    }

    /// Whether a pool currently exists. Never waits, so a first connect in
    /// progress reads as not ready.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}
