//! Database layer - connection provider, pool, schema, and repositories
//!
//! # Design Principles
//!
//! - One pool per process, owned by [`ConnectionProvider`], built on first use
//! - Parameterised statements only
//! - Connections are checked out per query and returned on every exit path

pub mod pool;
pub mod provider;
pub mod repos;
pub mod schema;

pub use pool::{create_pool, Connector, PgConnector};
pub use provider::{ConnectionProvider, ProviderError};
pub use repos::*;
