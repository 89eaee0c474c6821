//! schooldir-server: HTTP server for the school directory
//!
//! Exposes the school record store and the image upload endpoint over
//! HTTP, backed by a lazily created PostgreSQL pool and an external image
//! host.

pub mod db;
pub mod http;
pub mod media;
pub mod models;
pub mod settings;
pub mod view;

pub use db::{ConnectionProvider, PgConnector};
pub use http::{build_router, run_server, AppState, ServerConfig};
pub use settings::{CloudinarySettings, DatabaseSettings};
