//! HTTP server command
//!
//! Runs the schooldir API: school records plus image upload.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use schooldir_server::db::{ConnectionProvider, PgConnector};
use schooldir_server::http::{run_server, AppState, ServerConfig};
use schooldir_server::media::{CloudinaryHost, MediaHost, UnconfiguredHost};
use schooldir_server::settings::{
    CloudinarySettings, DatabaseSettings, DEFAULT_ACQUIRE_TIMEOUT, DEFAULT_MAX_CONNECTIONS,
};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', env = "SCHOOLDIR_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Database URL (overrides PGHOST/PGPORT/PGUSER/PGPASSWORD/PGDATABASE)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Maximum pooled database connections
    #[arg(long, env = "SCHOOLDIR_DB_MAX_CONNECTIONS", default_value_t = DEFAULT_MAX_CONNECTIONS)]
    pub max_connections: u32,

    /// Seconds to wait for a pooled connection
    #[arg(long, env = "SCHOOLDIR_DB_ACQUIRE_TIMEOUT_SECS", default_value_t = DEFAULT_ACQUIRE_TIMEOUT.as_secs())]
    pub acquire_timeout_secs: u64,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let mut db_settings = DatabaseSettings::from_env();
    if args.database_url.is_some() {
        db_settings.url = args.database_url;
    }
    db_settings.max_connections = args.max_connections;
    db_settings.acquire_timeout = Duration::from_secs(args.acquire_timeout_secs);

    // Fail fast on a malformed URL; connectivity itself is checked lazily
    db_settings
        .connect_options()
        .context("Invalid database settings")?;

    let media: Arc<dyn MediaHost> = match CloudinarySettings::from_env() {
        Some(settings) => {
            tracing::info!(cloud = %settings.cloud_name, "Cloudinary uploads enabled");
            Arc::new(CloudinaryHost::new(settings).context("Failed to build media host client")?)
        }
        None => {
            tracing::warn!("CLOUDINARY_* not set; image uploads will fail");
            Arc::new(UnconfiguredHost)
        }
    };

    tracing::info!("Starting schooldir server on {}", args.bind);

    let provider = ConnectionProvider::new(PgConnector::new(db_settings));
    let state = Arc::new(AppState::new(provider, media));
    let config = ServerConfig {
        bind_addr: args.bind,
    };

    // Run server (blocks until shutdown)
    run_server(state, config).await.context("Server error")?;

    Ok(())
}
