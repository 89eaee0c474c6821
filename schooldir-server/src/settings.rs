//! Runtime settings - database and media host
//!
//! Loaded from environment variables (after `.env`, which the binary reads):
//! - `DATABASE_URL`: full connection string; wins over the discrete settings
//! - `PGHOST` / `PGPORT` / `PGUSER` / `PGPASSWORD` / `PGDATABASE`
//! - `SCHOOLDIR_DB_MAX_CONNECTIONS`, `SCHOOLDIR_DB_ACQUIRE_TIMEOUT_SECS`
//! - `CLOUDINARY_CLOUD_NAME` / `CLOUDINARY_API_KEY` / `CLOUDINARY_API_SECRET`

use std::time::Duration;

use sqlx::postgres::PgConnectOptions;

/// Pool ceiling. Kept low for a low-traffic directory.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 2;

/// How long a caller waits for a pooled connection.
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Database connection settings
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    /// Full connection string; overrides the discrete fields when set
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub database: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl DatabaseSettings {
    /// Create settings from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            url: env_var("DATABASE_URL"),
            host: env_var("PGHOST").unwrap_or(defaults.host),
            port: env_parse("PGPORT").unwrap_or(defaults.port),
            user: env_var("PGUSER").unwrap_or(defaults.user),
            password: env_var("PGPASSWORD"),
            database: env_var("PGDATABASE").unwrap_or(defaults.database),
            max_connections: env_parse("SCHOOLDIR_DB_MAX_CONNECTIONS")
                .unwrap_or(defaults.max_connections),
            acquire_timeout: env_parse("SCHOOLDIR_DB_ACQUIRE_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.acquire_timeout),
        }
    }

    /// Build driver connect options.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` is set but is not a valid connection string.
    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        if let Some(url) = &self.url {
            return url.parse();
        }

        let mut options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.database);
        if let Some(password) = &self.password {
            options = options.password(password);
        }
        Ok(options)
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: None,
            database: "schooldir".to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
        }
    }
}

/// Cloudinary account credentials
#[derive(Clone)]
pub struct CloudinarySettings {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl CloudinarySettings {
    /// Create settings from environment variables. Returns `None` when any
    /// credential is missing.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            cloud_name: env_var("CLOUDINARY_CLOUD_NAME")?,
            api_key: env_var("CLOUDINARY_API_KEY")?,
            api_secret: env_var("CLOUDINARY_API_SECRET")?,
        })
    }
}

// Keep the secret out of logs.
impl std::fmt::Debug for CloudinarySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinarySettings")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env_var(name).and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = DatabaseSettings::default();
        assert_eq!(settings.port, 5432);
        assert_eq!(settings.max_connections, 2);
        assert_eq!(settings.acquire_timeout, Duration::from_secs(30));
    }

    #[test]
    fn url_overrides_discrete_fields() {
        let settings = DatabaseSettings {
            url: Some("postgres://alice:pw@db.internal:6543/schools".into()),
            ..Default::default()
        };
        let options = settings.connect_options().unwrap();
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_username(), "alice");
        assert_eq!(options.get_database(), Some("schools"));
    }

    #[test]
    fn discrete_fields() {
        let settings = DatabaseSettings {
            host: "pg".into(),
            port: 5433,
            user: "dir".into(),
            database: "dir_db".into(),
            ..Default::default()
        };
        let options = settings.connect_options().unwrap();
        assert_eq!(options.get_host(), "pg");
        assert_eq!(options.get_port(), 5433);
        assert_eq!(options.get_username(), "dir");
        assert_eq!(options.get_database(), Some("dir_db"));
    }

    #[test]
    fn invalid_url_is_error() {
        let settings = DatabaseSettings {
            url: Some("not a url".into()),
            ..Default::default()
        };
        assert!(settings.connect_options().is_err());
    }

    #[test]
    fn cloudinary_debug_redacts_secret() {
        let settings = CloudinarySettings {
            cloud_name: "demo".into(),
            api_key: "123".into(),
            api_secret: "shh".into(),
        };
        let rendered = format!("{:?}", settings);
        assert!(rendered.contains("demo"));
        assert!(!rendered.contains("shh"));
    }
}
