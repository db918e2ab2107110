//! # Database Connection Management
//!
//! Connection settings and pool construction shared by the CLI and tests.

use std::time::Duration;

use ::error::{AppError, Result};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// SSL mode options for PostgreSQL connections
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SslMode {
    Disable,
    #[default]
    Prefer,
    Require,
    VerifyCa,
    VerifyFull,
}

impl SslMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SslMode::Disable => "disable",
            SslMode::Prefer => "prefer",
            SslMode::Require => "require",
            SslMode::VerifyCa => "verify-ca",
            SslMode::VerifyFull => "verify-full",
        }
    }
}

impl std::str::FromStr for SslMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disable" => Ok(Self::Disable),
            "prefer" => Ok(Self::Prefer),
            "require" => Ok(Self::Require),
            "verify-ca" => Ok(Self::VerifyCa),
            "verify-full" => Ok(Self::VerifyFull),
            other => Err(AppError::config(format!("Unknown SSL mode '{other}'"))),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Full connection URL; when set the individual parts are ignored
    pub url:             Option<String>,
    pub host:            String,
    pub port:            u16,
    pub database:        String,
    pub username:        String,
    pub password:        String,
    pub ssl_mode:        SslMode,
    /// Maximum connections in pool
    pub pool_size:       u32,
    /// Connection timeout in seconds
    pub connect_timeout: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url:             None,
            host:            "localhost".to_string(),
            port:            5432,
            database:        "trellis".to_string(),
            username:        "trellis".to_string(),
            password:        String::new(),
            ssl_mode:        SslMode::default(),
            pool_size:       10,
            connect_timeout: 30,
        }
    }
}

impl DatabaseConfig {
    /// Load from `TRELLIS_DATABASE_*` variables.
    ///
    /// `TRELLIS_DATABASE_URL` wins over the individual parts. Unparseable
    /// numbers are reported instead of silently replaced.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let var = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());
        let parse_num = |key: &str| -> Result<Option<u64>> {
            var(key)
                .map(|v| {
                    v.parse::<u64>()
                        .map_err(|_| AppError::config(format!("{key} must be a number, got '{v}'")))
                })
                .transpose()
        };

        let port = match parse_num("TRELLIS_DATABASE_PORT")? {
            Some(p) => u16::try_from(p).map_err(|_| AppError::config("TRELLIS_DATABASE_PORT out of range"))?,
            None => defaults.port,
        };
        let pool_size = match parse_num("TRELLIS_DATABASE_POOL_SIZE")? {
            Some(n) => u32::try_from(n).map_err(|_| AppError::config("TRELLIS_DATABASE_POOL_SIZE out of range"))?,
            None => defaults.pool_size,
        };

        Ok(Self {
            url: var("TRELLIS_DATABASE_URL"),
            host: var("TRELLIS_DATABASE_HOST").unwrap_or(defaults.host),
            port,
            database: var("TRELLIS_DATABASE_NAME").unwrap_or(defaults.database),
            username: var("TRELLIS_DATABASE_USER").unwrap_or(defaults.username),
            password: var("TRELLIS_DATABASE_PASSWORD").unwrap_or_default(),
            ssl_mode: var("TRELLIS_DATABASE_SSL_MODE")
                .map(|v| v.parse())
                .transpose()?
                .unwrap_or_default(),
            pool_size,
            connect_timeout: parse_num("TRELLIS_DATABASE_CONNECT_TIMEOUT")?.unwrap_or(defaults.connect_timeout),
        })
    }

    /// The URL handed to Sea-ORM.
    pub fn connection_url(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode={}",
            self.username,
            self.password,
            self.host,
            self.port,
            self.database,
            self.ssl_mode.as_str()
        )
    }

    /// Open a connection pool.
    pub async fn connect(&self) -> Result<DatabaseConnection> {
        let mut options = ConnectOptions::new(self.connection_url());
        options
            .max_connections(self.pool_size)
            .connect_timeout(Duration::from_secs(self.connect_timeout))
            .sqlx_logging(false);
        let db = Database::connect(options).await?;
        tracing::info!(host = %self.host, database = %self.database, "Database connected");
        Ok(db)
    }
}

/// Connect to a database URL with default pool settings.
pub async fn connect_to_database(database_url: &str) -> Result<DatabaseConnection> {
    DatabaseConfig {
        url: Some(database_url.to_string()),
        ..Default::default()
    }
    .connect()
    .await
}
