//! # Service Configuration
//!
//! Settings the server needs besides the database, read from `TRELLIS_*`
//! environment variables. Database settings live in
//! [`migration::DatabaseConfig`].

use std::{net::SocketAddr, path::PathBuf};

use auth::{secrecy::SecretString, JwtConfig};
use error::{AppError, Result};
use migration::DatabaseConfig;

pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
pub const DEFAULT_ATTACHMENT_DIR: &str = "./data/attachments";
pub const DEFAULT_JWT_ISSUER: &str = "trellis";
pub const DEFAULT_JWT_AUDIENCE: &str = "trellis-api";
/// 15 minutes
pub const DEFAULT_ACCESS_TTL: u64 = 15 * 60;
/// 7 days
pub const DEFAULT_REFRESH_TTL: u64 = 7 * 24 * 60 * 60;

/// Errors that can occur while reading configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} is required")]
    Missing { name: &'static str },

    #[error("{name} must be a positive number, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self { AppError::config(err.to_string()) }
}

fn lookup_value<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|v| !v.trim().is_empty())
}

fn positive<F>(lookup: &F, name: &'static str, default: u64) -> std::result::Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup_value(lookup, name) {
        None => Ok(default),
        Some(value) => {
            match value.trim().parse::<u64>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(ConfigError::InvalidNumber { name, value }),
            }
        },
    }
}

/// Where attachment bodies are stored and how large they may be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentConfig {
    pub dir:       PathBuf,
    pub max_bytes: u64,
}

/// Everything `trellis serve` needs.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database:    DatabaseConfig,
    pub redis_url:   String,
    pub jwt:         JwtConfig,
    pub attachments: AttachmentConfig,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self> {
        let database = DatabaseConfig::from_env()?;
        Self::from_lookup(database, |name| std::env::var(name).ok())
    }

    /// Load everything but the database through `lookup`.
    pub fn from_lookup<F>(database: DatabaseConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup_value(&lookup, "TRELLIS_JWT_SECRET").ok_or(ConfigError::Missing {
            name: "TRELLIS_JWT_SECRET",
        })?;
        let jwt = JwtConfig {
            secret:              SecretString::from(secret),
            issuer:              lookup_value(&lookup, "TRELLIS_JWT_ISSUER").unwrap_or_else(|| DEFAULT_JWT_ISSUER.to_string()),
            audience:            lookup_value(&lookup, "TRELLIS_JWT_AUDIENCE")
                .unwrap_or_else(|| DEFAULT_JWT_AUDIENCE.to_string()),
            access_ttl_seconds:  positive(&lookup, "TRELLIS_JWT_ACCESS_TTL", DEFAULT_ACCESS_TTL)?,
            refresh_ttl_seconds: positive(&lookup, "TRELLIS_JWT_REFRESH_TTL", DEFAULT_REFRESH_TTL)?,
        };
        jwt.validate()?;

        let attachments = AttachmentConfig {
            dir:       lookup_value(&lookup, "TRELLIS_ATTACHMENT_DIR")
                .map_or_else(|| PathBuf::from(DEFAULT_ATTACHMENT_DIR), PathBuf::from),
            max_bytes: positive(
                &lookup,
                "TRELLIS_ATTACHMENT_MAX_BYTES",
                server::attachment_store::DEFAULT_MAX_BYTES,
            )?,
        };

        Ok(Self {
            database,
            redis_url: lookup_value(&lookup, "TRELLIS_REDIS_URL").unwrap_or_else(|| DEFAULT_REDIS_URL.to_string()),
            jwt,
            attachments,
        })
    }
}

/// Parses a host and port into a SocketAddr.
///
/// IPv6 hosts are bracketed before the port is appended, so `::1` and
/// `[::1]` both work.
pub fn parse_socket_addr(host: &str, port: u16) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
    let addr_str = if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{port}")
    }
    else {
        format!("{host}:{port}")
    };
    addr_str.parse()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use auth::secrecy::ExposeSecret;

    use super::*;

    // base64 of "test-secret-key-that-is-at-least-32-bytes-long"
    const SECRET: &str = "dGVzdC1zZWNyZXQta2V5LXRoYXQtaXMtYXQtbGVhc3QtMzItYnl0ZXMtbG9uZw==";

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(DatabaseConfig::default(), move |name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("TRELLIS_JWT_SECRET", SECRET)]).unwrap();
        assert_eq!(config.redis_url, DEFAULT_REDIS_URL);
        assert_eq!(config.jwt.secret.expose_secret(), SECRET);
        assert_eq!(config.jwt.issuer, "trellis");
        assert_eq!(config.jwt.access_ttl_seconds, 900);
        assert_eq!(config.jwt.refresh_ttl_seconds, 604_800);
        assert_eq!(config.attachments.dir, PathBuf::from(DEFAULT_ATTACHMENT_DIR));
        assert_eq!(config.attachments.max_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("TRELLIS_JWT_SECRET", SECRET),
            ("TRELLIS_JWT_ACCESS_TTL", "60"),
            ("TRELLIS_REDIS_URL", "redis://cache:6380"),
            ("TRELLIS_ATTACHMENT_DIR", "/srv/files"),
            ("TRELLIS_ATTACHMENT_MAX_BYTES", "2048"),
        ])
        .unwrap();
        assert_eq!(config.jwt.access_ttl_seconds, 60);
        assert_eq!(config.redis_url, "redis://cache:6380");
        assert_eq!(config.attachments.dir, PathBuf::from("/srv/files"));
        assert_eq!(config.attachments.max_bytes, 2048);
    }

    #[test]
    fn test_secret_is_required_and_checked() {
        let err = load(&[]).unwrap_err();
        assert_eq!(err.message(), "TRELLIS_JWT_SECRET is required");
        assert!(load(&[("TRELLIS_JWT_SECRET", "c2hvcnQ=")]).is_err());
    }

    #[test]
    fn test_invalid_numbers_are_reported() {
        for value in ["0", "-5", "ten"] {
            let err = load(&[("TRELLIS_JWT_SECRET", SECRET), ("TRELLIS_ATTACHMENT_MAX_BYTES", value)]).unwrap_err();
            assert!(err.message().contains("TRELLIS_ATTACHMENT_MAX_BYTES"), "{err}");
        }
    }

    #[test]
    fn test_parse_socket_addr() {
        assert_eq!(parse_socket_addr("0.0.0.0", 3000).unwrap().to_string(), "0.0.0.0:3000");
        assert_eq!(parse_socket_addr("::1", 3000).unwrap().to_string(), "[::1]:3000");
        assert_eq!(
            parse_socket_addr("[2001:db8::1]", 8080).unwrap().to_string(),
            "[2001:db8::1]:8080"
        );
        assert!(parse_socket_addr("not a host", 80).is_err());
    }
}
