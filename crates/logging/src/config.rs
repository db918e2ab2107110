//! # Logging Configuration
//!
//! Configuration for the logging subsystem, read from the CLI flags and
//! overridden by environment variables.

use std::{fmt, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt as tfmt, prelude::*, EnvFilter, Registry};

use crate::InitError;

/// Environment variable selecting the output format.
pub const ENV_LOG_FORMAT: &str = "TRELLIS_LOG_FORMAT";
/// Environment variable holding the log file path.
pub const ENV_LOG_FILE: &str = "TRELLIS_LOG_FILE";
/// Environment variable naming the deployment environment.
pub const ENV_ENVIRONMENT: &str = "TRELLIS_ENV";

/// Output format of the log stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
    Compact,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
            Self::Compact => "compact",
        };
        write!(f, "{s}")
    }
}

/// Logging configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct LoggingConfig {
    /// `EnvFilter` directive string
    pub level:       String,
    pub format:      LogFormat,
    /// Optional log file, rotated daily
    pub log_file:    Option<String>,
    /// Environment (development, testing, production)
    pub environment: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level:       "info".to_string(),
            format:      LogFormat::Compact,
            log_file:    None,
            environment: "development".to_string(),
        }
    }
}

/// Keeps the background file writer alive.
#[derive(Debug, Default)]
#[must_use = "dropping the guard stops the file writer"]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

type BoxedSubscriber = Box<dyn tracing::Subscriber + Send + Sync>;

impl LoggingConfig {
    /// Create configuration from CLI values, letting the environment win.
    ///
    /// An unknown format falls back to JSON.
    pub fn from_env(level: &str, format: &str, log_file: Option<&str>) -> Self {
        let format = std::env::var(ENV_LOG_FORMAT)
            .ok()
            .unwrap_or_else(|| format.to_string());
        Self {
            level:       std::env::var("RUST_LOG")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| level.to_string()),
            format:      format.parse().unwrap_or_default(),
            log_file:    std::env::var(ENV_LOG_FILE)
                .ok()
                .or_else(|| log_file.map(str::to_string)),
            environment: std::env::var(ENV_ENVIRONMENT).unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Whether this configuration targets a production deployment.
    pub fn is_production(&self) -> bool { self.environment.eq_ignore_ascii_case("production") }

    /// Build the tracing subscriber from this configuration.
    pub fn build(&self) -> Result<(BoxedSubscriber, LoggingGuard), InitError> {
        let filter = EnvFilter::try_new(&self.level).map_err(|_| InitError::InvalidFilter(self.level.clone()))?;

        let (file_layer, guard) = match self.log_file.as_deref() {
            Some(path) => {
                let path = Path::new(path);
                let dir = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or_else(|| Path::new("."));
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "trellis.log".to_string());
                let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, name));
                let layer = tfmt::layer()
                    .json()
                    .with_timer(tfmt::time::UtcTime::rfc_3339())
                    .with_writer(writer);
                (Some(layer), LoggingGuard {
                    _file: Some(guard),
                })
            },
            None => (None, LoggingGuard::default()),
        };

        let registry = Registry::default().with(filter).with(file_layer);
        let subscriber: BoxedSubscriber = match self.format {
            LogFormat::Json => {
                Box::new(
                    registry.with(
                        tfmt::layer()
                            .json()
                            .with_timer(tfmt::time::UtcTime::rfc_3339()),
                    ),
                )
            },
            LogFormat::Pretty => {
                Box::new(
                    registry.with(
                        tfmt::layer()
                            .pretty()
                            .with_timer(tfmt::time::UtcTime::rfc_3339()),
                    ),
                )
            },
            LogFormat::Compact => {
                Box::new(
                    registry.with(
                        tfmt::layer()
                            .compact()
                            .with_timer(tfmt::time::UtcTime::rfc_3339()),
                    ),
                )
            },
        };
        Ok((subscriber, guard))
    }
}
