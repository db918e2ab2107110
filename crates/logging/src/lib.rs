//! # Trellis Logging Infrastructure
//!
//! Structured logging for the Trellis service. Wraps `tracing-subscriber`
//! with JSON, pretty and compact output and environment-driven overrides.

pub mod config;
pub mod request_id;

pub use config::{LogFormat, LoggingConfig, LoggingGuard};
pub use request_id::{RequestId, REQUEST_ID_HEADER};
// Re-export tracing macros so callers depend on a single crate
pub use tracing::{debug, error, info, trace, warn};

/// Errors raised while installing the global subscriber.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("invalid log filter '{0}'")]
    InvalidFilter(String),
    #[error("a global subscriber is already installed")]
    AlreadyInitialized(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Initialize the logging system.
///
/// # Arguments
///
/// * `level` - Filter directive (`info`, `debug`, `trellis=debug,sqlx=warn`, ...)
/// * `format` - Output format (json, pretty, compact)
/// * `log_file` - Optional path of a daily rolling log file
///
/// The returned guard flushes the file writer when dropped and must be held
/// for the lifetime of the process.
pub fn init(level: &str, format: &str, log_file: Option<&str>) -> Result<LoggingGuard, InitError> {
    init_with_config(LoggingConfig::from_env(level, format, log_file))
}

/// Initialize logging with an explicit configuration.
pub fn init_with_config(config: LoggingConfig) -> Result<LoggingGuard, InitError> {
    let (subscriber, guard) = config.build()?;
    tracing::subscriber::set_global_default(subscriber)?;
    info!(
        level = %config.level,
        format = %config.format,
        environment = %config.environment,
        "Logging initialized"
    );
    Ok(guard)
}
