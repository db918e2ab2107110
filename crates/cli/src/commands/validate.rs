//! # CLI Validate Command
//!
//! Checks the configuration without starting the server.

use error::Result;
use redis::AsyncCommands as _;
use tracing::info;

use crate::config::AppConfig;

/// Validate `config`; with `connect` also reach the database and Redis.
pub async fn validate(config: &AppConfig, connect: bool) -> Result<()> {
    // Fails on an unusable directory before the server would.
    tokio::fs::create_dir_all(&config.attachments.dir).await?;
    info!(
        target: "validate",
        attachment_dir = %config.attachments.dir.display(),
        max_bytes = config.attachments.max_bytes,
        issuer = %config.jwt.issuer,
        "Configuration is valid"
    );

    if connect {
        let db = config.database.connect().await?;
        db.ping().await?;
        info!(target: "validate", "Database reachable");

        let client = redis::Client::open(config.redis_url.as_str())?;
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: bool = conn.exists("trellis:validate").await?;
        info!(target: "validate", "Redis reachable");
    }
    Ok(())
}
