//! # CLI Server
//!
//! Wires configuration into [`AppState`] and serves the router until a
//! shutdown signal arrives.

use std::sync::Arc;

use error::{AppError, Result};
use migration::{Migrator, MigratorTrait as _};
use server::{create_app_router, AppState, AttachmentStore, RedisRevocationStore};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::{
    commands::ServeArgs,
    config::{parse_socket_addr, AppConfig},
};

/// Starts the API server.
pub async fn serve(config: AppConfig, args: &ServeArgs) -> Result<()> {
    let address = parse_socket_addr(&args.host, args.port)
        .map_err(|e| AppError::config(format!("Invalid address {}:{}: {e}", args.host, args.port)))?;

    let db = config.database.connect().await?;
    if args.skip_migrations {
        info!(target: "serve", "Skipping database migrations");
    }
    else {
        info!(target: "serve", "Running database migrations...");
        Migrator::up(&db, None).await?;
    }

    let redis = redis::Client::open(config.redis_url.as_str())?;
    tokio::fs::create_dir_all(&config.attachments.dir).await?;
    let attachments = AttachmentStore::new(config.attachments.dir.clone(), config.attachments.max_bytes);
    let state = AppState::new(
        db,
        config.jwt,
        Arc::new(RedisRevocationStore::new(redis)),
        attachments,
    );
    let app = create_app_router(state);

    let listener = TcpListener::bind(address).await?;
    info!(target: "serve", %address, "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!(target: "serve", "Server stopped");
    Ok(())
}

/// Waits for Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!(target: "serve", "Shutdown signal received");
}
