//! # Trellis API Server
//!
//! Axum-based HTTP API for the Trellis project-management service.
//!
//! ## Modules
//!
//! - [`api`]: Request handlers, one module per resource
//! - [`dto`]: Request/response data transfer objects
//! - [`middleware`]: Authentication and request-id middleware
//! - [`router`]: API route configuration
//! - [`token_revocation`]: Revoked-token store
//! - [`attachment_store`]: On-disk storage of attachment bodies

use std::{sync::Arc, time::Instant};

use ::auth::{AccessGate, JwtConfig, PasswordConfig};
use sea_orm::DatabaseConnection;

pub mod api;
pub mod attachment_store;
pub mod dto;
pub mod extract;
pub mod middleware;
pub mod router;
pub mod token_revocation;

pub use attachment_store::AttachmentStore;
pub use router::create_app_router;
pub use token_revocation::{MemoryRevocationStore, RedisRevocationStore, RevocationStore};

/// Application state shared across request handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection pool
    pub db:          DatabaseConnection,
    pub jwt_config:  JwtConfig,
    /// Revoked access and refresh tokens
    pub revocations: Arc<dyn RevocationStore>,
    pub attachments: AttachmentStore,
    /// Argon2 parameters for new hashes; `None` uses the defaults
    pub password:    Option<PasswordConfig>,
    /// Server start time for uptime calculation
    pub start_time:  Instant,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        jwt_config: JwtConfig,
        revocations: Arc<dyn RevocationStore>,
        attachments: AttachmentStore,
    ) -> Self {
        Self {
            db,
            jwt_config,
            revocations,
            attachments,
            password: None,
            start_time: Instant::now(),
        }
    }

    #[must_use]
    pub fn with_password_config(mut self, config: PasswordConfig) -> Self {
        self.password = Some(config);
        self
    }

    /// Access gate over the state's connection pool.
    #[inline]
    pub fn gate(&self) -> AccessGate { AccessGate::new(self.db.clone()) }
}
