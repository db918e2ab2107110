//! # Token Revocation
//!
//! Revoked tokens live in a keyed store with expiry, so an entry disappears
//! once the token it refers to would have expired anyway. Tokens are never
//! stored in the clear; the key is the BLAKE3 hash of the token.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use error::Result;
use redis::AsyncCommands;
use tokio::sync::Mutex;
use tracing::debug;

/// Key prefix for revoked tokens in Redis.
pub const REVOKED_KEY_PREFIX: &str = "revoked:token:";

/// Store of revoked tokens.
#[async_trait]
pub trait RevocationStore: Send + Sync + std::fmt::Debug {
    /// Revoke `token_hash` for `ttl_seconds`. A zero TTL is a no-op.
    async fn revoke(&self, token_hash: &str, ttl_seconds: u64) -> Result<()>;

    async fn is_revoked(&self, token_hash: &str) -> Result<bool>;
}

/// Hash a raw token into its revocation key.
#[must_use]
pub fn hash_token_for_revocation(token: &str) -> String { blake3::hash(token.as_bytes()).to_hex().to_string() }

/// Redis-backed store using `SET key EX ttl`.
#[derive(Clone, Debug)]
pub struct RedisRevocationStore {
    client: redis::Client,
}

impl RedisRevocationStore {
    #[must_use]
    pub fn new(client: redis::Client) -> Self {
        Self {
            client,
        }
    }

    fn key(token_hash: &str) -> String { format!("{REVOKED_KEY_PREFIX}{token_hash}") }
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn revoke(&self, token_hash: &str, ttl_seconds: u64) -> Result<()> {
        if ttl_seconds == 0 {
            return Ok(());
        }
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(Self::key(token_hash), "revoked", ttl_seconds).await?;
        debug!(token_hash = %token_hash, ttl_seconds, "Token revoked");
        Ok(())
    }

    async fn is_revoked(&self, token_hash: &str) -> Result<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let exists: bool = conn.exists(Self::key(token_hash)).await?;
        Ok(exists)
    }
}

/// In-process store for tests and single-node development.
#[derive(Debug, Default)]
pub struct MemoryRevocationStore {
    entries: Mutex<HashMap<String, Instant>>,
}

impl MemoryRevocationStore {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Number of live entries; expired ones are pruned first.
    pub async fn len(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        entries.retain(|_, expires_at| *expires_at > now);
        entries.len()
    }

    pub async fn is_empty(&self) -> bool { self.len().await == 0 }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn revoke(&self, token_hash: &str, ttl_seconds: u64) -> Result<()> {
        if ttl_seconds == 0 {
            return Ok(());
        }
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, expires_at| *expires_at > now);
        entries.insert(token_hash.to_string(), now + Duration::from_secs(ttl_seconds));
        debug!(token_hash = %token_hash, ttl_seconds, "Token revoked");
        Ok(())
    }

    async fn is_revoked(&self, token_hash: &str) -> Result<bool> {
        let entries = self.entries.lock().await;
        Ok(entries
            .get(token_hash)
            .is_some_and(|expires_at| *expires_at > Instant::now()))
    }
}
