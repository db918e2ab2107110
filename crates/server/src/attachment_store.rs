//! # Attachment Storage
//!
//! Attachment bodies are kept on disk under a configured directory, one
//! file per attachment, named by an opaque storage key. Metadata lives in
//! the `attachments` table.

use std::path::{Path, PathBuf};

use error::{AppError, Result};
use tracing::{debug, warn};

/// Default upload limit: 10 MiB.
pub const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct AttachmentStore {
    root:      PathBuf,
    max_bytes: u64,
}

impl AttachmentStore {
    pub fn new(root: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    #[inline]
    pub fn root(&self) -> &Path { &self.root }

    #[inline]
    pub fn max_bytes(&self) -> u64 { self.max_bytes }

    /// Reject bodies that are empty or above the limit.
    pub fn check_size(&self, len: usize) -> Result<()> {
        if len == 0 {
            return Err(AppError::validation("Attachment body is empty"));
        }
        if len as u64 > self.max_bytes {
            return Err(AppError::validation(format!(
                "Attachment exceeds the limit of {} bytes",
                self.max_bytes
            )));
        }
        Ok(())
    }

    /// Storage keys are generated here, so anything but `[a-z0-9]` means
    /// the row was tampered with.
    fn path_for(&self, storage_key: &str) -> Result<PathBuf> {
        if storage_key.is_empty() || !storage_key.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(AppError::internal(format!("Invalid storage key '{storage_key}'")));
        }
        Ok(self.root.join(storage_key))
    }

    /// Write `bytes` under a fresh key and return the key.
    pub async fn put(&self, bytes: &[u8]) -> Result<String> {
        self.check_size(bytes.len())?;
        tokio::fs::create_dir_all(&self.root).await?;
        let key = cuid2::create_id();
        let path = self.path_for(&key)?;
        tokio::fs::write(&path, bytes).await?;
        debug!(storage_key = %key, size = bytes.len(), "Attachment stored");
        Ok(key)
    }

    pub async fn get(&self, storage_key: &str) -> Result<Vec<u8>> {
        let path = self.path_for(storage_key)?;
        tokio::fs::read(&path).await.map_err(|e| {
            match e.kind() {
                std::io::ErrorKind::NotFound => AppError::not_found("Attachment content not found"),
                _ => AppError::from(e),
            }
        })
    }

    /// Remove a stored body. A missing file is not an error.
    pub async fn remove(&self, storage_key: &str) -> Result<()> {
        let path = self.path_for(storage_key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove many bodies after their rows are gone; failures are logged.
    pub async fn remove_all(&self, storage_keys: &[String]) {
        for key in storage_keys {
            if let Err(e) = self.remove(key).await {
                warn!(storage_key = %key, error = %e, "Failed to remove attachment file");
            }
        }
    }
}
