//! File-backed inventory snapshot cache
//!
//! Searching the update agent can take minutes, so the last result is kept
//! on disk and reused while it is younger than the configured expiry. The
//! pending-reboot flag is cheap and always read live.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use wuprobe_api::UpdateRecord;

use crate::error::InventoryError;
use crate::source::UpdateSource;

/// Default freshness window in hours
pub const DEFAULT_EXPIRY_HOURS: i64 = 24;

/// Persisted inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventorySnapshot {
    /// When the inner source was queried
    pub fetched_at: DateTime<Utc>,
    pub updates: Vec<UpdateRecord>,
}

impl InventorySnapshot {
    #[must_use]
    pub fn new(updates: Vec<UpdateRecord>) -> Self {
        Self {
            fetched_at: Utc::now(),
            updates,
        }
    }

    /// Check if the snapshot is older than `expiry` at `now`
    ///
    /// A snapshot dated in the future (clock change) counts as stale.
    #[must_use]
    pub fn is_stale(&self, expiry: Duration, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.fetched_at);
        age < Duration::zero() || age > expiry
    }
}

/// Wraps an [`UpdateSource`] with a snapshot file
pub struct CachedSource {
    inner: Arc<dyn UpdateSource>,
    path: PathBuf,
    expiry: Duration,
}

impl CachedSource {
    /// Create a cache in front of `inner` stored at `path`
    pub fn new(inner: Arc<dyn UpdateSource>, path: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            path: path.into(),
            expiry: Duration::hours(DEFAULT_EXPIRY_HOURS),
        }
    }

    /// Set freshness window
    #[must_use]
    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.expiry = expiry;
        self
    }

    /// Read the snapshot file, `None` if missing or unreadable
    async fn load(&self) -> Option<InventorySnapshot> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no inventory snapshot");
                return None;
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read inventory snapshot");
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "discarding malformed inventory snapshot");
                None
            }
        }
    }

    /// Write the snapshot file, creating parent directories
    ///
    /// # Errors
    /// Returns an error if the directory or file cannot be written.
    pub async fn store(&self, snapshot: &InventorySnapshot) -> Result<(), InventoryError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| InventoryError::CacheError(e.to_string()))?;
        }

        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| InventoryError::CacheError(e.to_string()))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| InventoryError::CacheError(e.to_string()))?;

        debug!(path = %self.path.display(), "inventory snapshot written");
        Ok(())
    }
}

#[async_trait]
impl UpdateSource for CachedSource {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn pending_updates(&self) -> Result<Vec<UpdateRecord>, InventoryError> {
        if let Some(snapshot) = self.load().await {
            if !snapshot.is_stale(self.expiry, Utc::now()) {
                info!(
                    fetched_at = %snapshot.fetched_at,
                    count = snapshot.updates.len(),
                    "using cached inventory"
                );
                return Ok(snapshot.updates);
            }
            debug!(fetched_at = %snapshot.fetched_at, "inventory snapshot expired");
        }

        let snapshot = InventorySnapshot::new(self.inner.pending_updates().await?);

        if let Err(e) = self.store(&snapshot).await {
            warn!(error = %e, "failed to persist inventory snapshot");
        }

        Ok(snapshot.updates)
    }

    async fn reboot_pending(&self) -> Result<bool, InventoryError> {
        self.inner.reboot_pending().await
    }

    fn source_type(&self) -> &'static str {
        "cached"
    }
}
