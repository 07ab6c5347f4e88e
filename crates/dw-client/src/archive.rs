//! Best-effort on-disk archive of raw exchange responses
//!
//! Every body an adapter receives is written to
//! `<root>/<exchange-slug>/<endpoint>.json`, replacing the previous capture for
//! the same endpoint. Nothing in the collection path reads these files back.
//! Pending writes are tracked so a short-lived process can wait for them with
//! [`RawArchive::flush`] before its runtime shuts down.

use dw_core::{Config, ExchangeId, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

/// Fire-and-forget writer for raw responses
#[derive(Debug, Clone)]
pub struct RawArchive {
    root: PathBuf,
    enabled: bool,
    permits: Arc<Semaphore>,
    pending: TaskTracker,
}

impl RawArchive {
    /// Archive rooted at `root`, allowing `concurrency` writes at once
    pub fn new(root: impl Into<PathBuf>, concurrency: usize) -> Self {
        Self {
            root: root.into(),
            enabled: true,
            permits: Arc::new(Semaphore::new(concurrency.max(1))),
            pending: TaskTracker::new(),
        }
    }

    /// Archive configured from `DW_DATA_DIR`, `DW_ARCHIVE_RAW` and `DW_ARCHIVE_CONCURRENCY`
    pub fn from_config(config: &Config) -> Self {
        let mut archive = Self::new(config.archive_dir(), config.archive_concurrency);
        archive.enabled = config.archive_raw;
        archive
    }

    /// An archive that drops everything
    pub fn disabled() -> Self {
        let mut archive = Self::new(PathBuf::new(), 1);
        archive.enabled = false;
        archive
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// File a capture for `exchange`/`endpoint` lands in
    pub fn path_for(&self, exchange: ExchangeId, endpoint: &str) -> PathBuf {
        let name = endpoint.trim_start_matches('/').replace('/', "_");
        self.root.join(exchange.slug()).join(format!("{}.json", name))
    }

    /// Queue a write on a background task and return immediately.
    ///
    /// Failures are logged at `warn` and never reach the caller. Must be
    /// called from within a tokio runtime.
    pub fn store(&self, exchange: ExchangeId, endpoint: &str, body: &str) {
        if !self.enabled {
            return;
        }

        let archive = self.clone();
        let endpoint = endpoint.to_string();
        let body = body.to_string();
        self.pending.spawn(async move {
            let _permit = match archive.permits.acquire().await {
                Ok(permit) => permit,
                Err(_) => return,
            };
            if let Err(e) = archive.store_now(exchange, &endpoint, &body).await {
                warn!("Failed to archive {} response for {}: {}", exchange, endpoint, e);
            }
        });
    }

    /// Wait up to `limit` for every queued write to finish.
    ///
    /// Returns `false` if writes were still pending when the limit ran out.
    /// Clones share the same queue, so this also covers writes queued through
    /// any clone.
    pub async fn flush(&self, limit: Duration) -> bool {
        self.pending.close();
        let finished = tokio::time::timeout(limit, self.pending.wait()).await.is_ok();
        self.pending.reopen();

        if !finished {
            warn!("{} archive writes still pending after {}ms", self.pending.len(), limit.as_millis());
        }
        finished
    }

    /// Write one capture and wait for it to land.
    pub async fn store_now(&self, exchange: ExchangeId, endpoint: &str, body: &str) -> Result<PathBuf> {
        let path = self.path_for(exchange, endpoint);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        tokio::fs::write(&path, render(body)).await?;
        debug!("Archived {} bytes to {}", body.len(), path.display());
        Ok(path)
    }
}

/// Pretty-print JSON bodies; keep anything else verbatim.
fn render(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| body.to_string())
}
