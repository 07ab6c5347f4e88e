/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Collection cycle orchestration.
//!
//! A cycle moves through `collecting` to exactly one of three outcomes:
//!
//! - **Persisted**: the merge produced data and it was saved as the new last
//!   good snapshot.
//! - **Fallback**: the merge failed or produced nothing, and the previous
//!   snapshot is served with its `error` field set.
//! - **EmptyError**: as above, with no previous snapshot to fall back to.
//!
//! Cycles are serialized by a lock shared by every trigger, so persisted
//! writes never interleave. When a lock file is configured the same holds
//! across processes: `dw collect` and a running `dw run` on one data
//! directory take turns.

use crate::error::{CollectorError, CollectorResult};
use crate::merge::MergeEngine;
use crate::providers::AdapterContext;
use crate::store::{JsonFileStore, SnapshotStore};
use dw_client::RawArchive;
use dw_core::Config;
use dw_models::Snapshot;
use fd_lock::RwLock as FileLock;
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Error recorded when every exchange came back empty.
pub const NO_DATA_ERROR: &str = "no exchange returned any token data";

/// Upper bound on waiting for raw archive writes at the end of a cycle.
pub const ARCHIVE_FLUSH_LIMIT: Duration = Duration::from_secs(10);

const LOCK_RETRY: Duration = Duration::from_millis(200);

/// How a cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
  Persisted,
  Fallback,
  EmptyError,
}

/// The snapshot a cycle produced and how it got there.
#[derive(Debug, Clone)]
pub struct CycleReport {
  pub snapshot: Snapshot,
  pub outcome: CycleOutcome,
}

/// Sole reader and writer of the persisted snapshot.
pub struct Orchestrator {
  engine: MergeEngine,
  store: Arc<dyn SnapshotStore>,
  cycle_lock: Mutex<()>,
  lock_file: Option<PathBuf>,
  archive: Option<RawArchive>,
}

impl Orchestrator {
  pub fn new(engine: MergeEngine, store: Arc<dyn SnapshotStore>) -> Self {
    Self { engine, store, cycle_lock: Mutex::new(()), lock_file: None, archive: None }
  }

  /// All exchanges, persisting to `<data_dir>/exchange_data.json` and locking
  /// `<data_dir>/.collect.lock` for each cycle.
  pub fn from_config(config: &Config) -> CollectorResult<Self> {
    let ctx = AdapterContext::from_config(config)?;
    let store = Arc::new(JsonFileStore::new(config.snapshot_path()));
    Ok(
      Self::new(MergeEngine::from_context(&ctx), store)
        .with_lock_file(config.lock_path())
        .with_archive(ctx.archive),
    )
  }

  /// Also hold an exclusive lock on `path` while a cycle runs.
  pub fn with_lock_file(mut self, path: impl Into<PathBuf>) -> Self {
    self.lock_file = Some(path.into());
    self
  }

  /// Wait for `archive`'s pending writes before a cycle returns.
  pub fn with_archive(mut self, archive: RawArchive) -> Self {
    self.archive = Some(archive);
    self
  }

  /// Run one cycle, waiting for any cycle already in flight to finish first.
  ///
  /// A snapshot that was collected but could not be saved comes back as
  /// [`CollectorError::PersistFailed`], which still carries it.
  pub async fn run_cycle(&self) -> CollectorResult<CycleReport> {
    let _guard = self.cycle_lock.lock().await;
    self.locked_cycle(true).await
  }

  /// Run one cycle, or fail with [`CollectorError::CycleInProgress`] if one
  /// is already running in this or another process.
  pub async fn try_run_cycle(&self) -> CollectorResult<CycleReport> {
    let _guard = self.cycle_lock.try_lock().map_err(|_| CollectorError::CycleInProgress)?;
    self.locked_cycle(false).await
  }

  async fn locked_cycle(&self, wait: bool) -> CollectorResult<CycleReport> {
    let Some(path) = &self.lock_file else {
      return self.flushed_cycle().await;
    };

    let mut lock = open_lock_file(path).await?;
    let _held = loop {
      match lock.try_write() {
        Ok(guard) => break guard,
        Err(e) if e.kind() == ErrorKind::WouldBlock => {
          if !wait {
            return Err(CollectorError::CycleInProgress);
          }
          debug!("Another process holds {}, waiting", path.display());
          tokio::time::sleep(LOCK_RETRY).await;
        }
        Err(e) => {
          return Err(CollectorError::Store(format!("Failed to lock {}: {}", path.display(), e)));
        }
      }
    };

    self.flushed_cycle().await
  }

  async fn flushed_cycle(&self) -> CollectorResult<CycleReport> {
    let result = self.cycle().await;
    if let Some(archive) = &self.archive {
      archive.flush(ARCHIVE_FLUSH_LIMIT).await;
    }
    result
  }

  async fn cycle(&self) -> CollectorResult<CycleReport> {
    info!("Starting collection cycle");

    let snapshot = match self.engine.collect().await {
      Ok(snapshot) if snapshot.is_empty() => return Ok(self.fallback(NO_DATA_ERROR).await),
      Ok(snapshot) => snapshot,
      Err(e) => return Ok(self.fallback(&e.to_string()).await),
    };

    if let Err(e) = self.store.save(&snapshot).await {
      warn!("Collected {} tokens but could not persist them: {}", snapshot.tokens.len(), e);
      return Err(CollectorError::PersistFailed { reason: e.to_string(), snapshot: Box::new(snapshot) });
    }

    info!("Collection cycle complete: {} tokens persisted", snapshot.tokens.len());
    Ok(CycleReport { snapshot, outcome: CycleOutcome::Persisted })
  }

  async fn fallback(&self, reason: &str) -> CycleReport {
    warn!("Collection failed, serving last good snapshot: {}", reason);

    let previous = match self.store.load().await {
      Ok(previous) => previous,
      Err(e) => {
        warn!("Could not load previous snapshot: {}", e);
        None
      }
    };

    match previous {
      Some(previous) => CycleReport { snapshot: previous.with_error(reason), outcome: CycleOutcome::Fallback },
      None => {
        warn!("No previous snapshot available");
        CycleReport { snapshot: Snapshot::empty_with_error(reason), outcome: CycleOutcome::EmptyError }
      }
    }
  }
}

async fn open_lock_file(path: &Path) -> CollectorResult<FileLock<File>> {
  let lock_err = |e: std::io::Error| CollectorError::Store(format!("Failed to open {}: {}", path.display(), e));

  if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
    tokio::fs::create_dir_all(dir).await.map_err(lock_err)?;
  }
  let file = tokio::fs::OpenOptions::new()
    .create(true)
    .truncate(false)
    .write(true)
    .open(path)
    .await
    .map_err(lock_err)?;
  Ok(FileLock::new(file.into_std().await))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::MemoryStore;
  use crate::traits::ExchangeAdapter;
  use async_trait::async_trait;
  use chrono::{TimeZone, Utc};
  use dw_core::ExchangeId;
  use dw_models::TokenRecord;
  use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
  use std::time::Duration;

  struct Fixed {
    exchange: ExchangeId,
    tokens: Vec<TokenRecord>,
    delay: Duration,
  }

  #[async_trait]
  impl ExchangeAdapter for Fixed {
    fn exchange(&self) -> ExchangeId {
      self.exchange
    }

    async fn fetch_tokens(&self) -> CollectorResult<Vec<TokenRecord>> {
      tokio::time::sleep(self.delay).await;
      Ok(self.tokens.clone())
    }
  }

  struct Panicking;

  #[async_trait]
  impl ExchangeAdapter for Panicking {
    fn exchange(&self) -> ExchangeId {
      ExchangeId::Okx
    }

    async fn fetch_tokens(&self) -> CollectorResult<Vec<TokenRecord>> {
      panic!("unexpected payload");
    }
  }

  /// Store that refuses every write.
  struct ReadOnlyStore;

  #[async_trait]
  impl SnapshotStore for ReadOnlyStore {
    async fn load(&self) -> CollectorResult<Option<Snapshot>> {
      Ok(None)
    }

    async fn save(&self, _snapshot: &Snapshot) -> CollectorResult<()> {
      Err(CollectorError::Store("read-only filesystem".to_string()))
    }
  }

  /// Store whose load always fails.
  struct UnreadableStore;

  #[async_trait]
  impl SnapshotStore for UnreadableStore {
    async fn load(&self) -> CollectorResult<Option<Snapshot>> {
      Err(CollectorError::Store("permission denied".to_string()))
    }

    async fn save(&self, _snapshot: &Snapshot) -> CollectorResult<()> {
      Ok(())
    }
  }

  /// Store that slows saves down and notices overlapping writers.
  #[derive(Default)]
  struct SlowStore {
    inner: MemoryStore,
    writing: AtomicBool,
    overlapped: AtomicBool,
    saves: AtomicUsize,
  }

  #[async_trait]
  impl SnapshotStore for SlowStore {
    async fn load(&self) -> CollectorResult<Option<Snapshot>> {
      self.inner.load().await
    }

    async fn save(&self, snapshot: &Snapshot) -> CollectorResult<()> {
      if self.writing.swap(true, Ordering::SeqCst) {
        self.overlapped.store(true, Ordering::SeqCst);
      }
      tokio::time::sleep(Duration::from_millis(50)).await;
      self.inner.save(snapshot).await?;
      self.saves.fetch_add(1, Ordering::SeqCst);
      self.writing.store(false, Ordering::SeqCst);
      Ok(())
    }
  }

  fn engine(tokens: Vec<TokenRecord>) -> MergeEngine {
    MergeEngine::new(vec![Arc::new(Fixed { exchange: ExchangeId::Okx, tokens, delay: Duration::ZERO })])
  }

  fn all_empty_engine() -> MergeEngine {
    MergeEngine::new(
      ExchangeId::ALL
        .iter()
        .map(|id| Arc::new(Fixed { exchange: *id, tokens: Vec::new(), delay: Duration::ZERO }) as Arc<dyn ExchangeAdapter>)
        .collect(),
    )
  }

  fn previous() -> Snapshot {
    Snapshot {
      last_update: Utc.with_ymd_and_hms(2025, 3, 1, 11, 0, 0).unwrap(),
      tokens: vec![TokenRecord::new("BTC", "Bitcoin")],
      error: None,
    }
  }

  #[tokio::test]
  async fn test_successful_cycle_persists() {
    let store = Arc::new(MemoryStore::new());
    let orchestrator = Orchestrator::new(engine(vec![TokenRecord::new("ETH", "Ethereum")]), store.clone());

    let report = orchestrator.run_cycle().await.unwrap();
    assert_eq!(report.outcome, CycleOutcome::Persisted);
    assert!(report.snapshot.error.is_none());
    assert_eq!(store.load().await.unwrap(), Some(report.snapshot));
  }

  #[tokio::test]
  async fn test_all_empty_falls_back_to_previous() {
    let store = Arc::new(MemoryStore::with_snapshot(previous()));
    let orchestrator = Orchestrator::new(all_empty_engine(), store.clone());

    let report = orchestrator.run_cycle().await.unwrap();
    assert_eq!(report.outcome, CycleOutcome::Fallback);
    assert_eq!(report.snapshot.error.as_deref(), Some(NO_DATA_ERROR));
    assert_eq!(report.snapshot.last_update, previous().last_update);
    assert_eq!(report.snapshot.tokens, previous().tokens);

    // The stored copy is untouched.
    assert_eq!(store.load().await.unwrap(), Some(previous()));
  }

  #[tokio::test]
  async fn test_all_empty_without_previous_is_empty_error() {
    let store = Arc::new(MemoryStore::new());
    let orchestrator = Orchestrator::new(all_empty_engine(), store.clone());

    let report = orchestrator.run_cycle().await.unwrap();
    assert_eq!(report.outcome, CycleOutcome::EmptyError);
    assert!(report.snapshot.is_empty());
    assert_eq!(report.snapshot.error.as_deref(), Some(NO_DATA_ERROR));
    assert!(store.load().await.unwrap().is_none());
  }

  #[tokio::test]
  async fn test_task_failure_falls_back_with_reason() {
    let store = Arc::new(MemoryStore::with_snapshot(previous().with_error("older failure")));
    let orchestrator = Orchestrator::new(MergeEngine::new(vec![Arc::new(Panicking)]), store);

    let report = orchestrator.run_cycle().await.unwrap();
    assert_eq!(report.outcome, CycleOutcome::Fallback);
    let error = report.snapshot.error.unwrap();
    assert!(error.contains("OKX task failed"));
    assert!(!error.contains("older failure"));
  }

  #[tokio::test]
  async fn test_unreadable_previous_is_empty_error() {
    let orchestrator = Orchestrator::new(all_empty_engine(), Arc::new(UnreadableStore));
    let report = orchestrator.run_cycle().await.unwrap();
    assert_eq!(report.outcome, CycleOutcome::EmptyError);
  }

  #[tokio::test]
  async fn test_persist_failure_carries_snapshot() {
    let orchestrator = Orchestrator::new(engine(vec![TokenRecord::new("ETH", "")]), Arc::new(ReadOnlyStore));

    match orchestrator.run_cycle().await {
      Err(CollectorError::PersistFailed { reason, snapshot }) => {
        assert!(reason.contains("read-only"));
        assert_eq!(snapshot.tokens[0].symbol, "ETH");
      }
      other => panic!("Expected PersistFailed, got {:?}", other.map(|r| r.outcome)),
    }
  }

  #[tokio::test]
  async fn test_concurrent_cycles_never_interleave_writes() {
    let store = Arc::new(SlowStore::default());
    let orchestrator = Arc::new(Orchestrator::new(engine(vec![TokenRecord::new("SOL", "Solana")]), store.clone()));

    let first = tokio::spawn({
      let orchestrator = Arc::clone(&orchestrator);
      async move { orchestrator.run_cycle().await }
    });
    let second = tokio::spawn({
      let orchestrator = Arc::clone(&orchestrator);
      async move { orchestrator.run_cycle().await }
    });

    let first = first.await.unwrap().unwrap();
    let second = second.await.unwrap().unwrap();

    assert!(!store.overlapped.load(Ordering::SeqCst));
    assert_eq!(store.saves.load(Ordering::SeqCst), 2);
    let stored = store.load().await.unwrap().unwrap();
    assert!(stored == first.snapshot || stored == second.snapshot);
  }

  #[tokio::test]
  async fn test_orchestrators_sharing_a_lock_file_take_turns() {
    let dir = tempfile::TempDir::new().unwrap();
    let lock = dir.path().join(".collect.lock");
    let store = Arc::new(SlowStore::default());

    let manual = Arc::new(
      Orchestrator::new(engine(vec![TokenRecord::new("SOL", "Solana")]), store.clone()).with_lock_file(&lock),
    );
    let scheduled = Arc::new(
      Orchestrator::new(engine(vec![TokenRecord::new("ETH", "Ethereum")]), store.clone()).with_lock_file(&lock),
    );

    let running = tokio::spawn({
      let manual = Arc::clone(&manual);
      async move { manual.run_cycle().await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(matches!(scheduled.try_run_cycle().await, Err(CollectorError::CycleInProgress)));
    let waited = scheduled.run_cycle().await.unwrap();
    running.await.unwrap().unwrap();

    assert!(!store.overlapped.load(Ordering::SeqCst));
    assert_eq!(store.saves.load(Ordering::SeqCst), 2);
    assert_eq!(store.load().await.unwrap(), Some(waited.snapshot));
    assert!(lock.exists());
  }

  #[tokio::test]
  async fn test_unopenable_lock_file_is_a_store_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "file").unwrap();

    let orchestrator = Orchestrator::new(engine(vec![TokenRecord::new("SOL", "")]), Arc::new(MemoryStore::new()))
      .with_lock_file(blocker.join(".collect.lock"));
    assert!(matches!(orchestrator.run_cycle().await, Err(CollectorError::Store(_))));
  }

  #[tokio::test]
  async fn test_try_run_cycle_rejects_while_busy() {
    let store = Arc::new(SlowStore::default());
    let orchestrator = Arc::new(Orchestrator::new(engine(vec![TokenRecord::new("SOL", "")]), store));

    let running = tokio::spawn({
      let orchestrator = Arc::clone(&orchestrator);
      async move { orchestrator.run_cycle().await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(matches!(orchestrator.try_run_cycle().await, Err(CollectorError::CycleInProgress)));
    running.await.unwrap().unwrap();
    assert!(orchestrator.try_run_cycle().await.is_ok());
  }
}
