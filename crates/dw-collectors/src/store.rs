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

//! Persistence of the last good snapshot.

use crate::error::{CollectorError, CollectorResult};
use async_trait::async_trait;
use dw_models::Snapshot;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Storage for the last good snapshot.
///
/// This trait keeps the orchestrator independent of where snapshots live.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
  /// The last saved snapshot, or `None` if nothing has been saved yet.
  async fn load(&self) -> CollectorResult<Option<Snapshot>>;

  /// Replace the stored snapshot.
  async fn save(&self, snapshot: &Snapshot) -> CollectorResult<()>;
}

/// Snapshot kept as one pretty-printed JSON file.
///
/// Each write goes to its own uniquely named temp file in the target's
/// directory, which is then renamed over the target. Readers see either the
/// old or the new file, and concurrent writers, even from separate processes,
/// never share a temp file.
#[derive(Debug)]
pub struct JsonFileStore {
  path: PathBuf,
}

impl JsonFileStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  fn dir(&self) -> &Path {
    match self.path.parent() {
      Some(dir) if !dir.as_os_str().is_empty() => dir,
      _ => Path::new("."),
    }
  }
}

fn write_atomically(dir: &Path, path: &Path, text: &str) -> std::io::Result<()> {
  let mut temp = NamedTempFile::new_in(dir)?;
  temp.write_all(text.as_bytes())?;
  temp.as_file().sync_all()?;
  temp.persist(path).map_err(|e| e.error)?;
  Ok(())
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
  async fn load(&self) -> CollectorResult<Option<Snapshot>> {
    let text = match tokio::fs::read_to_string(&self.path).await {
      Ok(text) => text,
      Err(e) if e.kind() == ErrorKind::NotFound => {
        debug!("No snapshot at {}", self.path.display());
        return Ok(None);
      }
      Err(e) => {
        return Err(CollectorError::Store(format!("Failed to read {}: {}", self.path.display(), e)));
      }
    };

    let snapshot = serde_json::from_str(&text)?;
    Ok(Some(snapshot))
  }

  async fn save(&self, snapshot: &Snapshot) -> CollectorResult<()> {
    let text = serde_json::to_string_pretty(snapshot)?;
    let store_err =
      |e: std::io::Error| CollectorError::Store(format!("Failed to write {}: {}", self.path.display(), e));

    let dir = self.dir().to_path_buf();
    tokio::fs::create_dir_all(&dir).await.map_err(store_err)?;

    let path = self.path.clone();
    tokio::task::spawn_blocking(move || write_atomically(&dir, &path, &text))
      .await
      .map_err(|e| CollectorError::Store(format!("Snapshot write task failed: {}", e)))?
      .map_err(store_err)?;

    info!("Saved {} tokens to {}", snapshot.tokens.len(), self.path.display());
    Ok(())
  }
}

/// In-process store, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
  snapshot: RwLock<Option<Snapshot>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_snapshot(snapshot: Snapshot) -> Self {
    Self { snapshot: RwLock::new(Some(snapshot)) }
  }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
  async fn load(&self) -> CollectorResult<Option<Snapshot>> {
    Ok(self.snapshot.read().await.clone())
  }

  async fn save(&self, snapshot: &Snapshot) -> CollectorResult<()> {
    *self.snapshot.write().await = Some(snapshot.clone());
    Ok(())
  }
}
