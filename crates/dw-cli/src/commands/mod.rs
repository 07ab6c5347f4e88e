pub mod collect;
pub mod query;
pub mod run;

use anyhow::Result;
use dw_collectors::{JsonFileStore, SnapshotStore};
use dw_core::Config;
use dw_models::Snapshot;

/// Load the persisted snapshot, failing if no cycle has completed yet.
pub async fn load_snapshot(config: &Config) -> Result<Snapshot> {
  let path = config.snapshot_path();
  JsonFileStore::new(&path)
    .load()
    .await?
    .ok_or_else(|| anyhow::anyhow!("No snapshot at {}; run `dw collect` first", path.display()))
}
