use anyhow::{Context, Result};
use dw_core::Config as CoreConfig;
use std::path::PathBuf;

/// Command-line overrides layered over the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
  pub data_dir: Option<PathBuf>,
  pub timeout_ms: Option<u64>,
}

pub fn load(overrides: &Overrides) -> Result<CoreConfig> {
  let config = CoreConfig::from_env().context("Failed to load configuration from environment")?;
  Ok(apply(config, overrides))
}

fn apply(mut config: CoreConfig, overrides: &Overrides) -> CoreConfig {
  if let Some(dir) = &overrides.data_dir {
    config.data_dir = dir.clone();
  }
  if let Some(timeout_ms) = overrides.timeout_ms.filter(|t| *t > 0) {
    config.timeout_ms = timeout_ms;
  }
  config
}
