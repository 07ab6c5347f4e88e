/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-dot-]browne[-at-]dwightjbrowne[-dot-]com
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

use anyhow::{bail, Result};
use clap::Args;
use dw_collectors::{CollectorError, CycleOutcome, Orchestrator};
use dw_core::{Config, ExchangeId};
use dw_models::Snapshot;
use tracing::{info, warn};

#[derive(Args, Debug)]
pub struct CollectCommand {
  /// Print the snapshot as JSON instead of a summary
  #[arg(long)]
  pub json: bool,
}

pub async fn execute(cmd: CollectCommand, config: Config) -> Result<()> {
  let orchestrator = Orchestrator::from_config(&config)?;

  let (snapshot, outcome) = match orchestrator.run_cycle().await {
    Ok(report) => (report.snapshot, Some(report.outcome)),
    Err(CollectorError::PersistFailed { reason, snapshot }) => {
      warn!("Snapshot not saved: {}", reason);
      (*snapshot, None)
    }
    Err(e) => return Err(e.into()),
  };

  if cmd.json {
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
  } else {
    print!("{}", summary(&snapshot));
  }

  match outcome {
    Some(CycleOutcome::Persisted) => {
      info!("Snapshot written to {}", config.snapshot_path().display());
      Ok(())
    }
    Some(CycleOutcome::Fallback) => {
      warn!("Served previous snapshot");
      Ok(())
    }
    Some(CycleOutcome::EmptyError) => bail!("Collection failed and no previous snapshot exists"),
    None => bail!("Collected snapshot could not be persisted"),
  }
}

/// Human-readable overview of a snapshot.
pub fn summary(snapshot: &Snapshot) -> String {
  let mut out = format!(
    "Last update: {}\nTokens: {}\nChains: {}\n",
    snapshot.last_update.to_rfc3339(),
    snapshot.tokens.len(),
    snapshot.chain_count()
  );

  for exchange in ExchangeId::ALL {
    let listed = snapshot
      .tokens
      .iter()
      .filter(|t| t.exchanges.iter().any(|e| e.name == exchange.display_name()))
      .count();
    out.push_str(&format!("  {:<8} {:>6} tokens\n", exchange.display_name(), listed));
  }

  if let Some(error) = &snapshot.error {
    out.push_str(&format!("Error: {}\n", error));
  }
  out
}
