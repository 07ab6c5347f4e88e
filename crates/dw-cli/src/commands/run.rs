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

use anyhow::Result;
use clap::Args;
use dw_collectors::{run_scheduled, Orchestrator};
use dw_core::Config;
use std::time::Duration;
use tracing::{error, info};

#[derive(Args, Debug)]
pub struct RunCommand {
  /// Seconds between cycles (overrides REFRESH_INTERVAL_SECS)
  #[arg(long)]
  pub interval_secs: Option<u64>,
}

pub async fn execute(cmd: RunCommand, config: Config) -> Result<()> {
  let period = Duration::from_secs(cmd.interval_secs.filter(|s| *s > 0).unwrap_or(config.refresh_interval_secs));
  let orchestrator = Orchestrator::from_config(&config)?;

  let shutdown = async {
    match tokio::signal::ctrl_c().await {
      Ok(()) => info!("Received Ctrl-C, shutting down"),
      Err(e) => {
        error!("Unable to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await
      }
    }
  };

  let cycles = run_scheduled(&orchestrator, period, shutdown).await;
  info!("Ran {} collection cycles", cycles);
  Ok(())
}
