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

//! Periodic collection trigger.

use crate::error::CollectorError;
use crate::orchestrator::Orchestrator;
use std::future::Future;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

/// Run one cycle now and then one every `period` until `shutdown` resolves.
///
/// Failed cycles are logged and the loop carries on. A cycle in progress when
/// `shutdown` resolves is allowed to finish. Returns the number of cycles run.
pub async fn run_scheduled<F>(orchestrator: &Orchestrator, period: Duration, shutdown: F) -> usize
where
  F: Future<Output = ()>,
{
  info!("Scheduling collection every {}s", period.as_secs());

  let mut ticker = interval(period);
  ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
  tokio::pin!(shutdown);

  let mut cycles = 0;
  loop {
    tokio::select! {
      _ = &mut shutdown => {
        info!("Scheduler stopping after {} cycles", cycles);
        return cycles;
      }
      _ = ticker.tick() => {
        cycles += 1;
        match orchestrator.run_cycle().await {
          Ok(report) => info!("Scheduled cycle {} finished: {:?}", cycles, report.outcome),
          Err(CollectorError::PersistFailed { reason, .. }) => {
            warn!("Scheduled cycle {} collected data but could not persist it: {}", cycles, reason)
          }
          Err(e) => error!("Scheduled cycle {} failed: {}", cycles, e),
        }
      }
    }
  }
}
