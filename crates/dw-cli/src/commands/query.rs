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

use super::load_snapshot;
use anyhow::{bail, Result};
use clap::Args;
use dw_core::Config;
use dw_models::{Snapshot, TokenStatus};

#[derive(Args, Debug)]
pub struct StatusCommand {
  /// Token symbol (case-insensitive)
  pub symbol: String,

  /// Print as JSON
  #[arg(long)]
  pub json: bool,
}

#[derive(Args, Debug)]
pub struct TokensCommand {
  /// Print as JSON
  #[arg(long)]
  pub json: bool,
}

#[derive(Args, Debug)]
pub struct LastUpdateCommand {}

pub async fn status(cmd: StatusCommand, config: Config) -> Result<()> {
  let snapshot = load_snapshot(&config).await?;
  let Some(status) = snapshot.token_status(&cmd.symbol) else {
    bail!("Token {} not found", cmd.symbol);
  };

  if cmd.json {
    println!("{}", serde_json::to_string_pretty(&status)?);
  } else {
    print!("{}", render_status(&status));
  }
  Ok(())
}

pub async fn tokens(cmd: TokensCommand, config: Config) -> Result<()> {
  let snapshot = load_snapshot(&config).await?;
  let summaries = snapshot.token_summaries();

  if cmd.json {
    println!("{}", serde_json::to_string_pretty(&summaries)?);
  } else {
    for token in &summaries {
      println!("{:<12} {}", token.symbol, token.name);
    }
  }
  Ok(())
}

pub async fn last_update(_cmd: LastUpdateCommand, config: Config) -> Result<()> {
  let snapshot = load_snapshot(&config).await?;
  println!("{}", describe_update(&snapshot));
  Ok(())
}

fn describe_update(snapshot: &Snapshot) -> String {
  match &snapshot.error {
    Some(error) => format!("{} (error: {})", snapshot.last_update.to_rfc3339(), error),
    None => snapshot.last_update.to_rfc3339(),
  }
}

fn render_status(status: &TokenStatus) -> String {
  let mut out = format!("{} ({})\n", status.symbol, status.name);
  for exchange in &status.exchanges {
    out.push_str(&format!("  {}\n", exchange.name));
    for chain in &exchange.chains {
      out.push_str(&format!(
        "    {:<12} deposit: {:<6} withdraw: {:<6} min: {:<10} fee: {}\n",
        chain.chain, chain.deposit_status, chain.withdraw_status, chain.min_withdraw, chain.withdraw_fee
      ));
    }
  }
  out.push_str(&format!("Updated: {}\n", status.last_update.to_rfc3339()));
  out
}
