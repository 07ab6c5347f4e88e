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
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
use commands::{
  collect::CollectCommand,
  query::{LastUpdateCommand, StatusCommand, TokensCommand},
  run::RunCommand,
};

mod config;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "dw")]
#[command(propagate_version = true)]
struct Cli {
  #[command(subcommand)]
  command: Commands,

  /// Verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Directory holding the snapshot and raw archive (overrides DW_DATA_DIR)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  /// Per-request timeout in milliseconds (overrides API_TIMEOUT)
  #[arg(long, global = true)]
  timeout_ms: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Commands {
  /// Run one collection cycle
  Collect(CollectCommand),
  /// Collect on a fixed interval until interrupted
  Run(RunCommand),
  /// Show deposit/withdrawal status for one token
  Status(StatusCommand),
  /// List known tokens
  Tokens(TokensCommand),
  /// Show when the stored snapshot was taken
  LastUpdate(LastUpdateCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
  // Load environment variables
  dotenv().ok();

  // Parse CLI arguments
  let cli = Cli::parse();

  // Initialize logging; RUST_LOG takes precedence
  let log_level = if cli.verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
  tracing_subscriber::fmt().with_env_filter(filter).init();

  // Load configuration
  let overrides = config::Overrides { data_dir: cli.data_dir, timeout_ms: cli.timeout_ms };
  let config = config::load(&overrides)?;

  // Execute command
  match cli.command {
    Commands::Collect(cmd) => commands::collect::execute(cmd, config).await?,
    Commands::Run(cmd) => commands::run::execute(cmd, config).await?,
    Commands::Status(cmd) => commands::query::status(cmd, config).await?,
    Commands::Tokens(cmd) => commands::query::tokens(cmd, config).await?,
    Commands::LastUpdate(cmd) => commands::query::last_update(cmd, config).await?,
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_commands() {
    let cli = Cli::try_parse_from(["dw", "-v", "collect", "--json"]).unwrap();
    assert!(cli.verbose);
    assert!(matches!(cli.command, Commands::Collect(CollectCommand { json: true })));

    let cli = Cli::try_parse_from(["dw", "run", "--interval-secs", "60"]).unwrap();
    assert!(matches!(cli.command, Commands::Run(RunCommand { interval_secs: Some(60) })));

    let cli = Cli::try_parse_from(["dw", "--data-dir", "/srv/dw", "status", "usdt"]).unwrap();
    assert_eq!(cli.data_dir, Some(PathBuf::from("/srv/dw")));
    assert!(matches!(cli.command, Commands::Status(StatusCommand { ref symbol, .. }) if symbol == "usdt"));

    assert!(Cli::try_parse_from(["dw", "last-update"]).is_ok());
    assert!(Cli::try_parse_from(["dw", "status"]).is_err());
  }
}
