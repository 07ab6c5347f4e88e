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

//! Concurrent collection and priority-ordered merge.

use crate::error::{CollectorError, CollectorResult};
use crate::providers::{all_adapters, AdapterContext};
use crate::traits::ExchangeAdapter;
use dw_core::ExchangeId;
use dw_models::{Snapshot, TokenRecord, TokenSet};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Per-adapter result of one collection pass.
#[derive(Debug, Clone)]
pub struct AdapterOutput {
  pub exchange: ExchangeId,
  pub tokens: Vec<TokenRecord>,
}

/// Runs every adapter concurrently and folds their output into one snapshot.
pub struct MergeEngine {
  adapters: Vec<Arc<dyn ExchangeAdapter>>,
}

impl MergeEngine {
  /// Engine over `adapters`, merged in exchange priority order regardless of
  /// the order given.
  pub fn new(mut adapters: Vec<Arc<dyn ExchangeAdapter>>) -> Self {
    adapters.sort_by_key(|a| a.exchange());
    Self { adapters }
  }

  /// Engine over all supported exchanges, sharing one transport and archive.
  pub fn from_context(ctx: &AdapterContext) -> Self {
    Self::new(all_adapters(ctx))
  }

  pub fn exchanges(&self) -> Vec<ExchangeId> {
    self.adapters.iter().map(|a| a.exchange()).collect()
  }

  /// Fetch from every adapter and merge.
  ///
  /// Adapters run as independent tasks and every one is awaited before
  /// merging, even when a sibling has already failed. Adapters fail closed, so
  /// the only failure here is a task that panicked or was cancelled; it is
  /// reported once all tasks have finished.
  pub async fn collect(&self) -> CollectorResult<Snapshot> {
    let started = Instant::now();

    let handles: Vec<_> = self
      .adapters
      .iter()
      .map(|adapter| {
        let adapter = Arc::clone(adapter);
        tokio::spawn(async move {
          let begun = Instant::now();
          let tokens = adapter.fetch().await;
          info!(
            "{}: {} tokens in {}ms",
            adapter.exchange(),
            tokens.len(),
            begun.elapsed().as_millis()
          );
          AdapterOutput { exchange: adapter.exchange(), tokens }
        })
      })
      .collect();

    let joined = join_all(handles).await;

    let mut outputs = Vec::with_capacity(joined.len());
    let mut failure = None;
    for (adapter, result) in self.adapters.iter().zip(joined) {
      match result {
        Ok(output) => outputs.push(output),
        Err(e) => {
          error!("{} collection task failed: {}", adapter.exchange(), e);
          if failure.is_none() {
            failure = Some(format!("{} task failed: {}", adapter.exchange(), e));
          }
        }
      }
    }
    if let Some(reason) = failure {
      return Err(CollectorError::TaskFailed(reason));
    }

    let snapshot = Snapshot::new(merge(outputs));
    info!(
      "Merged {} tokens ({} chains) in {}ms",
      snapshot.tokens.len(),
      snapshot.chain_count(),
      started.elapsed().as_millis()
    );
    Ok(snapshot)
  }
}

/// Fold adapter output into one token list.
///
/// Outputs are taken in exchange priority order. A symbol's first appearance
/// fixes its position, exchange entries are appended verbatim and the first
/// non-empty display name wins.
pub fn merge(mut outputs: Vec<AdapterOutput>) -> Vec<TokenRecord> {
  outputs.sort_by_key(|o| o.exchange);

  let mut tokens = TokenSet::new();
  for output in outputs {
    debug!("Merging {} tokens from {}", output.tokens.len(), output.exchange);
    for record in output.tokens {
      tokens.absorb(record);
    }
  }
  tokens.into_vec()
}

#[cfg(test)]
mod tests {
  use super::*;
  use async_trait::async_trait;
  use dw_models::{ChainEntry, ChainStatus, ExchangeEntry};
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
      ExchangeId::Gate
    }

    async fn fetch_tokens(&self) -> CollectorResult<Vec<TokenRecord>> {
      panic!("mapping bug");
    }
  }

  fn record(symbol: &str, name: &str, exchange: ExchangeId, chain: &str) -> TokenRecord {
    let mut entry = ExchangeEntry::new(exchange.display_name());
    entry.chains.push(ChainEntry::closed(chain));
    TokenRecord { symbol: symbol.to_string(), name: name.to_string(), exchanges: vec![entry] }
  }

  fn adapter(exchange: ExchangeId, tokens: Vec<TokenRecord>, delay_ms: u64) -> Arc<dyn ExchangeAdapter> {
    Arc::new(Fixed { exchange, tokens, delay: Duration::from_millis(delay_ms) })
  }

  #[test]
  fn test_merge_priority_order_and_first_name_wins() {
    let outputs = vec![
      AdapterOutput {
        exchange: ExchangeId::Bitget,
        tokens: vec![record("ETH", "ETH", ExchangeId::Bitget, "ERC20"), record("PEPE", "PEPE", ExchangeId::Bitget, "ETH")],
      },
      AdapterOutput {
        exchange: ExchangeId::Okx,
        tokens: vec![record("ETH", "", ExchangeId::Okx, "ETH")],
      },
      AdapterOutput {
        exchange: ExchangeId::Binance,
        tokens: vec![record("ETH", "Ethereum", ExchangeId::Binance, "ETH")],
      },
    ];

    let tokens = merge(outputs);
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].symbol, "ETH");
    assert_eq!(tokens[0].name, "Ethereum");
    let names: Vec<&str> = tokens[0].exchanges.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["OKX", "Binance", "Bitget"]);
    assert_eq!(tokens[1].symbol, "PEPE");
  }

  #[test]
  fn test_merge_keeps_symbols_case_sensitive() {
    let outputs = vec![
      AdapterOutput { exchange: ExchangeId::Okx, tokens: vec![record("usdt", "", ExchangeId::Okx, "a")] },
      AdapterOutput { exchange: ExchangeId::Gate, tokens: vec![record("USDT", "", ExchangeId::Gate, "b")] },
    ];
    assert_eq!(merge(outputs).len(), 2);
  }

  #[test]
  fn test_merge_count_never_below_single_adapter() {
    let single = vec![record("A", "", ExchangeId::Bybit, "x"), record("B", "", ExchangeId::Bybit, "x")];
    let alone = merge(vec![AdapterOutput { exchange: ExchangeId::Bybit, tokens: single.clone() }]);
    let combined = merge(vec![
      AdapterOutput { exchange: ExchangeId::Bybit, tokens: single },
      AdapterOutput { exchange: ExchangeId::Okx, tokens: vec![record("A", "", ExchangeId::Okx, "y")] },
    ]);
    assert!(combined.len() >= alone.len());
  }

  #[tokio::test]
  async fn test_collect_waits_for_slowest_adapter() {
    let engine = MergeEngine::new(vec![
      adapter(ExchangeId::Bitget, vec![record("SOL", "Solana", ExchangeId::Bitget, "SOL")], 0),
      adapter(ExchangeId::Okx, vec![record("SOL", "", ExchangeId::Okx, "SOL")], 100),
      adapter(ExchangeId::Binance, Vec::new(), 0),
    ]);
    assert_eq!(engine.exchanges(), vec![ExchangeId::Okx, ExchangeId::Binance, ExchangeId::Bitget]);

    let snapshot = engine.collect().await.unwrap();
    assert!(snapshot.error.is_none());
    assert_eq!(snapshot.tokens.len(), 1);
    assert_eq!(snapshot.tokens[0].exchanges[0].name, "OKX");
    assert_eq!(snapshot.tokens[0].exchanges[1].name, "Bitget");
    assert_eq!(snapshot.tokens[0].name, "Solana");
  }

  #[tokio::test]
  async fn test_collect_scenario_okx_only_btc() {
    let mut okx = ExchangeEntry::new("OKX");
    okx.chains.push(ChainEntry {
      chain: "BTC".to_string(),
      deposit_status: ChainStatus::Open,
      withdraw_status: ChainStatus::Closed,
      contract_address: String::new(),
      min_withdraw: String::new(),
      withdraw_fee: String::new(),
    });
    let btc = TokenRecord { symbol: "BTC".into(), name: "Bitcoin".into(), exchanges: vec![okx] };

    let engine = MergeEngine::new(vec![
      adapter(ExchangeId::Okx, vec![btc], 0),
      adapter(ExchangeId::Binance, Vec::new(), 0),
    ]);
    let snapshot = engine.collect().await.unwrap();

    assert_eq!(snapshot.tokens.len(), 1);
    let token = &snapshot.tokens[0];
    assert_eq!(token.exchanges.len(), 1);
    assert_eq!(token.exchanges[0].chains.len(), 1);
    assert_eq!(token.exchanges[0].chains[0].deposit_status, ChainStatus::Open);
    assert_eq!(token.exchanges[0].chains[0].withdraw_status, ChainStatus::Closed);
  }

  #[tokio::test]
  async fn test_collect_reports_panicked_task_after_all_finish() {
    let engine = MergeEngine::new(vec![
      adapter(ExchangeId::Okx, vec![record("BTC", "", ExchangeId::Okx, "BTC")], 50),
      Arc::new(Panicking),
    ]);

    let result = engine.collect().await;
    if let Err(CollectorError::TaskFailed(reason)) = result {
      assert!(reason.contains("Gate.io"));
    } else {
      panic!("Expected TaskFailed");
    }
  }

  #[tokio::test]
  async fn test_collect_all_empty_is_not_an_error() {
    let engine = MergeEngine::new(vec![adapter(ExchangeId::Okx, Vec::new(), 0)]);
    let snapshot = engine.collect().await.unwrap();
    assert!(snapshot.is_empty());
    assert!(snapshot.error.is_none());
  }
}
