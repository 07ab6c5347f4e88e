//! The unit of persistence and of external serving.

use crate::token::{ExchangeEntry, TokenRecord};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// One complete, timestamped aggregation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
  /// When the merge completed (millisecond precision)
  pub last_update: DateTime<Utc>,

  /// Tokens in first-seen merge order
  pub tokens: Vec<TokenRecord>,

  /// Set only when this snapshot is served in place of a failed collection
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

impl Snapshot {
  /// Fresh snapshot stamped with the current instant.
  pub fn new(tokens: Vec<TokenRecord>) -> Self {
    Self { last_update: now_millis(), tokens, error: None }
  }

  /// Empty snapshot flagged with `error`, used when nothing better exists.
  pub fn empty_with_error(error: impl Into<String>) -> Self {
    Self { last_update: now_millis(), tokens: Vec::new(), error: Some(error.into()) }
  }

  /// Replace the error marker, keeping data and timestamp.
  pub fn with_error(mut self, error: impl Into<String>) -> Self {
    self.error = Some(error.into());
    self
  }

  pub fn is_empty(&self) -> bool {
    self.tokens.is_empty()
  }

  pub fn chain_count(&self) -> usize {
    self.tokens.iter().map(TokenRecord::chain_count).sum()
  }

  /// Case-insensitive symbol lookup.
  pub fn find_token(&self, symbol: &str) -> Option<&TokenRecord> {
    self.tokens.iter().find(|t| t.symbol.eq_ignore_ascii_case(symbol))
  }

  /// Lookup result in the shape the query layer serves.
  pub fn token_status(&self, symbol: &str) -> Option<TokenStatus> {
    self.find_token(symbol).map(|t| TokenStatus {
      symbol: t.symbol.clone(),
      name: t.name.clone(),
      exchanges: t.exchanges.clone(),
      last_update: self.last_update,
    })
  }

  pub fn token_summaries(&self) -> Vec<TokenSummary> {
    self
      .tokens
      .iter()
      .map(|t| TokenSummary { symbol: t.symbol.clone(), name: t.name.clone() })
      .collect()
  }
}

fn now_millis() -> DateTime<Utc> {
  Utc::now().trunc_subsecs(3)
}

/// Symbol/name pair for token listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSummary {
  pub symbol: String,
  pub name: String,
}

/// Per-token status view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenStatus {
  pub symbol: String,
  pub name: String,
  pub exchanges: Vec<ExchangeEntry>,
  pub last_update: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::status::ChainStatus;
  use crate::token::ChainEntry;
  use chrono::TimeZone;
  use serde_json::json;

  fn sample() -> Snapshot {
    let mut okx = ExchangeEntry::new("OKX");
    okx.chains.push(ChainEntry {
      chain: "BTC".to_string(),
      deposit_status: ChainStatus::Open,
      withdraw_status: ChainStatus::Closed,
      contract_address: String::new(),
      min_withdraw: "0.001".to_string(),
      withdraw_fee: "0.0002".to_string(),
    });
    let mut btc = TokenRecord::new("BTC", "Bitcoin");
    btc.exchanges.push(okx);

    Snapshot {
      last_update: Utc.with_ymd_and_hms(2025, 3, 1, 12, 5, 0).unwrap(),
      tokens: vec![btc, TokenRecord::new("eth", "Ethereum")],
      error: None,
    }
  }

  #[test]
  fn test_json_shape() {
    let value = serde_json::to_value(sample()).unwrap();
    assert_eq!(value["last_update"], json!("2025-03-01T12:05:00Z"));
    assert!(value.get("error").is_none());

    let chain = &value["tokens"][0]["exchanges"][0]["chains"][0];
    assert_eq!(chain["chain"], "BTC");
    assert_eq!(chain["deposit_status"], "open");
    assert_eq!(chain["withdraw_status"], "closed");
    assert_eq!(chain["contract_address"], "");
  }

  #[test]
  fn test_error_serialized_when_present() {
    let value = serde_json::to_value(sample().with_error("OKX timed out")).unwrap();
    assert_eq!(value["error"], "OKX timed out");
  }

  #[test]
  fn test_round_trip_preserves_all_fields() {
    let original = sample().with_error("stale");
    let text = serde_json::to_string_pretty(&original).unwrap();
    let restored: Snapshot = serde_json::from_str(&text).unwrap();
    assert_eq!(restored, original);
  }

  #[test]
  fn test_fresh_timestamp_survives_round_trip() {
    let original = Snapshot::new(vec![TokenRecord::new("SOL", "Solana")]);
    let restored: Snapshot =
      serde_json::from_str(&serde_json::to_string(&original).unwrap()).unwrap();
    assert_eq!(restored.last_update, original.last_update);
  }

  #[test]
  fn test_find_token_is_case_insensitive() {
    let snapshot = sample();
    assert_eq!(snapshot.find_token("btc").map(|t| t.name.as_str()), Some("Bitcoin"));
    assert_eq!(snapshot.find_token("ETH").map(|t| t.symbol.as_str()), Some("eth"));
    assert!(snapshot.find_token("DOGE").is_none());
  }

  #[test]
  fn test_token_status_and_summaries() {
    let snapshot = sample();
    let status = snapshot.token_status("Btc").unwrap();
    assert_eq!(status.exchanges.len(), 1);
    assert_eq!(status.last_update, snapshot.last_update);

    let summaries = snapshot.token_summaries();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[1], TokenSummary { symbol: "eth".into(), name: "Ethereum".into() });
    assert_eq!(snapshot.chain_count(), 1);
  }

  #[test]
  fn test_empty_with_error() {
    let snapshot = Snapshot::empty_with_error("no data");
    assert!(snapshot.is_empty());
    assert_eq!(snapshot.error.as_deref(), Some("no data"));
  }
}
