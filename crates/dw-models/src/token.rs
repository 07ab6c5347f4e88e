//! Token, exchange and chain records.

use crate::status::ChainStatus;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One deposit/withdraw path for a token on one exchange.
///
/// `chain` keeps the exchange's own network naming; it is not normalized
/// across exchanges. Unknown text fields are empty strings, never omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEntry {
  pub chain: String,
  pub deposit_status: ChainStatus,
  pub withdraw_status: ChainStatus,
  pub contract_address: String,
  pub min_withdraw: String,
  pub withdraw_fee: String,
}

impl ChainEntry {
  /// A chain with both directions closed and no metadata.
  pub fn closed(chain: impl Into<String>) -> Self {
    Self {
      chain: chain.into(),
      deposit_status: ChainStatus::Closed,
      withdraw_status: ChainStatus::Closed,
      contract_address: String::new(),
      min_withdraw: String::new(),
      withdraw_fee: String::new(),
    }
  }
}

/// One exchange's presence for a token; chains keep API response order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeEntry {
  pub name: String,
  pub chains: Vec<ChainEntry>,
}

impl ExchangeEntry {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into(), chains: Vec::new() }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
  pub symbol: String,
  pub name: String,
  pub exchanges: Vec<ExchangeEntry>,
}

impl TokenRecord {
  /// New record; an empty display name falls back to the symbol.
  pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
    let symbol = symbol.into();
    let name = name.into();
    let name = if name.is_empty() { symbol.clone() } else { name };
    Self { symbol, name, exchanges: Vec::new() }
  }

  pub fn chain_count(&self) -> usize {
    self.exchanges.iter().map(|e| e.chains.len()).sum()
  }
}

/// Insertion-ordered collection of token records keyed by symbol.
///
/// Symbols are matched exactly (case-sensitive). The first time a symbol is
/// seen fixes its position in the output.
#[derive(Debug, Default, Clone)]
pub struct TokenSet {
  tokens: Vec<TokenRecord>,
  index: HashMap<String, usize>,
}

impl TokenSet {
  pub fn new() -> Self {
    Self::default()
  }

  /// Look up `symbol`, creating it with `name` (symbol fallback) if absent.
  pub fn token_mut(&mut self, symbol: &str, name: &str) -> &mut TokenRecord {
    let idx = match self.index.get(symbol) {
      Some(idx) => *idx,
      None => {
        self.tokens.push(TokenRecord::new(symbol, name));
        let idx = self.tokens.len() - 1;
        self.index.insert(symbol.to_string(), idx);
        idx
      }
    };
    &mut self.tokens[idx]
  }

  /// Append a complete exchange entry under `symbol` without merging it into
  /// entries already present for the same exchange.
  pub fn push_exchange(&mut self, symbol: &str, name: &str, entry: ExchangeEntry) {
    self.token_mut(symbol, name).exchanges.push(entry);
  }

  /// Append a chain to the single entry `exchange` owns under `symbol`,
  /// creating that entry on first use.
  pub fn push_chain(&mut self, symbol: &str, name: &str, exchange: &str, chain: ChainEntry) {
    let token = self.token_mut(symbol, name);
    match token.exchanges.iter_mut().find(|e| e.name == exchange) {
      Some(entry) => entry.chains.push(chain),
      None => {
        let mut entry = ExchangeEntry::new(exchange);
        entry.chains.push(chain);
        token.exchanges.push(entry);
      }
    }
  }

  /// Fold another source's record in: its exchange entries are appended
  /// verbatim and the first non-empty display name wins.
  pub fn absorb(&mut self, record: TokenRecord) {
    match self.index.get(&record.symbol) {
      Some(idx) => {
        let token = &mut self.tokens[*idx];
        if token.name.is_empty() && !record.name.is_empty() {
          token.name = record.name;
        }
        token.exchanges.extend(record.exchanges);
      }
      None => {
        self.index.insert(record.symbol.clone(), self.tokens.len());
        self.tokens.push(record);
      }
    }
  }

  pub fn get(&self, symbol: &str) -> Option<&TokenRecord> {
    self.index.get(symbol).map(|idx| &self.tokens[*idx])
  }

  pub fn len(&self) -> usize {
    self.tokens.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tokens.is_empty()
  }

  pub fn into_vec(self) -> Vec<TokenRecord> {
    self.tokens
  }
}
