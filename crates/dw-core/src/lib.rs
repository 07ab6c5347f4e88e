//! # dw-core
//!
//! Shared building blocks for the deposit/withdrawal aggregator: the registry of
//! supported exchanges, process configuration and the common error type.

pub mod config;
pub mod error;

pub use config::{Config, Credentials, ExchangeCredentials};
pub use error::{Error, Result};

use serde::{Deserialize, Serialize};

/// The supported exchanges.
///
/// Declaration order is the merge priority order: adapter output is combined
/// OKX first and Bitget last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExchangeId {
  Okx,
  Binance,
  Bybit,
  Gate,
  Bitget,
}

impl ExchangeId {
  /// Every exchange, in merge priority order.
  pub const ALL: [ExchangeId; 5] =
    [ExchangeId::Okx, ExchangeId::Binance, ExchangeId::Bybit, ExchangeId::Gate, ExchangeId::Bitget];

  /// Canonical display name, as it appears in `ExchangeEntry::name`.
  pub fn display_name(&self) -> &'static str {
    match self {
      ExchangeId::Okx => "OKX",
      ExchangeId::Binance => "Binance",
      ExchangeId::Bybit => "Bybit",
      ExchangeId::Gate => "Gate.io",
      ExchangeId::Bitget => "Bitget",
    }
  }

  /// Lowercase identifier used for environment prefixes and file paths.
  pub fn slug(&self) -> &'static str {
    match self {
      ExchangeId::Okx => "okx",
      ExchangeId::Binance => "binance",
      ExchangeId::Bybit => "bybit",
      ExchangeId::Gate => "gate",
      ExchangeId::Bitget => "bitget",
    }
  }

  /// Production REST host.
  pub fn default_base_url(&self) -> &'static str {
    match self {
      ExchangeId::Okx => OKX_BASE_URL,
      ExchangeId::Binance => BINANCE_BASE_URL,
      ExchangeId::Bybit => BYBIT_BASE_URL,
      ExchangeId::Gate => GATE_BASE_URL,
      ExchangeId::Bitget => BITGET_BASE_URL,
    }
  }

  /// Path of the currency/network listing endpoint.
  pub fn currencies_path(&self) -> &'static str {
    match self {
      ExchangeId::Okx => "/api/v5/asset/currencies",
      ExchangeId::Binance => "/sapi/v1/capital/config/getall",
      ExchangeId::Bybit => "/v5/asset/coin/query-info",
      ExchangeId::Gate => "/api/v4/spot/currencies",
      ExchangeId::Bitget => "/api/v2/spot/public/coins",
    }
  }
}

impl std::fmt::Display for ExchangeId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.display_name())
  }
}

/// HTTP methods the signer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
  Get,
  Post,
}

impl HttpMethod {
  pub fn as_str(&self) -> &'static str {
    match self {
      HttpMethod::Get => "GET",
      HttpMethod::Post => "POST",
    }
  }
}

impl std::fmt::Display for HttpMethod {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Production hosts
pub const OKX_BASE_URL: &str = "https://www.okx.com";
pub const BINANCE_BASE_URL: &str = "https://api.binance.com";
pub const BYBIT_BASE_URL: &str = "https://api.bybit.com";
pub const GATE_BASE_URL: &str = "https://api.gateio.ws";
pub const BITGET_BASE_URL: &str = "https://api.bitget.com";

/// Per-request timeout when `API_TIMEOUT` is not set
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

/// Bybit receive window sent with every signed request
pub const BYBIT_RECV_WINDOW: &str = "5000";

/// Scheduled collection period when `REFRESH_INTERVAL_SECS` is not set
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 3_600;
