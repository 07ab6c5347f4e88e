//! Configuration management for the collection engine

use crate::error::{Error, Result};
use crate::{ExchangeId, DEFAULT_REFRESH_INTERVAL_SECS, DEFAULT_TIMEOUT_MS};
use dotenvy::dotenv;
use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

/// API credentials for a single exchange.
///
/// Every field may be empty: signing proceeds with whatever is present.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ExchangeCredentials {
  pub api_key: String,
  pub secret: String,
  pub passphrase: String,
  /// OKX only
  pub project: Option<String>,
}

impl ExchangeCredentials {
  pub fn new(api_key: impl Into<String>, secret: impl Into<String>) -> Self {
    Self { api_key: api_key.into(), secret: secret.into(), ..Default::default() }
  }

  pub fn with_passphrase(mut self, passphrase: impl Into<String>) -> Self {
    self.passphrase = passphrase.into();
    self
  }

  pub fn with_project(mut self, project: impl Into<String>) -> Self {
    self.project = Some(project.into());
    self
  }

  /// True when key and secret (and the passphrase, where the exchange wants one) are set.
  pub fn is_complete(&self, exchange: ExchangeId) -> bool {
    let base = !self.api_key.is_empty() && !self.secret.is_empty();
    match exchange {
      ExchangeId::Okx | ExchangeId::Bitget => base && !self.passphrase.is_empty(),
      _ => base,
    }
  }
}

// Secrets never reach the logs.
impl std::fmt::Debug for ExchangeCredentials {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ExchangeCredentials")
      .field("api_key", &redact(&self.api_key))
      .field("secret", &redact(&self.secret))
      .field("passphrase", &redact(&self.passphrase))
      .field("project", &self.project)
      .finish()
  }
}

fn redact(value: &str) -> &'static str {
  if value.is_empty() {
    "<unset>"
  } else {
    "<redacted>"
  }
}

/// Credentials for every supported exchange
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
  pub okx: ExchangeCredentials,
  pub binance: ExchangeCredentials,
  pub bybit: ExchangeCredentials,
  pub gate: ExchangeCredentials,
  pub bitget: ExchangeCredentials,
}

impl Credentials {
  pub fn for_exchange(&self, exchange: ExchangeId) -> &ExchangeCredentials {
    match exchange {
      ExchangeId::Okx => &self.okx,
      ExchangeId::Binance => &self.binance,
      ExchangeId::Bybit => &self.bybit,
      ExchangeId::Gate => &self.gate,
      ExchangeId::Bitget => &self.bitget,
    }
  }

  fn from_lookup<F>(lookup: &F) -> Self
  where
    F: Fn(&str) -> Option<String>,
  {
    let get = |key: &str| lookup(key).unwrap_or_default();

    let mut okx = ExchangeCredentials::new(get("OKX_API_KEY"), get("OKX_API_SECRET"))
      .with_passphrase(get("OKX_API_PASSPHRASE"));
    okx.project = lookup("OKX_API_PROJECT").filter(|p| !p.is_empty());

    Self {
      okx,
      binance: ExchangeCredentials::new(get("BINANCE_API_KEY"), get("BINANCE_API_SECRET")),
      bybit: ExchangeCredentials::new(get("BYBIT_API_KEY"), get("BYBIT_API_SECRET")),
      gate: ExchangeCredentials::new(get("GATE_API_KEY"), get("GATE_API_SECRET")),
      bitget: ExchangeCredentials::new(get("BITGET_API_KEY"), get("BITGET_API_SECRET"))
        .with_passphrase(get("BITGET_API_PASSPHRASE")),
    }
  }
}

/// Process-wide configuration, built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct Config {
  /// Exchange API credentials
  pub credentials: Credentials,

  /// Per-request timeout in milliseconds
  pub timeout_ms: u64,

  /// REST host per exchange
  pub base_urls: BTreeMap<ExchangeId, String>,

  /// Root directory for the persisted snapshot and the raw archive
  pub data_dir: PathBuf,

  /// Whether raw exchange responses are archived
  pub archive_raw: bool,

  /// Upper bound on concurrent archive writes
  pub archive_concurrency: usize,

  /// Scheduled collection period in seconds
  pub refresh_interval_secs: u64,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      credentials: Credentials::default(),
      timeout_ms: DEFAULT_TIMEOUT_MS,
      base_urls: ExchangeId::ALL
        .iter()
        .map(|id| (*id, id.default_base_url().to_string()))
        .collect(),
      data_dir: PathBuf::from("data"),
      archive_raw: true,
      archive_concurrency: 4,
      refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
    }
  }
}

impl Config {
  /// Load configuration from environment variables (and `.env` if present)
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    Self::from_lookup(|key| env::var(key).ok())
  }

  /// Build configuration from an arbitrary key lookup.
  pub fn from_lookup<F>(lookup: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let defaults = Config::default();

    let timeout_ms = parse_or(&lookup, "API_TIMEOUT", defaults.timeout_ms)?;
    if timeout_ms == 0 {
      return Err(Error::Config("API_TIMEOUT must be greater than zero".to_string()));
    }

    let archive_concurrency = parse_or(&lookup, "DW_ARCHIVE_CONCURRENCY", defaults.archive_concurrency)?;
    if archive_concurrency == 0 {
      return Err(Error::Config("DW_ARCHIVE_CONCURRENCY must be greater than zero".to_string()));
    }

    let refresh_interval_secs =
      parse_or(&lookup, "REFRESH_INTERVAL_SECS", defaults.refresh_interval_secs)?;
    if refresh_interval_secs == 0 {
      return Err(Error::Config("REFRESH_INTERVAL_SECS must be greater than zero".to_string()));
    }

    let archive_raw = match lookup("DW_ARCHIVE_RAW").filter(|v| !v.is_empty()) {
      None => defaults.archive_raw,
      Some(v) => match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => return Err(Error::Config(format!("Invalid DW_ARCHIVE_RAW: {}", v))),
      },
    };

    let base_urls = ExchangeId::ALL
      .iter()
      .map(|id| {
        let key = format!("{}_BASE_URL", id.slug().to_ascii_uppercase());
        let url = lookup(&key)
          .filter(|v| !v.is_empty())
          .unwrap_or_else(|| id.default_base_url().to_string());
        (*id, url.trim_end_matches('/').to_string())
      })
      .collect();

    let data_dir =
      lookup("DW_DATA_DIR").filter(|v| !v.is_empty()).map(PathBuf::from).unwrap_or(defaults.data_dir);

    Ok(Config {
      credentials: Credentials::from_lookup(&lookup),
      timeout_ms,
      base_urls,
      data_dir,
      archive_raw,
      archive_concurrency,
      refresh_interval_secs,
    })
  }

  /// REST host for an exchange, falling back to production.
  pub fn base_url(&self, exchange: ExchangeId) -> &str {
    self.base_urls.get(&exchange).map(String::as_str).unwrap_or_else(|| exchange.default_base_url())
  }

  /// Point one exchange at a different host (used against mock servers).
  pub fn with_base_url(mut self, exchange: ExchangeId, url: impl Into<String>) -> Self {
    self.base_urls.insert(exchange, url.into());
    self
  }

  /// Location of the persisted "last good" snapshot.
  pub fn snapshot_path(&self) -> PathBuf {
    self.data_dir.join("exchange_data.json")
  }

  /// Root of the raw response archive.
  pub fn archive_dir(&self) -> PathBuf {
    self.data_dir.join("raw_responses")
  }

  /// File locked for the duration of a collection cycle, shared by every
  /// process using the same data directory.
  pub fn lock_path(&self) -> PathBuf {
    self.data_dir.join(".collect.lock")
  }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
  F: Fn(&str) -> Option<String>,
  T: std::str::FromStr,
{
  match lookup(key).filter(|v| !v.is_empty()) {
    None => Ok(default),
    Some(raw) => raw.trim().parse().map_err(|_| Error::Config(format!("Invalid {}: {}", key, raw))),
  }
}
