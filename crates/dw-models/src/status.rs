//! Two-valued deposit/withdraw availability.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Availability of a deposit or withdrawal path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainStatus {
  Open,
  Closed,
}

impl ChainStatus {
  /// Normalize an exchange-native "enabled" flag.
  ///
  /// `true`, `"true"`, `"1"` and `1` are open; everything else, absence
  /// included, is closed.
  pub fn from_enabled(flag: Option<&Value>) -> Self {
    match flag {
      Some(Value::Bool(true)) => ChainStatus::Open,
      Some(Value::String(s)) if s.eq_ignore_ascii_case("true") || s == "1" => ChainStatus::Open,
      Some(Value::Number(n)) if n.as_i64() == Some(1) => ChainStatus::Open,
      _ => ChainStatus::Closed,
    }
  }

  /// Normalize an exchange-native "disabled" flag.
  ///
  /// Only an explicit `false`, `"false"`, `"0"` or `0` is open.
  pub fn from_disabled(flag: Option<&Value>) -> Self {
    match flag {
      Some(Value::Bool(false)) => ChainStatus::Open,
      Some(Value::String(s)) if s.eq_ignore_ascii_case("false") || s == "0" => ChainStatus::Open,
      Some(Value::Number(n)) if n.as_i64() == Some(0) => ChainStatus::Open,
      _ => ChainStatus::Closed,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      ChainStatus::Open => "open",
      ChainStatus::Closed => "closed",
    }
  }
}

impl std::fmt::Display for ChainStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.pad(self.as_str())
  }
}
