//! Lenient deserializers for exchange payloads.
//!
//! Exchanges disagree on whether amounts are JSON strings or numbers, and
//! frequently send `null` for fields they do not populate.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Numeric-as-text field: strings pass through, numbers are rendered, anything
/// else (null, missing, objects) becomes an empty string.
///
/// Use together with `#[serde(default)]` so absent keys are accepted.
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  Ok(match value {
    Some(Value::String(s)) => s,
    Some(Value::Number(n)) => n.to_string(),
    _ => String::new(),
  })
}
