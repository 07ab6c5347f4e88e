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

//! Bybit coin info adapter.

use crate::error::{CollectorError, CollectorResult};
use crate::providers::AdapterContext;
use crate::traits::ExchangeAdapter;
use async_trait::async_trait;
use dw_core::ExchangeId;
use dw_models::de::text;
use dw_models::{ChainEntry, ChainStatus, ExchangeEntry, TokenRecord, TokenSet};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

/// Bybit adapter. The listing has one row per coin with a chain list.
pub struct BybitAdapter {
  ctx: AdapterContext,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BybitEnvelope {
  ret_code: Option<i64>,
  #[serde(default, deserialize_with = "text")]
  ret_msg: String,
  result: Option<BybitResult>,
}

#[derive(Debug, Deserialize)]
struct BybitResult {
  rows: Option<Vec<BybitCoin>>,
}

#[derive(Debug, Deserialize)]
struct BybitCoin {
  #[serde(default, deserialize_with = "text")]
  coin: String,
  #[serde(default, deserialize_with = "text")]
  name: String,
  #[serde(default)]
  chains: Option<Vec<BybitChain>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BybitChain {
  #[serde(default, deserialize_with = "text")]
  chain: String,
  chain_deposit: Option<Value>,
  chain_withdraw: Option<Value>,
  #[serde(default, deserialize_with = "text")]
  withdraw_min: String,
  #[serde(default, deserialize_with = "text")]
  withdraw_fee: String,
}

impl BybitAdapter {
  pub fn new(ctx: AdapterContext) -> Self {
    Self { ctx }
  }
}

#[async_trait]
impl ExchangeAdapter for BybitAdapter {
  fn exchange(&self) -> ExchangeId {
    ExchangeId::Bybit
  }

  async fn fetch_tokens(&self) -> CollectorResult<Vec<TokenRecord>> {
    let body = self.ctx.fetch_listing(ExchangeId::Bybit).await?;
    let tokens = parse(&body)?;
    info!("Successfully processed {} tokens from Bybit", tokens.len());
    Ok(tokens)
  }
}

/// Map a Bybit `/v5/asset/coin/query-info` body.
///
/// Each row becomes its own `Bybit` entry. Bybit publishes no contract
/// addresses.
pub fn parse(body: &str) -> CollectorResult<Vec<TokenRecord>> {
  let envelope: BybitEnvelope = serde_json::from_str(body)?;
  if envelope.ret_code != Some(0) {
    return Err(CollectorError::ApiError {
      exchange: ExchangeId::Bybit,
      code: envelope.ret_code.map(|c| c.to_string()).unwrap_or_default(),
      message: envelope.ret_msg,
    });
  }
  let rows = envelope
    .result
    .and_then(|r| r.rows)
    .ok_or_else(|| CollectorError::invalid(ExchangeId::Bybit, "missing result.rows"))?;
  debug!("Bybit returned {} coins", rows.len());

  let name = ExchangeId::Bybit.display_name();
  let mut tokens = TokenSet::new();
  for row in rows {
    let mut entry = ExchangeEntry::new(name);
    for chain in row.chains.unwrap_or_default() {
      entry.chains.push(ChainEntry {
        chain: chain.chain,
        deposit_status: ChainStatus::from_enabled(chain.chain_deposit.as_ref()),
        withdraw_status: ChainStatus::from_enabled(chain.chain_withdraw.as_ref()),
        contract_address: String::new(),
        min_withdraw: chain.withdraw_min,
        withdraw_fee: chain.withdraw_fee,
      });
    }
    tokens.push_exchange(&row.coin, &row.name, entry);
  }

  Ok(tokens.into_vec())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::providers::test_support::context_for;
  use std::time::Duration;
  use tempfile::TempDir;
  use wiremock::matchers::method;
  use wiremock::{Mock, MockServer, ResponseTemplate};

  const BODY: &str = r#"{
    "retCode": 0,
    "retMsg": "success",
    "result": {
      "rows": [
        {
          "name": "MANTA",
          "coin": "MANTA",
          "chains": [
            {"chain": "MANTA", "chainDeposit": "1", "chainWithdraw": "0",
             "withdrawMin": "2", "withdrawFee": "0.5"},
            {"chain": "ETH", "chainDeposit": "1", "chainWithdraw": "1",
             "withdrawMin": "4.5", "withdrawFee": ""}
          ]
        },
        {"name": "", "coin": "USDC", "chains": []}
      ]
    }
  }"#;

  #[test]
  fn test_parse_rows() {
    let tokens = parse(BODY).unwrap();
    assert_eq!(tokens.len(), 2);

    let manta = &tokens[0];
    assert_eq!(manta.exchanges[0].name, "Bybit");
    let chains = &manta.exchanges[0].chains;
    assert_eq!(chains.len(), 2);
    assert_eq!(chains[0].deposit_status, ChainStatus::Open);
    assert_eq!(chains[0].withdraw_status, ChainStatus::Closed);
    assert_eq!(chains[0].contract_address, "");
    assert_eq!(chains[1].withdraw_status, ChainStatus::Open);
    assert_eq!(chains[1].withdraw_fee, "");

    assert_eq!(tokens[1].name, "USDC");
    assert_eq!(tokens[1].exchanges.len(), 1);
  }

  #[test]
  fn test_parse_rejects_non_zero_ret_code() {
    let result = parse(r#"{"retCode": 10003, "retMsg": "API key is invalid.", "result": {}}"#);
    assert!(matches!(result, Err(CollectorError::ApiError { ref code, .. }) if code == "10003"));

    assert!(matches!(parse(r#"{"retCode": 0, "result": {}}"#), Err(CollectorError::InvalidResponse { .. })));
  }

  #[tokio::test]
  async fn test_fetch_fails_closed_on_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(200).set_body_string(BODY).set_delay(Duration::from_secs(2)))
      .mount(&server)
      .await;

    let dir = TempDir::new().unwrap();
    let adapter = BybitAdapter::new(context_for(&server, dir.path()));
    assert!(matches!(
      adapter.fetch_tokens().await,
      Err(CollectorError::Client(dw_core::Error::Timeout(_)))
    ));
  }
}
