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

//! Binance coin configuration adapter.

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

/// Binance adapter. The listing has one item per coin with a network list.
pub struct BinanceAdapter {
  ctx: AdapterContext,
}

/// Binance answers errors with an object instead of the usual array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BinanceReply {
  Coins(Vec<BinanceCoin>),
  Error {
    #[serde(default, deserialize_with = "text")]
    code: String,
    #[serde(default, deserialize_with = "text")]
    msg: String,
  },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BinanceCoin {
  #[serde(default, deserialize_with = "text")]
  coin: String,
  #[serde(default, deserialize_with = "text")]
  name: String,
  #[serde(default)]
  network_list: Option<Vec<BinanceNetwork>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BinanceNetwork {
  #[serde(default, deserialize_with = "text")]
  network: String,
  deposit_enable: Option<Value>,
  withdraw_enable: Option<Value>,
  #[serde(default, deserialize_with = "text")]
  contract_address: String,
  #[serde(default, deserialize_with = "text")]
  min_withdraw_amount: String,
  #[serde(default, deserialize_with = "text")]
  withdraw_min: String,
  #[serde(default, deserialize_with = "text")]
  withdraw_fee: String,
}

impl BinanceAdapter {
  pub fn new(ctx: AdapterContext) -> Self {
    Self { ctx }
  }
}

#[async_trait]
impl ExchangeAdapter for BinanceAdapter {
  fn exchange(&self) -> ExchangeId {
    ExchangeId::Binance
  }

  async fn fetch_tokens(&self) -> CollectorResult<Vec<TokenRecord>> {
    let body = self.ctx.fetch_listing(ExchangeId::Binance).await?;
    let tokens = parse(&body)?;
    info!("Successfully processed {} tokens from Binance", tokens.len());
    Ok(tokens)
  }
}

/// Map a Binance `/sapi/v1/capital/config/getall` body.
///
/// Each coin item becomes its own `Binance` entry, even when a symbol repeats.
pub fn parse(body: &str) -> CollectorResult<Vec<TokenRecord>> {
  let coins = match serde_json::from_str::<BinanceReply>(body)? {
    BinanceReply::Coins(coins) => coins,
    BinanceReply::Error { code, msg } => {
      return Err(CollectorError::ApiError { exchange: ExchangeId::Binance, code, message: msg });
    }
  };
  debug!("Binance returned {} coins", coins.len());

  let name = ExchangeId::Binance.display_name();
  let mut tokens = TokenSet::new();
  for coin in coins {
    let mut entry = ExchangeEntry::new(name);
    for network in coin.network_list.unwrap_or_default() {
      let min_withdraw = if network.min_withdraw_amount.is_empty() {
        network.withdraw_min
      } else {
        network.min_withdraw_amount
      };
      entry.chains.push(ChainEntry {
        chain: network.network,
        deposit_status: ChainStatus::from_enabled(network.deposit_enable.as_ref()),
        withdraw_status: ChainStatus::from_enabled(network.withdraw_enable.as_ref()),
        contract_address: network.contract_address,
        min_withdraw,
        withdraw_fee: network.withdraw_fee,
      });
    }
    tokens.push_exchange(&coin.coin, &coin.name, entry);
  }

  Ok(tokens.into_vec())
}
