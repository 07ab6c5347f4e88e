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

//! Bitget public coin list adapter.

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

const SUCCESS_CODE: &str = "00000";

/// Bitget adapter. The listing has one item per coin with a chain list.
pub struct BitgetAdapter {
  ctx: AdapterContext,
}

#[derive(Debug, Deserialize)]
struct BitgetEnvelope {
  #[serde(default, deserialize_with = "text")]
  code: String,
  #[serde(default, deserialize_with = "text")]
  msg: String,
  data: Option<Vec<BitgetCoin>>,
}

#[derive(Debug, Deserialize)]
struct BitgetCoin {
  #[serde(default, deserialize_with = "text")]
  coin: String,
  #[serde(default)]
  chains: Option<Vec<BitgetChain>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BitgetChain {
  #[serde(default, deserialize_with = "text")]
  chain: String,
  rechargeable: Option<Value>,
  withdrawable: Option<Value>,
  #[serde(default, deserialize_with = "text")]
  contract_address: String,
  #[serde(default, deserialize_with = "text")]
  min_withdraw_amount: String,
  #[serde(default, deserialize_with = "text")]
  withdraw_fee: String,
}

impl BitgetAdapter {
  pub fn new(ctx: AdapterContext) -> Self {
    Self { ctx }
  }
}

#[async_trait]
impl ExchangeAdapter for BitgetAdapter {
  fn exchange(&self) -> ExchangeId {
    ExchangeId::Bitget
  }

  async fn fetch_tokens(&self) -> CollectorResult<Vec<TokenRecord>> {
    let body = self.ctx.fetch_listing(ExchangeId::Bitget).await?;
    let tokens = parse(&body)?;
    info!("Successfully processed {} tokens from Bitget", tokens.len());
    Ok(tokens)
  }
}

/// Map a Bitget `/api/v2/spot/public/coins` body.
///
/// Bitget publishes no display names, so the name is always the symbol. Each
/// coin item becomes its own `Bitget` entry.
pub fn parse(body: &str) -> CollectorResult<Vec<TokenRecord>> {
  let envelope: BitgetEnvelope = serde_json::from_str(body)?;
  if envelope.code != SUCCESS_CODE {
    return Err(CollectorError::ApiError {
      exchange: ExchangeId::Bitget,
      code: envelope.code,
      message: envelope.msg,
    });
  }
  let coins = envelope.data.ok_or_else(|| CollectorError::invalid(ExchangeId::Bitget, "missing data"))?;
  debug!("Bitget returned {} coins", coins.len());

  let name = ExchangeId::Bitget.display_name();
  let mut tokens = TokenSet::new();
  for coin in coins {
    let mut entry = ExchangeEntry::new(name);
    for chain in coin.chains.unwrap_or_default() {
      entry.chains.push(ChainEntry {
        chain: chain.chain,
        deposit_status: ChainStatus::from_enabled(chain.rechargeable.as_ref()),
        withdraw_status: ChainStatus::from_enabled(chain.withdrawable.as_ref()),
        contract_address: chain.contract_address,
        min_withdraw: chain.min_withdraw_amount,
        withdraw_fee: chain.withdraw_fee,
      });
    }
    tokens.push_exchange(&coin.coin, &coin.coin, entry);
  }

  Ok(tokens.into_vec())
}
