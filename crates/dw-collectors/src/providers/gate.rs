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

//! Gate.io spot currency adapter.

use crate::error::{CollectorError, CollectorResult};
use crate::providers::AdapterContext;
use crate::traits::ExchangeAdapter;
use async_trait::async_trait;
use dw_core::ExchangeId;
use dw_models::de::text;
use dw_models::{ChainEntry, ChainStatus, TokenRecord, TokenSet};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

/// Gate.io adapter. The listing has one item per (currency, chain).
pub struct GateAdapter {
  ctx: AdapterContext,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GateReply {
  Currencies(Vec<GateCurrency>),
  Error {
    #[serde(default, deserialize_with = "text")]
    label: String,
    #[serde(default, deserialize_with = "text")]
    message: String,
  },
}

#[derive(Debug, Deserialize)]
struct GateCurrency {
  #[serde(default, deserialize_with = "text")]
  currency: String,
  #[serde(default, deserialize_with = "text")]
  name: String,
  #[serde(default, deserialize_with = "text")]
  chain: String,
  deposit_disabled: Option<Value>,
  withdraw_disabled: Option<Value>,
  #[serde(default, deserialize_with = "text")]
  min_withdraw_amount: String,
  #[serde(default, deserialize_with = "text")]
  withdraw_fee: String,
}

impl GateAdapter {
  pub fn new(ctx: AdapterContext) -> Self {
    Self { ctx }
  }
}

#[async_trait]
impl ExchangeAdapter for GateAdapter {
  fn exchange(&self) -> ExchangeId {
    ExchangeId::Gate
  }

  async fn fetch_tokens(&self) -> CollectorResult<Vec<TokenRecord>> {
    let body = self.ctx.fetch_listing(ExchangeId::Gate).await?;
    let tokens = parse(&body)?;
    info!("Successfully processed {} tokens from Gate.io", tokens.len());
    Ok(tokens)
  }
}

/// Map a Gate.io `/api/v4/spot/currencies` body.
///
/// All chains of a currency are grouped under one `Gate.io` entry. The flags
/// are "disabled" flags, so only an explicit false opens a direction.
pub fn parse(body: &str) -> CollectorResult<Vec<TokenRecord>> {
  let items = match serde_json::from_str::<GateReply>(body)? {
    GateReply::Currencies(items) => items,
    GateReply::Error { label, message } => {
      return Err(CollectorError::ApiError { exchange: ExchangeId::Gate, code: label, message });
    }
  };
  debug!("Gate.io returned {} currency chains", items.len());

  let name = ExchangeId::Gate.display_name();
  let mut tokens = TokenSet::new();
  for item in items {
    let entry = ChainEntry {
      chain: item.chain,
      deposit_status: ChainStatus::from_disabled(item.deposit_disabled.as_ref()),
      withdraw_status: ChainStatus::from_disabled(item.withdraw_disabled.as_ref()),
      contract_address: String::new(),
      min_withdraw: item.min_withdraw_amount,
      withdraw_fee: item.withdraw_fee,
    };
    tokens.push_chain(&item.currency, &item.name, name, entry);
  }

  Ok(tokens.into_vec())
}
