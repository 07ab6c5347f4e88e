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

//! OKX currency listing adapter.

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

const SUCCESS_CODE: &str = "0";

/// OKX adapter. The listing has one item per (currency, chain).
pub struct OkxAdapter {
  ctx: AdapterContext,
}

#[derive(Debug, Deserialize)]
struct OkxEnvelope {
  #[serde(default, deserialize_with = "text")]
  code: String,
  #[serde(default, deserialize_with = "text")]
  msg: String,
  data: Option<Vec<OkxCurrency>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OkxCurrency {
  #[serde(default, deserialize_with = "text")]
  ccy: String,
  #[serde(default, deserialize_with = "text")]
  name: String,
  #[serde(default, deserialize_with = "text")]
  chain: String,
  can_dep: Option<Value>,
  can_wd: Option<Value>,
  #[serde(default, deserialize_with = "text")]
  ct_addr: String,
  #[serde(default, deserialize_with = "text")]
  min_wd: String,
  #[serde(default, deserialize_with = "text")]
  min_fee: String,
}

impl OkxAdapter {
  pub fn new(ctx: AdapterContext) -> Self {
    Self { ctx }
  }
}

#[async_trait]
impl ExchangeAdapter for OkxAdapter {
  fn exchange(&self) -> ExchangeId {
    ExchangeId::Okx
  }

  async fn fetch_tokens(&self) -> CollectorResult<Vec<TokenRecord>> {
    let body = self.ctx.fetch_listing(ExchangeId::Okx).await?;
    let tokens = parse(&body)?;
    info!("Successfully processed {} tokens from OKX", tokens.len());
    Ok(tokens)
  }
}

/// Map an OKX `/api/v5/asset/currencies` body.
///
/// All chains of a currency are grouped under one `OKX` entry. Chain names
/// keep only the text before the first `-` ("USDT-ERC20" becomes "USDT").
pub fn parse(body: &str) -> CollectorResult<Vec<TokenRecord>> {
  let envelope: OkxEnvelope = serde_json::from_str(body)?;
  if envelope.code != SUCCESS_CODE {
    return Err(CollectorError::ApiError {
      exchange: ExchangeId::Okx,
      code: envelope.code,
      message: envelope.msg,
    });
  }
  let items = envelope.data.ok_or_else(|| CollectorError::invalid(ExchangeId::Okx, "missing data"))?;
  debug!("OKX returned {} currency chains", items.len());

  let name = ExchangeId::Okx.display_name();
  let mut tokens = TokenSet::new();
  for item in items {
    let chain = item.chain.split('-').next().unwrap_or_default().to_string();
    let entry = ChainEntry {
      chain,
      deposit_status: ChainStatus::from_enabled(item.can_dep.as_ref()),
      withdraw_status: ChainStatus::from_enabled(item.can_wd.as_ref()),
      contract_address: item.ct_addr,
      min_withdraw: item.min_wd,
      withdraw_fee: item.min_fee,
    };
    tokens.push_chain(&item.ccy, &item.name, name, entry);
  }

  Ok(tokens.into_vec())
}
