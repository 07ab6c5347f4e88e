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

//! Exchange adapters.
//!
//! Every adapter follows the same pipeline: fetch the currency listing, hand
//! the raw body to the archive, check the HTTP status, then validate and map
//! the exchange's envelope. Mapping lives in a pure `parse` function per
//! exchange so it can be tested without a network.

pub mod binance;
pub mod bitget;
pub mod bybit;
pub mod gate;
pub mod okx;

pub use binance::BinanceAdapter;
pub use bitget::BitgetAdapter;
pub use bybit::BybitAdapter;
pub use gate::GateAdapter;
pub use okx::OkxAdapter;

use crate::error::{CollectorError, CollectorResult};
use crate::traits::ExchangeAdapter;
use dw_client::{ExchangeClient, RawArchive};
use dw_core::{Config, ExchangeId};
use std::sync::Arc;
use tracing::{debug, info};

/// Shared transport and archive handed to every adapter.
#[derive(Clone)]
pub struct AdapterContext {
  pub client: Arc<ExchangeClient>,
  pub archive: RawArchive,
}

impl AdapterContext {
  pub fn new(client: Arc<ExchangeClient>, archive: RawArchive) -> Self {
    Self { client, archive }
  }

  pub fn from_config(config: &Config) -> CollectorResult<Self> {
    Ok(Self::new(Arc::new(ExchangeClient::new(config)?), RawArchive::from_config(config)))
  }

  /// Fetch the listing body for `exchange`.
  ///
  /// The body is archived before the status is judged, so failed replies are
  /// captured too.
  pub async fn fetch_listing(&self, exchange: ExchangeId) -> CollectorResult<String> {
    info!("Fetching currencies from {}", exchange);

    let response = self.client.fetch_currencies(exchange).await?;
    self.archive.store(exchange, exchange.currencies_path(), &response.body);

    if !response.is_success() {
      return Err(CollectorError::HttpStatus { exchange, status: response.status });
    }

    debug!("{} returned {} bytes", exchange, response.body.len());
    Ok(response.body)
  }
}

/// One adapter per supported exchange, in merge priority order.
pub fn all_adapters(ctx: &AdapterContext) -> Vec<Arc<dyn ExchangeAdapter>> {
  ExchangeId::ALL.iter().map(|id| adapter_for(*id, ctx.clone())).collect()
}

pub fn adapter_for(exchange: ExchangeId, ctx: AdapterContext) -> Arc<dyn ExchangeAdapter> {
  match exchange {
    ExchangeId::Okx => Arc::new(OkxAdapter::new(ctx)),
    ExchangeId::Binance => Arc::new(BinanceAdapter::new(ctx)),
    ExchangeId::Bybit => Arc::new(BybitAdapter::new(ctx)),
    ExchangeId::Gate => Arc::new(GateAdapter::new(ctx)),
    ExchangeId::Bitget => Arc::new(BitgetAdapter::new(ctx)),
  }
}
