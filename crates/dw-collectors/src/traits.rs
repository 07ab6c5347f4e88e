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

//! Traits for exchange adapters.

use async_trait::async_trait;
use dw_core::ExchangeId;
use dw_models::TokenRecord;
use tracing::error;

use crate::error::CollectorResult;

/// One exchange's currency/network listing, mapped to token records.
///
/// Implement this trait to add a new exchange.
#[async_trait]
pub trait ExchangeAdapter: Send + Sync {
  /// The exchange this adapter talks to.
  fn exchange(&self) -> ExchangeId;

  /// Fetch and map the listing, reporting any failure.
  async fn fetch_tokens(&self) -> CollectorResult<Vec<TokenRecord>>;

  /// Fetch and map the listing, failing closed.
  ///
  /// Any error is logged and becomes an empty sequence; nothing propagates
  /// past this boundary.
  async fn fetch(&self) -> Vec<TokenRecord> {
    match self.fetch_tokens().await {
      Ok(tokens) => tokens,
      Err(e) => {
        error!("Error fetching {} data: {}", self.exchange(), e);
        Vec::new()
      }
    }
  }
}
