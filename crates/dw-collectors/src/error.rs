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

//! Error types for collection, merging and persistence.

use dw_core::ExchangeId;
use dw_models::Snapshot;
use thiserror::Error;

/// Errors that can occur while collecting and persisting exchange data.
#[derive(Error, Debug)]
pub enum CollectorError {
  #[error("Client error: {0}")]
  Client(#[from] dw_core::Error),

  #[error("JSON parsing failed: {0}")]
  JsonParseFailed(#[from] serde_json::Error),

  #[error("{exchange} responded with HTTP {status}")]
  HttpStatus { exchange: ExchangeId, status: u16 },

  #[error("{exchange} API error {code}: {message}")]
  ApiError { exchange: ExchangeId, code: String, message: String },

  #[error("Invalid response format from {api_source}: {message}")]
  InvalidResponse { api_source: String, message: String },

  #[error("Collection task failed: {0}")]
  TaskFailed(String),

  #[error("Snapshot store error: {0}")]
  Store(String),

  #[error("Collection already in progress")]
  CycleInProgress,

  /// The cycle produced a snapshot but it could not be written.
  #[error("Failed to persist snapshot: {reason}")]
  PersistFailed { reason: String, snapshot: Box<Snapshot> },
}

impl CollectorError {
  /// Shorthand for a malformed payload from `exchange`.
  pub fn invalid(exchange: ExchangeId, message: impl Into<String>) -> Self {
    CollectorError::InvalidResponse { api_source: exchange.to_string(), message: message.into() }
  }
}

/// Result type for collector operations.
pub type CollectorResult<T> = Result<T, CollectorError>;
