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

//! # dw-collectors
//!
//! Deposit/withdrawal status collection across exchanges.
//!
//! This crate provides:
//! - one adapter per exchange (OKX, Binance, Bybit, Gate.io, Bitget) that maps
//!   the exchange's currency listing to token records and fails closed
//! - a merge engine that runs every adapter concurrently and combines their
//!   output in a fixed priority order
//! - an orchestrator that persists good snapshots and falls back to the last
//!   good one when a cycle fails
//! - a periodic trigger sharing the orchestrator's cycle lock
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dw_collectors::Orchestrator;
//! use dw_core::Config;
//!
//! let config = Config::from_env()?;
//! let orchestrator = Orchestrator::from_config(&config)?;
//!
//! let report = orchestrator.run_cycle().await?;
//! println!("{} tokens ({:?})", report.snapshot.tokens.len(), report.outcome);
//! ```

pub mod error;
pub mod merge;
pub mod orchestrator;
pub mod providers;
pub mod schedule;
pub mod store;
pub mod traits;

// Re-export main types for convenience
pub use error::{CollectorError, CollectorResult};
pub use merge::{merge, AdapterOutput, MergeEngine};
pub use orchestrator::{CycleOutcome, CycleReport, Orchestrator, NO_DATA_ERROR};
pub use providers::{all_adapters, AdapterContext};
pub use schedule::run_scheduled;
pub use store::{JsonFileStore, MemoryStore, SnapshotStore};
pub use traits::ExchangeAdapter;

// Re-export providers
pub use providers::{BinanceAdapter, BitgetAdapter, BybitAdapter, GateAdapter, OkxAdapter};
