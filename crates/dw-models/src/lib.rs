//! Canonical data model shared by the adapters, the merge engine and every
//! consumer of a collected snapshot.
//!
//! The JSON shape of [`Snapshot`] is the contract with the query layer:
//!
//! ```json
//! { "last_update": "...", "tokens": [{ "symbol": "BTC", "name": "Bitcoin",
//!   "exchanges": [{ "name": "OKX", "chains": [{ "chain": "BTC",
//!   "deposit_status": "open", "withdraw_status": "closed",
//!   "contract_address": "", "min_withdraw": "0.001", "withdraw_fee": "0.0002" }] }] }],
//!   "error": "optional" }
//! ```

#![warn(clippy::all)]

pub mod de;
pub mod snapshot;
pub mod status;
pub mod token;

pub use snapshot::{Snapshot, TokenStatus, TokenSummary};
pub use status::ChainStatus;
pub use token::{ChainEntry, ExchangeEntry, TokenRecord, TokenSet};
