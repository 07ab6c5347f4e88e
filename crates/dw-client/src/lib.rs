//! # dw-client
//!
//! Signed REST access to the supported exchanges, with no knowledge of their
//! response schemas.
//!
//! ## Features
//!
//! - **Signing**: one HMAC recipe per exchange, resolved once per [`Signer`]
//! - **Transport**: a shared `reqwest` client that returns raw status and body
//! - **Archive**: detached, bounded writes of every raw body to disk
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dw_client::{ExchangeClient, RawArchive};
//! use dw_core::{Config, ExchangeId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let client = ExchangeClient::new(&config)?;
//!     let archive = RawArchive::from_config(&config);
//!
//!     let response = client.fetch_currencies(ExchangeId::Okx).await?;
//!     archive.store(ExchangeId::Okx, ExchangeId::Okx.currencies_path(), &response.body);
//!     println!("OKX replied {}", response.status);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod archive;
pub mod signing;
pub mod transport;

pub use archive::RawArchive;
pub use dw_core::{Config, Error, ExchangeId, HttpMethod, Result};
pub use signing::{SignInput, SignedRequest, Signer};
pub use transport::{ExchangeClient, RawResponse};
