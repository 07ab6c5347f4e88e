//! HTTP transport for signed exchange requests

use crate::signing::{encode_query, SignInput, SignedRequest, Signer};
use dw_core::{Config, Error, ExchangeId, HttpMethod, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Status and body of an exchange reply, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Shared client issuing signed requests to every supported exchange
pub struct ExchangeClient {
    client: Client,
    signer: Signer,
    base_urls: HashMap<ExchangeId, String>,
    timeout: Duration,
}

impl ExchangeClient {
    /// Create a client from process configuration
    pub fn new(config: &Config) -> Result<Self> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("dw-client/0.1.0")
            .build()
            .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;

        let base_urls = ExchangeId::ALL
            .iter()
            .map(|id| (*id, config.base_url(*id).to_string()))
            .collect();

        Ok(Self {
            client,
            signer: Signer::new(config.credentials.clone()),
            base_urls,
            timeout,
        })
    }

    /// Sign and send a request, returning the reply whatever its status.
    ///
    /// Only transport failures are errors: a timeout becomes
    /// [`Error::Timeout`], anything else (DNS, refused connection, unreadable
    /// body) becomes [`Error::Http`].
    #[instrument(skip(self, exchange, params), fields(exchange = %exchange))]
    pub async fn send(
        &self,
        exchange: ExchangeId,
        method: HttpMethod,
        path: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<RawResponse> {
        let signed = self.signer.sign(exchange, &SignInput { method, path, params })?;
        let url = self.build_url(exchange, path, &signed);
        debug!("{} {}", method, url);

        let mut request = match method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
        };
        request = request.headers(to_header_map(&signed.headers)?);
        if let Some(body) = signed.body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| self.transport_error(exchange, e))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.transport_error(exchange, e))?;

        if !(200..300).contains(&status) {
            warn!("{} responded with status {}", exchange, status);
        }
        debug!("Response body length: {} bytes", body.len());

        Ok(RawResponse { status, body })
    }

    /// GET the exchange's currency/network listing.
    pub async fn fetch_currencies(&self, exchange: ExchangeId) -> Result<RawResponse> {
        self.send(exchange, HttpMethod::Get, exchange.currencies_path(), &BTreeMap::new()).await
    }

    fn build_url(&self, exchange: ExchangeId, path: &str, signed: &SignedRequest) -> String {
        let base = self.base_url(exchange);
        let in_query = signed.body.is_none() && !signed.params.is_empty();
        if in_query {
            let query = encode_query(signed.params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
            format!("{}{}?{}", base, path, query)
        } else {
            format!("{}{}", base, path)
        }
    }

    fn transport_error(&self, exchange: ExchangeId, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout(format!("{} after {}ms", exchange, self.timeout.as_millis()))
        } else {
            Error::Http(format!("{} request failed: {}", exchange, e))
        }
    }

    /// REST host an exchange's requests go to
    pub fn base_url(&self, exchange: ExchangeId) -> &str {
        self.base_urls
            .get(&exchange)
            .map(String::as_str)
            .unwrap_or_else(|| exchange.default_base_url())
    }

    /// Get request timeout duration
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn to_header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::Http(format!("Invalid header name {}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| Error::Http(format!("Invalid header value for {}: {}", name, e)))?;
        map.insert(name, value);
    }
    Ok(map)
}
