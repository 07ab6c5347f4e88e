//! Per-exchange request signing.
//!
//! Each exchange authenticates with its own HMAC recipe. The recipes are plain
//! functions of `(credentials, request, instant)`; a [`Signer`] resolves the
//! recipe for every exchange once at construction and looks it up per call.
//!
//! | Exchange | Timestamp     | Signed message                                       | MAC         | Encoding |
//! |----------|---------------|------------------------------------------------------|-------------|----------|
//! | OKX      | ISO-8601 (ms) | `ts + method + path [+ "?" + query]`                 | HMAC-SHA256 | base64   |
//! | Binance  | epoch ms      | `query` (params + `timestamp`)                       | HMAC-SHA256 | hex      |
//! | Bybit    | epoch ms      | `ts + key + recvWindow + sorted k=v&...`             | HMAC-SHA256 | hex      |
//! | Gate.io  | epoch s       | `method\npath\nquery\nbody\nts`                      | HMAC-SHA512 | hex      |
//! | Bitget   | epoch ms      | `ts + method + path + body`                          | HMAC-SHA256 | base64   |

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, SecondsFormat, Utc};
use dw_core::{Credentials, Error, ExchangeCredentials, ExchangeId, HttpMethod, Result, BYBIT_RECV_WINDOW};
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha512};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

type HmacSha256 = Hmac<Sha256>;
type HmacSha512 = Hmac<Sha512>;

/// Raw request description handed to the signer.
#[derive(Debug, Clone, Copy)]
pub struct SignInput<'a> {
    pub method: HttpMethod,
    pub path: &'a str,
    pub params: &'a BTreeMap<String, String>,
}

/// Authentication material for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// Headers to attach, including auth headers
    pub headers: BTreeMap<String, String>,
    /// Parameters in wire order, possibly with injected timestamp/signature
    pub params: Vec<(String, String)>,
    /// JSON body for non-GET requests, byte-identical to what was signed
    pub body: Option<String>,
}

type SignFn = fn(&ExchangeCredentials, &SignInput<'_>, DateTime<Utc>) -> Result<SignedRequest>;

/// Signing strategy for an exchange.
fn strategy(exchange: ExchangeId) -> SignFn {
    match exchange {
        ExchangeId::Okx => sign_okx,
        ExchangeId::Binance => sign_binance,
        ExchangeId::Bybit => sign_bybit,
        ExchangeId::Gate => sign_gate,
        ExchangeId::Bitget => sign_bitget,
    }
}

/// Produces authenticated request descriptors from the process credentials.
#[derive(Clone)]
pub struct Signer {
    credentials: Credentials,
    strategies: HashMap<ExchangeId, SignFn>,
}

impl Signer {
    pub fn new(credentials: Credentials) -> Self {
        let strategies = ExchangeId::ALL.iter().map(|id| (*id, strategy(*id))).collect();
        Self { credentials, strategies }
    }

    /// Sign with the current wall-clock time.
    pub fn sign(&self, exchange: ExchangeId, input: &SignInput<'_>) -> Result<SignedRequest> {
        self.sign_at(exchange, input, Utc::now())
    }

    /// Sign with an explicit instant. Identical inputs give identical output.
    pub fn sign_at(
        &self,
        exchange: ExchangeId,
        input: &SignInput<'_>,
        now: DateTime<Utc>,
    ) -> Result<SignedRequest> {
        let credentials = self.credentials.for_exchange(exchange);
        if !credentials.is_complete(exchange) {
            warn!("{} API credentials not found, using public endpoint", exchange);
        }

        let sign_fn = self
            .strategies
            .get(&exchange)
            .ok_or_else(|| Error::Signing(format!("no signing strategy for {}", exchange)))?;

        debug!("Signing {} {} for {}", input.method, input.path, exchange);
        sign_fn(credentials, input, now)
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer").field("credentials", &self.credentials).finish()
    }
}

fn sign_okx(
    creds: &ExchangeCredentials,
    input: &SignInput<'_>,
    now: DateTime<Utc>,
) -> Result<SignedRequest> {
    let timestamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);

    let mut message = format!("{}{}{}", timestamp, input.method, input.path);
    if input.method == HttpMethod::Get && !input.params.is_empty() {
        message.push('?');
        message.push_str(&encode_query(pairs(input.params)));
    }
    let signature = BASE64.encode(hmac_sha256(&creds.secret, &message)?);

    let mut headers = BTreeMap::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    headers.insert("OK-ACCESS-KEY".to_string(), creds.api_key.clone());
    headers.insert("OK-ACCESS-SIGN".to_string(), signature);
    headers.insert("OK-ACCESS-TIMESTAMP".to_string(), timestamp);
    headers.insert("OK-ACCESS-PASSPHRASE".to_string(), creds.passphrase.clone());
    if let Some(project) = &creds.project {
        headers.insert("OK-ACCESS-PROJECT".to_string(), project.clone());
    }

    Ok(SignedRequest { headers, params: owned_pairs(input.params), body: json_body(input)? })
}

fn sign_binance(
    creds: &ExchangeCredentials,
    input: &SignInput<'_>,
    now: DateTime<Utc>,
) -> Result<SignedRequest> {
    let mut params = owned_pairs(input.params);
    params.push(("timestamp".to_string(), now.timestamp_millis().to_string()));

    let query = encode_query(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    let signature = hex::encode(hmac_sha256(&creds.secret, &query)?);
    params.push(("signature".to_string(), signature));

    let mut headers = BTreeMap::new();
    headers.insert("X-MBX-APIKEY".to_string(), creds.api_key.clone());

    let body = match input.method {
        HttpMethod::Get => None,
        _ => Some(serde_json::to_string(&params.iter().cloned().collect::<BTreeMap<_, _>>())?),
    };

    Ok(SignedRequest { headers, params, body })
}

fn sign_bybit(
    creds: &ExchangeCredentials,
    input: &SignInput<'_>,
    now: DateTime<Utc>,
) -> Result<SignedRequest> {
    let timestamp = now.timestamp_millis().to_string();

    // BTreeMap iteration is already key-sorted
    let param_str = input
        .params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let message = format!("{}{}{}{}", timestamp, creds.api_key, BYBIT_RECV_WINDOW, param_str);
    let signature = hex::encode(hmac_sha256(&creds.secret, &message)?);

    let mut headers = BTreeMap::new();
    headers.insert("X-BAPI-API-KEY".to_string(), creds.api_key.clone());
    headers.insert("X-BAPI-SIGN".to_string(), signature);
    headers.insert("X-BAPI-TIMESTAMP".to_string(), timestamp);
    headers.insert("X-BAPI-RECV-WINDOW".to_string(), BYBIT_RECV_WINDOW.to_string());
    headers.insert("Content-Type".to_string(), "application/json".to_string());

    Ok(SignedRequest { headers, params: owned_pairs(input.params), body: json_body(input)? })
}

fn sign_gate(
    creds: &ExchangeCredentials,
    input: &SignInput<'_>,
    now: DateTime<Utc>,
) -> Result<SignedRequest> {
    let timestamp = now.timestamp().to_string();

    let query = match input.method {
        HttpMethod::Get => encode_query(pairs(input.params)),
        _ => String::new(),
    };
    let body = json_body(input)?;

    let message = format!(
        "{}\n{}\n{}\n{}\n{}",
        input.method,
        input.path,
        query,
        body.as_deref().unwrap_or(""),
        timestamp
    );
    let signature = hex::encode(hmac_sha512(&creds.secret, &message)?);

    let mut headers = BTreeMap::new();
    headers.insert("Accept".to_string(), "application/json".to_string());
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    headers.insert("KEY".to_string(), creds.api_key.clone());
    headers.insert("SIGN".to_string(), signature);
    headers.insert("Timestamp".to_string(), timestamp);

    Ok(SignedRequest { headers, params: owned_pairs(input.params), body })
}

fn sign_bitget(
    creds: &ExchangeCredentials,
    input: &SignInput<'_>,
    now: DateTime<Utc>,
) -> Result<SignedRequest> {
    let timestamp = now.timestamp_millis().to_string();

    // Bitget signs the JSON form of the params whatever the method.
    let signed_body = if input.params.is_empty() {
        String::new()
    } else {
        serde_json::to_string(input.params)?
    };

    let message = format!("{}{}{}{}", timestamp, input.method, input.path, signed_body);
    let signature = BASE64.encode(hmac_sha256(&creds.secret, &message)?);

    let mut headers = BTreeMap::new();
    headers.insert("ACCESS-KEY".to_string(), creds.api_key.clone());
    headers.insert("ACCESS-SIGN".to_string(), signature);
    headers.insert("ACCESS-TIMESTAMP".to_string(), timestamp);
    headers.insert("ACCESS-PASSPHRASE".to_string(), creds.passphrase.clone());
    headers.insert("Content-Type".to_string(), "application/json".to_string());

    Ok(SignedRequest { headers, params: owned_pairs(input.params), body: json_body(input)? })
}

/// JSON body sent with non-GET requests that carry params.
fn json_body(input: &SignInput<'_>) -> Result<Option<String>> {
    if input.method == HttpMethod::Get || input.params.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::to_string(input.params)?))
}

fn pairs(params: &BTreeMap<String, String>) -> impl Iterator<Item = (&str, &str)> {
    params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
}

fn owned_pairs(params: &BTreeMap<String, String>) -> Vec<(String, String)> {
    params.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}

/// `application/x-www-form-urlencoded` query string.
pub fn encode_query<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    url::form_urlencoded::Serializer::new(String::new()).extend_pairs(pairs).finish()
}

fn hmac_sha256(secret: &str, message: &str) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| Error::Signing(format!("HMAC init failed: {}", e)))?;
    mac.update(message.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

fn hmac_sha512(secret: &str, message: &str) -> Result<Vec<u8>> {
    let mut mac = HmacSha512::new_from_slice(secret.as_bytes())
        .map_err(|e| Error::Signing(format!("HMAC init failed: {}", e)))?;
    mac.update(message.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn instant() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_740_830_700_123).unwrap()
    }

    fn credentials() -> Credentials {
        Credentials {
            okx: ExchangeCredentials::new("okx-key", "okx-secret").with_passphrase("okx-pass"),
            binance: ExchangeCredentials::new("binance-key", "binance-secret"),
            bybit: ExchangeCredentials::new("bybit-key", "bybit-secret"),
            gate: ExchangeCredentials::new("gate-key", "gate-secret"),
            bitget: ExchangeCredentials::new("bitget-key", "bitget-secret")
                .with_passphrase("bitget-pass"),
        }
    }

    fn get(path: &str, params: &BTreeMap<String, String>) -> SignedRequest {
        let exchange = ExchangeId::ALL
            .into_iter()
            .find(|id| id.currencies_path() == path)
            .unwrap();
        Signer::new(credentials())
            .sign_at(exchange, &SignInput { method: HttpMethod::Get, path, params }, instant())
            .unwrap()
    }

    #[test]
    fn test_okx_signature() {
        let signed = get("/api/v5/asset/currencies", &BTreeMap::new());
        assert_eq!(signed.headers["OK-ACCESS-TIMESTAMP"], "2025-03-01T12:05:00.123Z");
        assert_eq!(signed.headers["OK-ACCESS-SIGN"], "ew8FPw8I+X9Yqto+MmtNBvPCdKQ6dv/F/pufIsR9rWI=");
        assert_eq!(signed.headers["OK-ACCESS-KEY"], "okx-key");
        assert_eq!(signed.headers["OK-ACCESS-PASSPHRASE"], "okx-pass");
        assert!(!signed.headers.contains_key("OK-ACCESS-PROJECT"));
        assert!(signed.params.is_empty());
        assert!(signed.body.is_none());
    }

    #[test]
    fn test_okx_signs_query_string_for_get() {
        let params = BTreeMap::from([("ccy".to_string(), "BTC".to_string())]);
        let signed = get("/api/v5/asset/currencies", &params);
        assert_eq!(signed.headers["OK-ACCESS-SIGN"], "KG8yNQubTYo47bSMZ84lcJqdsEiWg1rf4TwGjcxozwg=");
        assert_eq!(signed.params, vec![("ccy".to_string(), "BTC".to_string())]);
    }

    #[test]
    fn test_okx_project_header() {
        let mut creds = credentials();
        creds.okx = creds.okx.with_project("project-7");
        let params = BTreeMap::new();
        let input = SignInput { method: HttpMethod::Get, path: "/api/v5/asset/currencies", params: &params };
        let signed = Signer::new(creds).sign_at(ExchangeId::Okx, &input, instant()).unwrap();
        assert_eq!(signed.headers["OK-ACCESS-PROJECT"], "project-7");
    }

    #[test]
    fn test_binance_signature_is_a_param() {
        let signed = get("/sapi/v1/capital/config/getall", &BTreeMap::new());
        assert_eq!(
            signed.params,
            vec![
                ("timestamp".to_string(), "1740830700123".to_string()),
                (
                    "signature".to_string(),
                    "d453af0248baf7034e685d22d32c63aa059e7ebced1724a1b9eb3fff6aeac461".to_string()
                ),
            ]
        );
        assert_eq!(signed.headers.len(), 1);
        assert_eq!(signed.headers["X-MBX-APIKEY"], "binance-key");
    }

    #[test]
    fn test_bybit_signature() {
        let params = BTreeMap::from([("coin".to_string(), "USDT".to_string())]);
        let signed = get("/v5/asset/coin/query-info", &params);
        assert_eq!(
            signed.headers["X-BAPI-SIGN"],
            "b3634fb8554aa82bd2b3b71f5927897334f7b24d00f9f033a5b585028a04c591"
        );
        assert_eq!(signed.headers["X-BAPI-TIMESTAMP"], "1740830700123");
        assert_eq!(signed.headers["X-BAPI-RECV-WINDOW"], "5000");
    }

    #[test]
    fn test_gate_signature_uses_sha512_and_seconds() {
        let signed = get("/api/v4/spot/currencies", &BTreeMap::new());
        assert_eq!(signed.headers["Timestamp"], "1740830700");
        assert_eq!(
            signed.headers["SIGN"],
            "2543244e351593172276145e4257ec8d7b5540a0a0b5487153444c28b5807328\
             d83eb99e5b8510e16056c20e4505a7e43aad9f04d8a3fd691028c43d9cfde6eb"
        );
        assert_eq!(signed.headers["SIGN"].len(), 128);
    }

    #[test]
    fn test_bitget_signature() {
        let signed = get("/api/v2/spot/public/coins", &BTreeMap::new());
        assert_eq!(signed.headers["ACCESS-SIGN"], "SHkLJt+Qi+GJob5DoA/VOwn4akH6Z1NzHvyyfB5wDL8=");
        assert_eq!(signed.headers["ACCESS-PASSPHRASE"], "bitget-pass");
    }

    #[test]
    fn test_missing_credentials_still_sign() {
        let params = BTreeMap::new();
        let input = SignInput { method: HttpMethod::Get, path: "/api/v2/spot/public/coins", params: &params };
        let signed = Signer::new(Credentials::default())
            .sign_at(ExchangeId::Bitget, &input, instant())
            .unwrap();
        assert_eq!(signed.headers["ACCESS-SIGN"], "q32pRoHXHPP8zH5s2WQh7KPc05soO+WWxkKviveJYFQ=");
        assert_eq!(signed.headers["ACCESS-KEY"], "");
    }

    #[test]
    fn test_signing_is_deterministic() {
        let signer = Signer::new(credentials());
        let params = BTreeMap::from([
            ("b".to_string(), "2".to_string()),
            ("a".to_string(), "1 and more".to_string()),
        ]);
        for exchange in ExchangeId::ALL {
            for method in [HttpMethod::Get, HttpMethod::Post] {
                let input = SignInput { method, path: "/some/path", params: &params };
                let first = signer.sign_at(exchange, &input, instant()).unwrap();
                let second = signer.sign_at(exchange, &input, instant()).unwrap();
                assert_eq!(first, second, "{} {} not deterministic", exchange, method);
            }
        }
    }

    #[test]
    fn test_post_bodies() {
        let signer = Signer::new(credentials());
        let params = BTreeMap::from([("coin".to_string(), "ETH".to_string())]);
        let input = SignInput { method: HttpMethod::Post, path: "/x", params: &params };

        let gate = signer.sign_at(ExchangeId::Gate, &input, instant()).unwrap();
        assert_eq!(gate.body.as_deref(), Some(r#"{"coin":"ETH"}"#));

        let binance = signer.sign_at(ExchangeId::Binance, &input, instant()).unwrap();
        let body: serde_json::Value = serde_json::from_str(binance.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["timestamp"], "1740830700123");
        assert!(body.get("signature").is_some());
    }

    #[test]
    fn test_encode_query() {
        let query = encode_query([("a", "1 2"), ("b", "x&y")].into_iter());
        assert_eq!(query, "a=1+2&b=x%26y");
    }
}
