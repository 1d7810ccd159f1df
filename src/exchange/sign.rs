//! Request signing for the Bybit v5 authenticated REST endpoints.
//!
//! Signing base is `{timestamp_ms}{api_key}{recv_window}{payload}` where the
//! payload is the URL-encoded parameter string, and the signature is the
//! lowercase hex HMAC-SHA256 of that base under the API secret. The same
//! encoding is used for a GET query string and a POST form body, so the
//! signed bytes always match the bytes on the wire.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::BTreeMap;
use thiserror::Error;
use url::form_urlencoded;

/// Exchange-defined tolerance (ms) for request timestamp skew.
const RECV_WINDOW: &str = "5000";

/// HTTP method of a signed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A fully derived authenticated request: final URL, headers, optional body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<String>,
}

/// Signing failure. In practice only key-material problems can occur; the
/// parameter encoding itself is deterministic by construction (sorted keys).
#[derive(Debug, Error)]
pub enum SignError {
    #[error("invalid API secret: {0}")]
    InvalidSecret(String),
}

/// API credentials, held opaquely. The Debug impl redacts the secret so the
/// credentials can never leak through logging.
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    api_secret: String,
}

impl Credentials {
    pub fn new(api_key: String, api_secret: String) -> Self {
        Self {
            api_key,
            api_secret,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"***")
            .finish()
    }
}

/// Derives signed requests from method, endpoint, and parameters.
#[derive(Debug, Clone)]
pub struct Signer {
    base_url: String,
    credentials: Credentials,
}

impl Signer {
    pub fn new(base_url: String, credentials: Credentials) -> Self {
        Self {
            base_url,
            credentials,
        }
    }

    /// Sign a request. Pure function of the inputs: the caller supplies the
    /// timestamp, so a fixed timestamp always yields the same digest.
    pub fn sign(
        &self,
        method: Method,
        endpoint: &str,
        params: &BTreeMap<String, String>,
        now_ms: i64,
    ) -> Result<SignedRequest, SignError> {
        let payload = encode_params(params);
        let timestamp = now_ms.to_string();

        let signing_base = format!(
            "{}{}{}{}",
            timestamp, self.credentials.api_key, RECV_WINDOW, payload
        );

        let mut mac = Hmac::<Sha256>::new_from_slice(self.credentials.api_secret.as_bytes())
            .map_err(|e| SignError::InvalidSecret(e.to_string()))?;
        mac.update(signing_base.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        let mut headers = vec![
            ("X-BAPI-API-KEY", self.credentials.api_key.clone()),
            ("X-BAPI-SIGN", signature),
            ("X-BAPI-TIMESTAMP", timestamp),
            ("X-BAPI-RECV-WINDOW", RECV_WINDOW.to_string()),
        ];

        let (url, body) = match method {
            Method::Get => {
                let url = if payload.is_empty() {
                    format!("{}{}", self.base_url, endpoint)
                } else {
                    format!("{}{}?{}", self.base_url, endpoint, payload)
                };
                (url, None)
            }
            Method::Post => {
                headers.push((
                    "Content-Type",
                    "application/x-www-form-urlencoded".to_string(),
                ));
                (format!("{}{}", self.base_url, endpoint), Some(payload))
            }
        };

        Ok(SignedRequest {
            method,
            url,
            headers,
            body,
        })
    }
}

/// URL-encode parameters in sorted-key order.
///
/// BTreeMap iteration order is the sort order of the keys, which makes the
/// encoding reproducible regardless of the order parameters were inserted.
fn encode_params(params: &BTreeMap<String, String>) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> Signer {
        Signer::new(
            "https://api.bybit.com".to_string(),
            Credentials::new("test-key".to_string(), "test-secret".to_string()),
        )
    }

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn signature_of(request: &SignedRequest) -> String {
        request
            .headers
            .iter()
            .find(|(name, _)| *name == "X-BAPI-SIGN")
            .map(|(_, value)| value.clone())
            .expect("signed request must carry X-BAPI-SIGN")
    }

    #[test]
    fn test_sign_is_deterministic() {
        let signer = signer();
        let p = params(&[("category", "spot"), ("limit", "50")]);

        let a = signer
            .sign(Method::Get, "/v5/execution/list", &p, 1700000000000)
            .unwrap();
        let b = signer
            .sign(Method::Get, "/v5/execution/list", &p, 1700000000000)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sign_independent_of_insertion_order() {
        let signer = signer();

        let mut forward = BTreeMap::new();
        forward.insert("category".to_string(), "spot".to_string());
        forward.insert("limit".to_string(), "50".to_string());

        let mut reverse = BTreeMap::new();
        reverse.insert("limit".to_string(), "50".to_string());
        reverse.insert("category".to_string(), "spot".to_string());

        let a = signer
            .sign(Method::Get, "/v5/execution/list", &forward, 1700000000000)
            .unwrap();
        let b = signer
            .sign(Method::Get, "/v5/execution/list", &reverse, 1700000000000)
            .unwrap();
        assert_eq!(signature_of(&a), signature_of(&b));
    }

    #[test]
    fn test_sign_changes_with_each_input() {
        let signer = signer();
        let p = params(&[("category", "spot"), ("limit", "50")]);
        let base = signature_of(
            &signer
                .sign(Method::Get, "/v5/execution/list", &p, 1700000000000)
                .unwrap(),
        );

        // Different timestamp
        let other = signature_of(
            &signer
                .sign(Method::Get, "/v5/execution/list", &p, 1700000000001)
                .unwrap(),
        );
        assert_ne!(base, other);

        // Different params
        let other = signature_of(
            &signer
                .sign(
                    Method::Get,
                    "/v5/execution/list",
                    &params(&[("category", "linear"), ("limit", "50")]),
                    1700000000000,
                )
                .unwrap(),
        );
        assert_ne!(base, other);

        // Different key
        let other_signer = Signer::new(
            "https://api.bybit.com".to_string(),
            Credentials::new("other-key".to_string(), "test-secret".to_string()),
        );
        let other = signature_of(
            &other_signer
                .sign(Method::Get, "/v5/execution/list", &p, 1700000000000)
                .unwrap(),
        );
        assert_ne!(base, other);

        // Different secret
        let other_signer = Signer::new(
            "https://api.bybit.com".to_string(),
            Credentials::new("test-key".to_string(), "other-secret".to_string()),
        );
        let other = signature_of(
            &other_signer
                .sign(Method::Get, "/v5/execution/list", &p, 1700000000000)
                .unwrap(),
        );
        assert_ne!(base, other);
    }

    #[test]
    fn test_signature_is_lowercase_hex() {
        let signer = signer();
        let p = params(&[("category", "spot")]);
        let sig = signature_of(
            &signer
                .sign(Method::Get, "/v5/execution/list", &p, 1700000000000)
                .unwrap(),
        );
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_get_request_shape() {
        let signer = signer();
        let p = params(&[("category", "spot"), ("limit", "50")]);
        let request = signer
            .sign(Method::Get, "/v5/execution/list", &p, 1700000000000)
            .unwrap();

        assert_eq!(
            request.url,
            "https://api.bybit.com/v5/execution/list?category=spot&limit=50"
        );
        assert!(request.body.is_none());
        let names: Vec<&str> = request.headers.iter().map(|(n, _)| *n).collect();
        assert_eq!(
            names,
            vec![
                "X-BAPI-API-KEY",
                "X-BAPI-SIGN",
                "X-BAPI-TIMESTAMP",
                "X-BAPI-RECV-WINDOW"
            ]
        );
    }

    #[test]
    fn test_post_request_carries_form_body() {
        let signer = signer();
        let p = params(&[("category", "spot"), ("symbol", "BTCUSDT")]);
        let request = signer
            .sign(Method::Post, "/v5/order/create", &p, 1700000000000)
            .unwrap();

        assert_eq!(request.url, "https://api.bybit.com/v5/order/create");
        assert_eq!(
            request.body.as_deref(),
            Some("category=spot&symbol=BTCUSDT")
        );
        assert!(request
            .headers
            .iter()
            .any(|(n, v)| *n == "Content-Type" && v == "application/x-www-form-urlencoded"));
    }

    #[test]
    fn test_signed_payload_matches_wire_bytes() {
        // GET query string and POST body for identical params must encode
        // identically, otherwise the exchange would reject the signature.
        let signer = signer();
        let p = params(&[("category", "spot"), ("symbol", "BTC USDT")]);

        let get = signer
            .sign(Method::Get, "/x", &p, 1700000000000)
            .unwrap();
        let post = signer
            .sign(Method::Post, "/x", &p, 1700000000000)
            .unwrap();

        let query = get.url.split('?').nth(1).unwrap().to_string();
        assert_eq!(Some(query), post.body);
    }

    #[test]
    fn test_empty_params_get_has_no_query() {
        let signer = signer();
        let request = signer
            .sign(Method::Get, "/v5/ping", &BTreeMap::new(), 1700000000000)
            .unwrap();
        assert_eq!(request.url, "https://api.bybit.com/v5/ping");
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let credentials = Credentials::new("key".to_string(), "hunter2".to_string());
        let rendered = format!("{:?}", credentials);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("***"));
    }
}
