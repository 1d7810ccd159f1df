//! Bybit v5 REST client implementation.

use super::{Credentials, ExchangeError, MarketData, Method, Signer};
use crate::domain::{Category, Decimal, Side, Symbol, TimeMs, Trade};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

/// Bound on how long a single exchange call may take.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Bybit market-data client over the v5 REST API.
///
/// Performs no retries; transport failures propagate to the caller, which
/// owns retry policy.
#[derive(Debug, Clone)]
pub struct BybitClient {
    client: reqwest::Client,
    base_url: String,
    signer: Signer,
}

impl BybitClient {
    /// Create a new client against the given base URL (e.g.
    /// `https://api.bybit.com`).
    pub fn new(base_url: String, credentials: Credentials) -> Self {
        let signer = Signer::new(base_url.clone(), credentials);
        Self {
            client: reqwest::Client::new(),
            base_url,
            signer,
        }
    }

    async fn get_json(&self, request: super::SignedRequest) -> Result<String, ExchangeError> {
        let mut builder = self.client.get(&request.url).timeout(REQUEST_TIMEOUT);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value.as_str());
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExchangeError::Http {
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }

    /// Decode a v5 response body, checking `retCode` before the typed
    /// result payload. Error envelopes carry an empty `result` object, so
    /// decoding the payload first would mask the exchange's own message.
    fn decode_envelope<T: for<'de> Deserialize<'de>>(body: &str) -> Result<T, ExchangeError> {
        let envelope: Envelope =
            serde_json::from_str(body).map_err(|e| ExchangeError::Decode(e.to_string()))?;
        if envelope.ret_code != 0 {
            return Err(ExchangeError::Api {
                code: envelope.ret_code,
                message: envelope.ret_msg,
            });
        }
        serde_json::from_value(envelope.result).map_err(|e| ExchangeError::Decode(e.to_string()))
    }
}

#[async_trait]
impl MarketData for BybitClient {
    async fn fetch_trades(
        &self,
        category: &Category,
        limit: u32,
    ) -> Result<Vec<Trade>, ExchangeError> {
        debug!(category = %category, limit, "fetching trade executions");

        let mut params = BTreeMap::new();
        params.insert("category".to_string(), category.as_str().to_string());
        params.insert("limit".to_string(), limit.to_string());

        let request = self.signer.sign(
            Method::Get,
            "/v5/execution/list",
            &params,
            TimeMs::now().as_i64(),
        )?;
        let body = self.get_json(request).await?;
        let result: ExecutionListResult = Self::decode_envelope(&body)?;

        result
            .list
            .into_iter()
            .map(|raw| raw.into_trade(category))
            .collect()
    }

    async fn fetch_price(&self, symbol: &str) -> Result<Decimal, ExchangeError> {
        debug!(symbol, "fetching current spot price");

        let url = format!("{}/v5/market/tickers", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("category", "spot"), ("symbol", symbol)])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExchangeError::Http {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let result: TickerListResult = Self::decode_envelope(&body)?;
        let ticker = result
            .list
            .into_iter()
            .next()
            .ok_or_else(|| ExchangeError::NoPrice(symbol.to_string()))?;

        Decimal::from_str_canonical(&ticker.last_price)
            .map_err(|e| ExchangeError::Decode(format!("invalid lastPrice: {}", e)))
    }
}

/// Bybit v5 response envelope: `{"retCode":0,"retMsg":"OK","result":{...}}`.
///
/// `result` stays untyped until `retCode` has been checked; on failures the
/// exchange sends `"result": {}` regardless of endpoint.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "retCode")]
    ret_code: i64,
    #[serde(rename = "retMsg", default)]
    ret_msg: String,
    #[serde(default)]
    result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ExecutionListResult {
    list: Vec<RawExecution>,
}

/// One execution record from `/v5/execution/list`, numerics string-typed as
/// the exchange sends them.
#[derive(Debug, Deserialize)]
struct RawExecution {
    symbol: String,
    side: String,
    qty: String,
    price: String,
    #[serde(rename = "execTime", deserialize_with = "de_millis")]
    exec_time: i64,
    #[serde(rename = "execId", default)]
    exec_id: Option<String>,
}

impl RawExecution {
    fn into_trade(self, category: &Category) -> Result<Trade, ExchangeError> {
        let side = Side::parse_exchange(&self.side)
            .ok_or_else(|| ExchangeError::Decode(format!("invalid side: {}", self.side)))?;
        let qty = Decimal::from_str_canonical(&self.qty)
            .map_err(|e| ExchangeError::Decode(format!("invalid qty: {}", e)))?;
        let price = Decimal::from_str_canonical(&self.price)
            .map_err(|e| ExchangeError::Decode(format!("invalid price: {}", e)))?;

        Ok(Trade::new(
            Symbol::new(self.symbol),
            category.clone(),
            side,
            qty,
            price,
            TimeMs::new(self.exec_time),
            self.exec_id,
        ))
    }
}

#[derive(Debug, Deserialize)]
struct TickerListResult {
    list: Vec<RawTicker>,
}

#[derive(Debug, Deserialize)]
struct RawTicker {
    #[serde(rename = "lastPrice")]
    last_price: String,
}

/// Epoch milliseconds arrive as either a JSON number or a numeric string
/// depending on the endpoint revision; accept both.
fn de_millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Millis {
        Int(i64),
        Str(String),
    }

    match Millis::deserialize(deserializer)? {
        Millis::Int(ms) => Ok(ms),
        Millis::Str(s) => s.parse::<i64>().map_err(serde::de::Error::custom),
    }
}
