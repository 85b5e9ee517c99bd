//! Alpaca REST adapter for market data, account, positions and orders.
//!
//! Blocking client with a fixed per-request timeout; a timeout surfaces as a
//! fetch error like any other transport failure. Nothing here retries.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::bar::PriceBar;
use crate::domain::error::BotError;
use crate::domain::strategy::TimeInForce;
use crate::ports::broker_port::{
    Account, BrokerPosition, OrderAmount, OrderGateway, OrderRequest, OrderSide, PriceFeed,
};
use crate::ports::config_port::ConfigPort;

const SECTION: &str = "alpaca";

#[derive(Debug, Clone)]
pub struct AlpacaConfig {
    pub api_key: String,
    pub api_secret: String,
    pub base_url: String,
    pub data_url: String,
    pub timeout: Duration,
}

impl AlpacaConfig {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, BotError> {
        let required = |key: &str| {
            config
                .get_string(SECTION, key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| BotError::ConfigMissing {
                    section: SECTION.into(),
                    key: key.into(),
                })
        };
        Ok(AlpacaConfig {
            api_key: required("api_key")?,
            api_secret: required("api_secret")?,
            base_url: required("base_url")?.trim_end_matches('/').to_string(),
            data_url: required("data_url")?.trim_end_matches('/').to_string(),
            timeout: Duration::from_millis(config.get_int(SECTION, "timeout_ms", 10_000).max(1) as u64),
        })
    }
}

/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct AlpacaAdapter {
    client: Client,
    base_url: String,
    data_url: String,
}

impl AlpacaAdapter {
    pub fn new(config: &AlpacaConfig) -> Result<Self, BotError> {
        let mut headers = HeaderMap::new();
        headers.insert("APCA-API-KEY-ID", header_value("api_key", &config.api_key)?);
        headers.insert(
            "APCA-API-SECRET-KEY",
            header_value("api_secret", &config.api_secret)?,
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e: reqwest::Error| BotError::fetch("http client", e))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            data_url: config.data_url.clone(),
        })
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T, BotError> {
        self.client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json::<T>())
            .map_err(|e: reqwest::Error| BotError::fetch(what, e))
    }
}

fn header_value(key: &str, value: &str) -> Result<HeaderValue, BotError> {
    HeaderValue::from_str(value).map_err(|_| BotError::ConfigInvalid {
        section: SECTION.into(),
        key: key.into(),
        reason: "not a valid header value".into(),
    })
}

/// Path-segment form of a pair symbol (`BTC/USD` → `BTC%2FUSD`).
pub fn encode_symbol(symbol: &str) -> String {
    symbol.replace('/', "%2F")
}

impl PriceFeed for AlpacaAdapter {
    fn latest_bar(&self, symbol: &str) -> Result<PriceBar, BotError> {
        let url = format!("{}/v1beta3/crypto/us/latest/bars", self.data_url);
        let response: BarsResponse = self
            .client
            .get(&url)
            .query(&[("symbols", symbol)])
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json())
            .map_err(|e: reqwest::Error| BotError::fetch("latest bar", e))?;
        response.into_bar(symbol)
    }
}

impl OrderGateway for AlpacaAdapter {
    fn account(&self) -> Result<Account, BotError> {
        let wire: WireAccount = self.get_json(&format!("{}/v2/account", self.base_url), "account")?;
        Ok(wire.into())
    }

    fn position(&self, symbol: &str) -> Result<Option<BrokerPosition>, BotError> {
        let url = format!("{}/v2/positions/{}", self.base_url, encode_symbol(symbol));
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e: reqwest::Error| BotError::fetch("position", e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let wire: WirePosition = response
            .error_for_status()
            .and_then(|r| r.json())
            .map_err(|e: reqwest::Error| BotError::fetch("position", e))?;
        Ok(Some(wire.into()))
    }

    fn submit_order(&self, order: &OrderRequest) -> Result<(), BotError> {
        let body = WireOrder::from(order);
        let rejected = |reason: String| BotError::OrderRejected {
            side: order.side.to_string(),
            reason,
        };

        let response = self
            .client
            .post(format!("{}/v2/orders", self.base_url))
            .json(&body)
            .send()
            .map_err(|e: reqwest::Error| rejected(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(rejected(format!("{status}: {text}")));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct BarsResponse {
    #[serde(default)]
    bars: HashMap<String, WireBar>,
}

impl BarsResponse {
    fn into_bar(mut self, symbol: &str) -> Result<PriceBar, BotError> {
        self.bars
            .remove(symbol)
            .map(|b| PriceBar {
                open: b.o,
                high: b.h,
                low: b.l,
                close: b.c,
            })
            .ok_or_else(|| BotError::fetch("latest bar", format!("no bar for {symbol}")))
    }
}

#[derive(Debug, Deserialize)]
struct WireBar {
    o: f64,
    h: f64,
    l: f64,
    c: f64,
}

#[derive(Debug, Deserialize)]
struct WireAccount {
    #[serde(deserialize_with = "number_or_string")]
    equity: f64,
    #[serde(default, deserialize_with = "number_or_string")]
    last_equity: f64,
    #[serde(default, deserialize_with = "number_or_string")]
    buying_power: f64,
}

impl From<WireAccount> for Account {
    fn from(w: WireAccount) -> Self {
        Account {
            equity: w.equity,
            last_equity: w.last_equity,
            buying_power: w.buying_power,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WirePosition {
    #[serde(deserialize_with = "number_or_string")]
    qty: f64,
    #[serde(deserialize_with = "number_or_string")]
    avg_entry_price: f64,
    #[serde(default, deserialize_with = "number_or_string")]
    unrealized_pl: f64,
}

impl From<WirePosition> for BrokerPosition {
    fn from(w: WirePosition) -> Self {
        BrokerPosition {
            qty: w.qty,
            avg_entry_price: w.avg_entry_price,
            unrealized_pl: w.unrealized_pl,
        }
    }
}

/// Order body; amounts go out as decimal strings.
#[derive(Debug, Serialize)]
struct WireOrder<'a> {
    symbol: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    qty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notional: Option<String>,
    side: OrderSide,
    #[serde(rename = "type")]
    order_type: &'static str,
    time_in_force: TimeInForce,
}

impl<'a> From<&'a OrderRequest> for WireOrder<'a> {
    fn from(order: &'a OrderRequest) -> Self {
        let (qty, notional) = match order.amount {
            OrderAmount::Qty(q) => (Some(q.to_string()), None),
            OrderAmount::Notional(n) => (None, Some(format!("{n:.2}"))),
        };
        WireOrder {
            symbol: &order.symbol,
            qty,
            notional,
            side: order.side,
            order_type: "market",
            time_in_force: order.time_in_force,
        }
    }
}

/// Alpaca sends most decimals as JSON strings.
fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
