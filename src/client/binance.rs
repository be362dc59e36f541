//! Binance USDT-M futures REST client

use crate::client::{auth, FuturesVenue};
use crate::config::BinanceConfig;
use crate::error::{BotError, Result};
use crate::types::{OrderAck, OrderKind, OrderRequest, OrderSide, PositionInfo};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// REST client for the `fapi` endpoints (mainnet or testnet)
#[derive(Clone)]
pub struct BinanceFutures {
    http: Client,
    base: String,
    api_key: String,
    api_secret: String,
    recv_window_ms: u64,
}

#[derive(Debug, Deserialize)]
struct TickerPrice {
    price: String,
}

#[derive(Debug, Deserialize)]
struct PremiumIndex {
    #[serde(rename = "markPrice")]
    mark_price: String,
}

#[derive(Debug, Deserialize)]
struct PlacedOrder {
    #[serde(rename = "orderId")]
    order_id: u64,
}

#[derive(Debug, Deserialize)]
struct PositionRisk {
    symbol: String,
    #[serde(rename = "positionAmt")]
    position_amt: String,
    #[serde(rename = "entryPrice")]
    entry_price: String,
    leverage: String,
    #[serde(rename = "unRealizedProfit")]
    unrealized_profit: String,
}

impl BinanceFutures {
    pub fn new(cfg: &BinanceConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base: cfg.rest_base().trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            api_secret: cfg.api_secret.clone(),
            recv_window_ms: cfg.recv_window_ms,
        })
    }

    /// Build a signed query string: params + timestamp + recvWindow + signature
    fn signed_query(&self, mut params: Vec<(String, String)>) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(BotError::ConfigurationMissing("binance.api_key".into()));
        }
        if self.api_secret.is_empty() {
            return Err(BotError::ConfigurationMissing("binance.api_secret".into()));
        }

        params.push(("recvWindow".into(), self.recv_window_ms.to_string()));
        params.push(("timestamp".into(), auth::timestamp_ms().to_string()));

        let query = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        let signature = auth::sign(&self.api_secret, &query)?;
        Ok(format!("{query}&signature={signature}"))
    }

    async fn signed_post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: Vec<(String, String)>,
    ) -> Result<T> {
        let query = self.signed_query(params)?;
        let url = format!("{}{}?{}", self.base, path, query);

        let resp = self
            .http
            .post(&url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await?;

        Ok(Self::check(resp).await?.json().await?)
    }

    async fn signed_get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: Vec<(String, String)>,
    ) -> Result<T> {
        let query = self.signed_query(params)?;
        let url = format!("{}{}?{}", self.base, path, query);

        let resp = self
            .http
            .get(&url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await?;

        Ok(Self::check(resp).await?.json().await?)
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        Err(BotError::Exchange(format!("{status}: {body}")))
    }
}

fn parse_decimal(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap_or_else(|err| {
        warn!(input = value, ?err, "failed to parse decimal from exchange");
        Decimal::ZERO
    })
}

fn order_params(order: &OrderRequest) -> Vec<(String, String)> {
    let mut params = vec![
        ("symbol".to_string(), order.symbol.clone()),
        ("side".to_string(), order.side.as_str().to_string()),
        ("type".to_string(), order.kind.as_str().to_string()),
        ("quantity".to_string(), order.quantity.normalize().to_string()),
        ("newClientOrderId".to_string(), order.client_order_id.clone()),
    ];

    if let Some(stop_price) = order.stop_price {
        params.push(("stopPrice".to_string(), stop_price.normalize().to_string()));
    }

    params
}

#[async_trait]
impl FuturesVenue for BinanceFutures {
    async fn set_leverage(&self, symbol: &str, leverage: u32) -> Result<()> {
        let params = vec![
            ("symbol".to_string(), symbol.to_string()),
            ("leverage".to_string(), leverage.to_string()),
        ];

        let _: serde_json::Value = self.signed_post("/fapi/v1/leverage", params).await?;
        info!(symbol, leverage, "leverage updated");
        Ok(())
    }

    async fn place_order(&self, order: &OrderRequest) -> Result<OrderAck> {
        let placed: PlacedOrder = self
            .signed_post("/fapi/v1/order", order_params(order))
            .await?;

        info!(
            symbol = %order.symbol,
            side = order.side.as_str(),
            kind = order.kind.as_str(),
            quantity = %order.quantity,
            order_id = placed.order_id,
            "order placed"
        );

        Ok(OrderAck {
            order_id: placed.order_id.to_string(),
            symbol: order.symbol.clone(),
            side: order.side,
            kind: order.kind,
            quantity: order.quantity,
        })
    }

    async fn ticker_price(&self, symbol: &str) -> Result<Decimal> {
        let url = format!("{}/fapi/v1/ticker/price", self.base);
        let resp = self.http.get(&url).query(&[("symbol", symbol)]).send().await?;
        let ticker: TickerPrice = Self::check(resp).await?.json().await?;
        Ok(parse_decimal(&ticker.price))
    }

    async fn mark_price(&self, symbol: &str) -> Result<Decimal> {
        let url = format!("{}/fapi/v1/premiumIndex", self.base);
        let resp = self.http.get(&url).query(&[("symbol", symbol)]).send().await?;
        let index: PremiumIndex = Self::check(resp).await?.json().await?;
        Ok(parse_decimal(&index.mark_price))
    }

    async fn close_prices(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<Decimal>> {
        let url = format!("{}/fapi/v1/klines", self.base);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("interval", interval),
                ("limit", &limit.to_string()),
            ])
            .send()
            .await?;

        // Each kline is a positional array; index 4 is the close price
        let klines: Vec<serde_json::Value> = Self::check(resp).await?.json().await?;
        let closes = klines
            .iter()
            .filter_map(|k| k.get(4).and_then(|v| v.as_str()).map(parse_decimal))
            .collect();

        Ok(closes)
    }

    async fn open_positions(&self) -> Result<Vec<PositionInfo>> {
        let rows: Vec<PositionRisk> = self.signed_get("/fapi/v2/positionRisk", vec![]).await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let amount = parse_decimal(&row.position_amt);
                if amount.is_zero() {
                    return None;
                }
                Some(PositionInfo {
                    symbol: row.symbol,
                    amount,
                    entry_price: parse_decimal(&row.entry_price),
                    leverage: row.leverage.parse().unwrap_or(1),
                    unrealized_pnl: parse_decimal(&row.unrealized_profit),
                })
            })
            .collect())
    }

    async fn close_position(&self, symbol: &str) -> Result<Option<OrderAck>> {
        let position = self
            .open_positions()
            .await?
            .into_iter()
            .find(|p| p.symbol == symbol);

        let Some(position) = position else {
            debug!(symbol, "no open position to close");
            return Ok(None);
        };

        let side = if position.amount > Decimal::ZERO {
            OrderSide::Sell
        } else {
            OrderSide::Buy
        };

        let mut params = order_params(&OrderRequest::market(
            symbol,
            side,
            position.amount.abs(),
        ));
        params.push(("reduceOnly".to_string(), "true".to_string()));

        let placed: PlacedOrder = self.signed_post("/fapi/v1/order", params).await?;
        info!(symbol, order_id = placed.order_id, "position closed");

        Ok(Some(OrderAck {
            order_id: placed.order_id.to_string(),
            symbol: symbol.to_string(),
            side,
            kind: OrderKind::Market,
            quantity: position.amount.abs(),
        }))
    }
}
