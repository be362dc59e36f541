//! Core domain types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One trade tick from the market data feed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSample {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
}

impl PriceSample {
    pub fn now(price: Decimal) -> Self {
        Self {
            timestamp: Utc::now(),
            price,
        }
    }
}

/// Trade direction signal produced by a decision source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
    /// No trade this cycle
    Flat,
}

impl Direction {
    /// Order side that opens a position in this direction
    pub fn entry_side(&self) -> Option<OrderSide> {
        match self {
            Direction::Long => Some(OrderSide::Buy),
            Direction::Short => Some(OrderSide::Sell),
            Direction::Flat => None,
        }
    }

    /// Order side that closes a position in this direction
    /// (used for protective stop/take-profit orders)
    pub fn exit_side(&self) -> Option<OrderSide> {
        match self {
            Direction::Long => Some(OrderSide::Sell),
            Direction::Short => Some(OrderSide::Buy),
            Direction::Flat => None,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
            Direction::Flat => write!(f, "FLAT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

/// Futures order types used by the execution sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKind {
    Market,
    /// Stop-loss trigger order, fires a market order at `stop_price`
    StopMarket,
    /// Take-profit trigger order, fires a market order at `stop_price`
    TakeProfitMarket,
}

impl OrderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderKind::Market => "MARKET",
            OrderKind::StopMarket => "STOP_MARKET",
            OrderKind::TakeProfitMarket => "TAKE_PROFIT_MARKET",
        }
    }
}

/// A single order to be placed on the venue
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub kind: OrderKind,
    pub quantity: Decimal,
    /// Trigger price for StopMarket / TakeProfitMarket, None for Market
    pub stop_price: Option<Decimal>,
    pub client_order_id: String,
}

impl OrderRequest {
    pub fn market(symbol: &str, side: OrderSide, quantity: Decimal) -> Self {
        Self {
            symbol: symbol.to_string(),
            side,
            kind: OrderKind::Market,
            quantity,
            stop_price: None,
            client_order_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn stop_market(symbol: &str, side: OrderSide, quantity: Decimal, stop_price: Decimal) -> Self {
        Self {
            symbol: symbol.to_string(),
            side,
            kind: OrderKind::StopMarket,
            quantity,
            stop_price: Some(stop_price),
            client_order_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn take_profit_market(
        symbol: &str,
        side: OrderSide,
        quantity: Decimal,
        stop_price: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            side,
            kind: OrderKind::TakeProfitMarket,
            quantity,
            stop_price: Some(stop_price),
            client_order_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Venue acknowledgement for a placed order
#[derive(Debug, Clone, PartialEq)]
pub struct OrderAck {
    pub order_id: String,
    pub symbol: String,
    pub side: OrderSide,
    pub kind: OrderKind,
    pub quantity: Decimal,
}

/// An open position as reported by the venue
#[derive(Debug, Clone)]
pub struct PositionInfo {
    pub symbol: String,
    /// Signed position size (negative = short)
    pub amount: Decimal,
    pub entry_price: Decimal,
    pub leverage: u32,
    pub unrealized_pnl: Decimal,
}

/// Risk parameters derived from (entry price, volatility)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskParameters {
    pub leverage: u32,
    pub stop_loss_price: Decimal,
    pub take_profit_price: Decimal,
}

/// One intended trade, consumed exactly once by the order sequencer
#[derive(Debug, Clone, PartialEq)]
pub struct TradeIntent {
    pub symbol: String,
    pub direction: Direction,
    pub quantity: Decimal,
    pub leverage: u32,
}
