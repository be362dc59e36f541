//! Futures venue clients
//!
//! `FuturesVenue` is the capability surface the rest of the bot depends on;
//! `BinanceFutures` talks to the real exchange, `PaperVenue` simulates it
//! for dry runs and tests.

pub mod auth;
pub mod binance;
pub mod paper;

pub use binance::BinanceFutures;
pub use paper::PaperVenue;

use crate::error::Result;
use crate::types::{OrderAck, OrderRequest, PositionInfo};
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Exchange capability used by the order sequencer and the CLI commands
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FuturesVenue: Send + Sync {
    /// Update per-symbol leverage
    async fn set_leverage(&self, symbol: &str, leverage: u32) -> Result<()>;

    /// Place a single order and return the venue acknowledgement
    async fn place_order(&self, order: &OrderRequest) -> Result<OrderAck>;

    /// Latest traded price
    async fn ticker_price(&self, symbol: &str) -> Result<Decimal>;

    /// Current mark price
    async fn mark_price(&self, symbol: &str) -> Result<Decimal>;

    /// Recent candle close prices, oldest first
    async fn close_prices(&self, symbol: &str, interval: &str, limit: usize)
        -> Result<Vec<Decimal>>;

    /// All open positions (non-zero amounts only)
    async fn open_positions(&self) -> Result<Vec<PositionInfo>>;

    /// Close an open position with a reduce-only market order.
    /// Returns `None` when there is nothing to close.
    async fn close_position(&self, symbol: &str) -> Result<Option<OrderAck>>;
}
