//! Simulated venue for dry runs and tests
//!
//! Accepts the same calls as the real exchange, records everything, and
//! tracks net position per symbol in memory. Nothing leaves the process.

use crate::client::FuturesVenue;
use crate::error::{BotError, Result};
use crate::types::{OrderAck, OrderKind, OrderRequest, OrderSide, PositionInfo};
use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::info;

#[derive(Default)]
struct PaperState {
    last_price: Decimal,
    history: Vec<Decimal>,
    orders: Vec<OrderRequest>,
    leverage_calls: Vec<(String, u32)>,
    positions: HashMap<String, (Decimal, u32)>, // signed amount, leverage
    next_order_id: u64,
}

pub struct PaperVenue {
    state: Mutex<PaperState>,
}

impl PaperVenue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(PaperState::default()),
        }
    }

    /// Seed the simulated market price
    pub fn set_price(&self, price: Decimal) {
        let mut state = self.state.lock();
        state.last_price = price;
        state.history.push(price);
    }

    /// All orders accepted so far, in placement order
    pub fn orders(&self) -> Vec<OrderRequest> {
        self.state.lock().orders.clone()
    }

    /// All leverage updates accepted so far
    pub fn leverage_calls(&self) -> Vec<(String, u32)> {
        self.state.lock().leverage_calls.clone()
    }
}

impl Default for PaperVenue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FuturesVenue for PaperVenue {
    async fn set_leverage(&self, symbol: &str, leverage: u32) -> Result<()> {
        let mut state = self.state.lock();
        state.leverage_calls.push((symbol.to_string(), leverage));
        if let Some(entry) = state.positions.get_mut(symbol) {
            entry.1 = leverage;
        }
        Ok(())
    }

    async fn place_order(&self, order: &OrderRequest) -> Result<OrderAck> {
        if order.quantity <= Decimal::ZERO {
            return Err(BotError::InvalidInput(format!(
                "order quantity must be positive, got {}",
                order.quantity
            )));
        }

        let mut state = self.state.lock();
        state.next_order_id += 1;
        let order_id = format!("paper-{}", state.next_order_id);

        // Only market orders move the simulated position; trigger orders
        // are recorded but never fire.
        if order.kind == OrderKind::Market {
            let entry = state
                .positions
                .entry(order.symbol.clone())
                .or_insert((Decimal::ZERO, 1));
            match order.side {
                OrderSide::Buy => entry.0 += order.quantity,
                OrderSide::Sell => entry.0 -= order.quantity,
            }
            let flat = entry.0.is_zero();
            if flat {
                state.positions.remove(&order.symbol);
            }
        }

        state.orders.push(order.clone());

        info!(
            symbol = %order.symbol,
            side = order.side.as_str(),
            kind = order.kind.as_str(),
            quantity = %order.quantity,
            order_id = %order_id,
            "paper order accepted"
        );

        Ok(OrderAck {
            order_id,
            symbol: order.symbol.clone(),
            side: order.side,
            kind: order.kind,
            quantity: order.quantity,
        })
    }

    async fn ticker_price(&self, _symbol: &str) -> Result<Decimal> {
        Ok(self.state.lock().last_price)
    }

    async fn mark_price(&self, _symbol: &str) -> Result<Decimal> {
        Ok(self.state.lock().last_price)
    }

    async fn close_prices(
        &self,
        _symbol: &str,
        _interval: &str,
        limit: usize,
    ) -> Result<Vec<Decimal>> {
        let state = self.state.lock();
        let start = state.history.len().saturating_sub(limit);
        Ok(state.history[start..].to_vec())
    }

    async fn open_positions(&self) -> Result<Vec<PositionInfo>> {
        let state = self.state.lock();
        Ok(state
            .positions
            .iter()
            .map(|(symbol, (amount, leverage))| PositionInfo {
                symbol: symbol.clone(),
                amount: *amount,
                entry_price: state.last_price,
                leverage: *leverage,
                unrealized_pnl: Decimal::ZERO,
            })
            .collect())
    }

    async fn close_position(&self, symbol: &str) -> Result<Option<OrderAck>> {
        let amount = {
            let state = self.state.lock();
            match state.positions.get(symbol) {
                Some((amount, _)) => *amount,
                None => return Ok(None),
            }
        };

        let side = if amount > Decimal::ZERO {
            OrderSide::Sell
        } else {
            OrderSide::Buy
        };

        let ack = self
            .place_order(&OrderRequest::market(symbol, side, amount.abs()))
            .await?;
        Ok(Some(ack))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_market_orders_move_position() {
        tokio_test::block_on(async {
            let venue = PaperVenue::new();
            venue.set_price(dec!(35000));

            venue
                .place_order(&OrderRequest::market("BTCUSDT", OrderSide::Buy, dec!(0.02)))
                .await
                .unwrap();
            venue
                .place_order(&OrderRequest::market("BTCUSDT", OrderSide::Sell, dec!(0.01)))
                .await
                .unwrap();

            let positions = venue.open_positions().await.unwrap();
            assert_eq!(positions.len(), 1);
            assert_eq!(positions[0].amount, dec!(0.01));
        });
    }

    #[test]
    fn test_trigger_orders_do_not_move_position() {
        tokio_test::block_on(async {
            let venue = PaperVenue::new();
            venue.set_price(dec!(35000));

            venue
                .place_order(&OrderRequest::stop_market(
                    "BTCUSDT",
                    OrderSide::Sell,
                    dec!(0.01),
                    dec!(34000),
                ))
                .await
                .unwrap();

            assert!(venue.open_positions().await.unwrap().is_empty());
            assert_eq!(venue.orders().len(), 1);
        });
    }

    #[test]
    fn test_close_position_round_trip() {
        tokio_test::block_on(async {
            let venue = PaperVenue::new();
            venue.set_price(dec!(35000));

            venue
                .place_order(&OrderRequest::market("BTCUSDT", OrderSide::Sell, dec!(0.01)))
                .await
                .unwrap();

            let ack = venue.close_position("BTCUSDT").await.unwrap().unwrap();
            assert_eq!(ack.side, OrderSide::Buy);
            assert!(venue.open_positions().await.unwrap().is_empty());

            // second close is a no-op
            assert!(venue.close_position("BTCUSDT").await.unwrap().is_none());
        });
    }

    #[test]
    fn test_rejects_non_positive_quantity() {
        tokio_test::block_on(async {
            let venue = PaperVenue::new();
            let err = venue
                .place_order(&OrderRequest::market("BTCUSDT", OrderSide::Buy, dec!(0)))
                .await
                .unwrap_err();
            assert!(matches!(err, BotError::InvalidInput(_)));
        });
    }
}
