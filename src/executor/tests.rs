//! Unit tests for the order sequencer

use super::*;
use crate::client::{MockFuturesVenue, PaperVenue};
use crate::types::{Direction, OrderKind, OrderSide};
use rust_decimal_macros::dec;
use std::sync::Arc;

fn intent(direction: Direction) -> TradeIntent {
    TradeIntent {
        symbol: "BTCUSDT".to_string(),
        direction,
        quantity: dec!(0.01),
        leverage: 3,
    }
}

fn params() -> RiskParameters {
    RiskParameters {
        leverage: 3,
        stop_loss_price: dec!(34562.50),
        take_profit_price: dec!(35875.00),
    }
}

#[tokio::test]
async fn test_long_sequence_order_and_sides() {
    let venue = Arc::new(PaperVenue::new());
    venue.set_price(dec!(35000));
    let sequencer = OrderSequencer::new(venue.clone());

    let outcome = sequencer.execute(&intent(Direction::Long), &params()).await.unwrap();
    assert!(outcome.entry.is_some());
    assert!(outcome.stop_loss.is_some());
    assert!(outcome.take_profit.is_some());

    assert_eq!(venue.leverage_calls(), vec![("BTCUSDT".to_string(), 3)]);

    let orders = venue.orders();
    assert_eq!(orders.len(), 3);

    assert_eq!(orders[0].kind, OrderKind::Market);
    assert_eq!(orders[0].side, OrderSide::Buy);

    assert_eq!(orders[1].kind, OrderKind::StopMarket);
    assert_eq!(orders[1].side, OrderSide::Sell);
    assert_eq!(orders[1].stop_price, Some(dec!(34562.50)));

    assert_eq!(orders[2].kind, OrderKind::TakeProfitMarket);
    assert_eq!(orders[2].side, OrderSide::Sell);
    assert_eq!(orders[2].stop_price, Some(dec!(35875.00)));
}

#[tokio::test]
async fn test_short_sequence_inverts_sides() {
    let venue = Arc::new(PaperVenue::new());
    venue.set_price(dec!(35000));
    let sequencer = OrderSequencer::new(venue.clone());

    sequencer.execute(&intent(Direction::Short), &params()).await.unwrap();

    let orders = venue.orders();
    assert_eq!(orders[0].side, OrderSide::Sell);
    assert_eq!(orders[1].side, OrderSide::Buy);
    assert_eq!(orders[2].side, OrderSide::Buy);
}

#[tokio::test]
async fn test_stop_loss_failure_halts_without_rollback() {
    let mut venue = MockFuturesVenue::new();

    venue
        .expect_set_leverage()
        .times(1)
        .returning(|_, _| Ok(()));

    // exactly two placements: the entry succeeds, the stop-loss fails,
    // and the take-profit must never be attempted
    venue
        .expect_place_order()
        .times(2)
        .returning(|order| match order.kind {
            OrderKind::Market => Ok(OrderAck {
                order_id: "1".to_string(),
                symbol: order.symbol.clone(),
                side: order.side,
                kind: order.kind,
                quantity: order.quantity,
            }),
            _ => Err(BotError::Exchange("stop rejected".into())),
        });

    let sequencer = OrderSequencer::new(Arc::new(venue));
    let err = sequencer
        .execute(&intent(Direction::Long), &params())
        .await
        .unwrap_err();

    assert_eq!(err.step, SequenceStep::StopLoss);
    // the market order stands; nothing was rolled back
    assert!(err.placed.entry.is_some());
    assert!(err.placed.stop_loss.is_none());
    assert!(err.placed.take_profit.is_none());
}

#[tokio::test]
async fn test_leverage_failure_halts_before_any_order() {
    let mut venue = MockFuturesVenue::new();

    venue
        .expect_set_leverage()
        .times(1)
        .returning(|_, _| Err(BotError::Exchange("leverage rejected".into())));
    // no place_order expectation: any placement would fail the test

    let sequencer = OrderSequencer::new(Arc::new(venue));
    let err = sequencer
        .execute(&intent(Direction::Long), &params())
        .await
        .unwrap_err();

    assert_eq!(err.step, SequenceStep::Leverage);
    assert!(err.placed.entry.is_none());
}

#[tokio::test]
async fn test_flat_intent_rejected_before_venue_calls() {
    let venue = MockFuturesVenue::new();
    let sequencer = OrderSequencer::new(Arc::new(venue));

    let err = sequencer
        .execute(&intent(Direction::Flat), &params())
        .await
        .unwrap_err();

    assert_eq!(err.step, SequenceStep::Validation);
    assert!(matches!(err.source, BotError::InvalidInput(_)));
}

#[tokio::test]
async fn test_non_positive_quantity_rejected() {
    let venue = MockFuturesVenue::new();
    let sequencer = OrderSequencer::new(Arc::new(venue));

    let mut bad = intent(Direction::Long);
    bad.quantity = dec!(0);

    let err = sequencer.execute(&bad, &params()).await.unwrap_err();
    assert_eq!(err.step, SequenceStep::Validation);
}
