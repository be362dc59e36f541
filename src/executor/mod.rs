//! Order execution sequencing
//!
//! Turns a trade intent plus risk parameters into the fixed four-step call
//! sequence against the venue: leverage update, market entry, stop-loss,
//! take-profit. A failing step halts the sequence; orders already placed
//! stand (there is no compensating transaction).

#[cfg(test)]
mod tests;

use crate::client::FuturesVenue;
use crate::error::BotError;
use crate::types::{OrderAck, OrderRequest, RiskParameters, TradeIntent};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

/// Step of the execution sequence, used to tag halts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceStep {
    Validation,
    Leverage,
    Entry,
    StopLoss,
    TakeProfit,
}

impl std::fmt::Display for SequenceStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SequenceStep::Validation => "validation",
            SequenceStep::Leverage => "leverage update",
            SequenceStep::Entry => "market entry",
            SequenceStep::StopLoss => "stop-loss order",
            SequenceStep::TakeProfit => "take-profit order",
        };
        write!(f, "{name}")
    }
}

/// Acknowledgements collected as the sequence progresses
#[derive(Debug, Clone, Default)]
pub struct SequenceOutcome {
    pub entry: Option<OrderAck>,
    pub stop_loss: Option<OrderAck>,
    pub take_profit: Option<OrderAck>,
}

/// A halted sequence: which step failed, why, and what already went through
#[derive(Debug, thiserror::Error)]
#[error("order sequence halted at {step}: {source}")]
pub struct SequenceError {
    pub step: SequenceStep,
    #[source]
    pub source: BotError,
    pub placed: SequenceOutcome,
}

impl SequenceError {
    fn at(step: SequenceStep, source: BotError, placed: SequenceOutcome) -> Self {
        Self {
            step,
            source,
            placed,
        }
    }
}

/// Issues the leverage/entry/stop/take-profit sequence against one venue
pub struct OrderSequencer {
    venue: Arc<dyn FuturesVenue>,
}

impl OrderSequencer {
    pub fn new(venue: Arc<dyn FuturesVenue>) -> Self {
        Self { venue }
    }

    pub async fn execute(
        &self,
        intent: &TradeIntent,
        params: &RiskParameters,
    ) -> Result<SequenceOutcome, SequenceError> {
        let (entry_side, exit_side) =
            match (intent.direction.entry_side(), intent.direction.exit_side()) {
                (Some(entry), Some(exit)) => (entry, exit),
                _ => {
                    return Err(SequenceError::at(
                        SequenceStep::Validation,
                        BotError::InvalidInput("flat intent cannot be executed".into()),
                        SequenceOutcome::default(),
                    ))
                }
            };

        if intent.quantity <= Decimal::ZERO {
            return Err(SequenceError::at(
                SequenceStep::Validation,
                BotError::InvalidInput(format!(
                    "quantity must be positive, got {}",
                    intent.quantity
                )),
                SequenceOutcome::default(),
            ));
        }

        let mut placed = SequenceOutcome::default();

        self.venue
            .set_leverage(&intent.symbol, intent.leverage)
            .await
            .map_err(|e| SequenceError::at(SequenceStep::Leverage, e, placed.clone()))?;

        let entry = self
            .venue
            .place_order(&OrderRequest::market(
                &intent.symbol,
                entry_side,
                intent.quantity,
            ))
            .await
            .map_err(|e| SequenceError::at(SequenceStep::Entry, e, placed.clone()))?;
        placed.entry = Some(entry);

        let stop_loss = self
            .venue
            .place_order(&OrderRequest::stop_market(
                &intent.symbol,
                exit_side,
                intent.quantity,
                params.stop_loss_price,
            ))
            .await
            .map_err(|e| SequenceError::at(SequenceStep::StopLoss, e, placed.clone()))?;
        placed.stop_loss = Some(stop_loss);

        let take_profit = self
            .venue
            .place_order(&OrderRequest::take_profit_market(
                &intent.symbol,
                exit_side,
                intent.quantity,
                params.take_profit_price,
            ))
            .await
            .map_err(|e| SequenceError::at(SequenceStep::TakeProfit, e, placed.clone()))?;
        placed.take_profit = Some(take_profit);

        info!(
            symbol = %intent.symbol,
            direction = %intent.direction,
            quantity = %intent.quantity,
            leverage = intent.leverage,
            stop_loss = %params.stop_loss_price,
            take_profit = %params.take_profit_price,
            "position opened with protective orders"
        );

        Ok(placed)
    }
}
