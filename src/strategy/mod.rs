//! Trade direction signals
//!
//! `DecisionSource` is the seam where external models (reinforcement
//! learning, price forecasters, sentiment) plug into the pipeline. The
//! built-in implementation is a plain momentum check over the price window.

use crate::market::PriceWindow;
use crate::types::Direction;
use rust_decimal::Decimal;
use tracing::debug;

/// Supplies a trade direction per decision cycle
pub trait DecisionSource: Send + Sync {
    fn decide(&self, window: &PriceWindow) -> Direction;
}

/// Momentum over the window edges: long above the threshold, short below
/// the negated threshold, flat in between.
#[derive(Debug, Clone, Copy)]
pub struct MomentumDecision {
    min_momentum: Decimal,
}

impl MomentumDecision {
    pub fn new(min_momentum: Decimal) -> Self {
        Self { min_momentum }
    }
}

impl DecisionSource for MomentumDecision {
    fn decide(&self, window: &PriceWindow) -> Direction {
        let (first, last) = match (window.oldest(), window.latest()) {
            (Some(f), Some(l)) if window.len() >= 2 && f.price > Decimal::ZERO => {
                (f.price, l.price)
            }
            _ => return Direction::Flat,
        };

        let momentum = (last - first) / first;

        if momentum >= self.min_momentum {
            Direction::Long
        } else if momentum <= -self.min_momentum {
            Direction::Short
        } else {
            debug!(%momentum, "momentum below threshold, staying flat");
            Direction::Flat
        }
    }
}
