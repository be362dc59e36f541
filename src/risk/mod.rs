//! Volatility-driven risk parameters
//!
//! Maps a volatility estimate to leverage, stop-loss and take-profit levels
//! via a fixed tier table and clamped linear interpolation.

use crate::config::RiskConfig;
use crate::error::{BotError, Result};
use crate::types::{Direction, RiskParameters, TradeIntent};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::warn;

/// Calibrated volatility band for the interpolation endpoints
const VOL_BAND: (Decimal, Decimal) = (dec!(0.01), dec!(0.05));

/// Stop-loss percentage at the bottom of the band
const STOP_LOSS_FLOOR: Decimal = dec!(0.005);
/// Take-profit percentage at the bottom of the band
const TAKE_PROFIT_FLOOR: Decimal = dec!(0.01);

/// Leverage tier for a volatility level (1x-10x).
///
/// Strict `<` comparisons put every boundary into the stricter tier.
pub fn leverage_for(volatility: Decimal) -> u32 {
    if volatility < dec!(0.01) {
        10
    } else if volatility < dec!(0.03) {
        5
    } else if volatility < dec!(0.05) {
        3
    } else {
        1
    }
}

/// Computes risk parameters from (entry price, volatility)
#[derive(Debug, Clone, Copy)]
pub struct RiskCalculator {
    /// Stop-loss percentage at the top of the volatility band
    risk_factor: Decimal,
    /// Take-profit percentage at the top of the volatility band
    reward_factor: Decimal,
}

impl Default for RiskCalculator {
    fn default() -> Self {
        Self {
            risk_factor: dec!(0.02),
            reward_factor: dec!(0.04),
        }
    }
}

impl RiskCalculator {
    pub fn new(risk_factor: Decimal, reward_factor: Decimal) -> Self {
        Self {
            risk_factor,
            reward_factor,
        }
    }

    pub fn from_config(cfg: &RiskConfig) -> Self {
        Self::new(cfg.risk_factor, cfg.reward_factor)
    }

    /// Derive leverage, stop-loss and take-profit prices.
    ///
    /// Volatility outside the calibrated band is clamped to the nearest
    /// endpoint and logged, never rejected.
    pub fn calculate(&self, entry_price: Decimal, volatility: Decimal) -> Result<RiskParameters> {
        if entry_price <= Decimal::ZERO {
            return Err(BotError::InvalidInput(format!(
                "entry price must be positive, got {}",
                entry_price
            )));
        }

        if volatility < VOL_BAND.0 || volatility > VOL_BAND.1 {
            warn!(
                %volatility,
                "volatility outside calibrated band [{}, {}], clamping",
                VOL_BAND.0,
                VOL_BAND.1
            );
        }

        let stop_loss_pct = interp(volatility, VOL_BAND, (STOP_LOSS_FLOOR, self.risk_factor));
        let take_profit_pct = interp(volatility, VOL_BAND, (TAKE_PROFIT_FLOOR, self.reward_factor));

        Ok(RiskParameters {
            leverage: leverage_for(volatility),
            stop_loss_price: (entry_price * (Decimal::ONE - stop_loss_pct)).round_dp(2),
            take_profit_price: (entry_price * (Decimal::ONE + take_profit_pct)).round_dp(2),
        })
    }

    /// Stop level that follows a favorable move.
    ///
    /// While the price has not moved past the entry, the stop stays anchored
    /// at the entry-based level.
    pub fn trailing_stop(
        &self,
        entry_price: Decimal,
        current_price: Decimal,
        trailing_pct: Decimal,
    ) -> Result<Decimal> {
        if entry_price <= Decimal::ZERO || current_price <= Decimal::ZERO {
            return Err(BotError::InvalidInput(
                "entry and current price must be positive".into(),
            ));
        }

        let anchor = if current_price <= entry_price {
            entry_price
        } else {
            current_price
        };

        Ok((anchor * (Decimal::ONE - trailing_pct)).round_dp(2))
    }

    /// Take-profit level that follows a favorable move; `None` until the
    /// price has moved past the entry.
    pub fn trailing_take_profit(
        &self,
        entry_price: Decimal,
        current_price: Decimal,
        trailing_pct: Decimal,
    ) -> Result<Option<Decimal>> {
        if entry_price <= Decimal::ZERO || current_price <= Decimal::ZERO {
            return Err(BotError::InvalidInput(
                "entry and current price must be positive".into(),
            ));
        }

        if current_price <= entry_price {
            return Ok(None);
        }

        Ok(Some(
            (current_price * (Decimal::ONE + trailing_pct)).round_dp(2),
        ))
    }
}

/// Linear interpolation of `x` from the `xs` range onto the `ys` range,
/// clamped at the endpoints.
fn interp(x: Decimal, xs: (Decimal, Decimal), ys: (Decimal, Decimal)) -> Decimal {
    let (x0, x1) = xs;
    let (y0, y1) = ys;

    if x <= x0 {
        return y0;
    }
    if x >= x1 {
        return y1;
    }

    y0 + (x - x0) * (y1 - y0) / (x1 - x0)
}

/// Opens a 1x protective short when volatility runs hot
#[derive(Debug, Clone)]
pub struct HedgePolicy {
    enabled: bool,
    threshold: Decimal,
    ratio: Decimal,
}

impl HedgePolicy {
    pub fn from_config(cfg: &RiskConfig) -> Self {
        Self {
            enabled: cfg.enable_hedge,
            threshold: cfg.hedge_threshold,
            ratio: cfg.hedge_ratio,
        }
    }

    /// Hedge intent for the current cycle, if volatility exceeds the
    /// threshold. Sized as a fraction of the main trade quantity, always
    /// SHORT at 1x.
    pub fn hedge_intent(
        &self,
        symbol: &str,
        quantity: Decimal,
        volatility: Decimal,
    ) -> Option<TradeIntent> {
        if !self.enabled || volatility <= self.threshold {
            return None;
        }

        Some(TradeIntent {
            symbol: symbol.to_string(),
            direction: Direction::Short,
            quantity: quantity * self.ratio,
            leverage: 1,
        })
    }
}
