//! Per-tick trading pipeline
//!
//! One pass per inbound price: window push → volatility → direction →
//! risk parameters → order sequence → notifications. Every failure aborts
//! the current cycle only; the feed connection and the process live on.

use crate::config::Config;
use crate::error::{BotError, Result};
use crate::executor::OrderSequencer;
use crate::feed::TickHandler;
use crate::market::{PriceWindow, VolatilityEstimator};
use crate::notify::{ErrorLog, ErrorReporter, Notifier};
use crate::risk::{HedgePolicy, RiskCalculator};
use crate::strategy::DecisionSource;
use crate::types::{Direction, PriceSample, RiskParameters, TradeIntent};
use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub struct Engine {
    symbol: String,
    quantity: Decimal,
    window: Mutex<PriceWindow>,
    estimator: VolatilityEstimator,
    risk: RiskCalculator,
    hedge: HedgePolicy,
    decision: Arc<dyn DecisionSource>,
    sequencer: OrderSequencer,
    notifier: Arc<Notifier>,
    reporter: ErrorReporter,
    cooldown: Duration,
    last_trade: Mutex<Option<Instant>>,
}

impl Engine {
    pub fn new(
        config: &Config,
        sequencer: OrderSequencer,
        decision: Arc<dyn DecisionSource>,
        notifier: Arc<Notifier>,
    ) -> Self {
        let reporter = ErrorReporter::new(ErrorLog::new(&config.error_log), notifier.clone());

        Self {
            symbol: config.trading.symbol.clone(),
            quantity: config.trading.quantity,
            window: Mutex::new(PriceWindow::new(config.risk.window)),
            estimator: VolatilityEstimator::new(config.risk.window),
            risk: RiskCalculator::from_config(&config.risk),
            hedge: HedgePolicy::from_config(&config.risk),
            decision,
            sequencer,
            notifier,
            reporter,
            cooldown: Duration::from_secs(config.strategy.trade_cooldown_secs),
            last_trade: Mutex::new(None),
        }
    }

    /// Pre-fill the price window (e.g. from recent candle closes) so the
    /// estimator is live before `window` ticks have streamed in.
    pub fn seed_window(&self, prices: &[Decimal]) {
        let mut window = self.window.lock();
        for &price in prices {
            window.push(PriceSample::now(price));
        }
        info!(samples = window.len(), "price window seeded");
    }

    /// One pipeline pass for one price sample
    pub async fn process(&self, sample: PriceSample) -> Result<()> {
        let entry_price = sample.price;

        let (estimate, direction) = {
            let mut window = self.window.lock();
            window.push(sample);
            (self.estimator.estimate(&window), self.decision.decide(&window))
        };

        let volatility = match estimate {
            Ok(v) => v,
            Err(BotError::InsufficientData { needed, have }) => {
                debug!(needed, have, "window warming up, skipping cycle");
                return Ok(());
            }
            Err(e) => {
                self.reporter.report("market", &e.to_string()).await;
                return Ok(());
            }
        };

        debug!(%entry_price, %volatility, %direction, "cycle inputs");

        if direction == Direction::Flat {
            return Ok(());
        }

        let params = match self.risk.calculate(entry_price, volatility) {
            Ok(p) => p,
            Err(e) => {
                self.reporter.report("risk", &e.to_string()).await;
                return Ok(());
            }
        };

        if !self.cooldown_elapsed() {
            debug!("within trade cooldown, skipping order placement");
            return Ok(());
        }

        let intent = TradeIntent {
            symbol: self.symbol.clone(),
            direction,
            quantity: self.quantity,
            leverage: params.leverage,
        };

        match self.sequencer.execute(&intent, &params).await {
            Ok(_) => {
                self.mark_traded();
                self.notifier.trade_opened(&intent, &params, entry_price).await;
            }
            Err(e) => {
                // orders already placed stand; only this cycle stops here
                self.reporter.report("executor", &e.to_string()).await;
                return Ok(());
            }
        }

        if let Some(hedge) = self.hedge.hedge_intent(&self.symbol, self.quantity, volatility) {
            let hedge_params = RiskParameters {
                leverage: hedge.leverage,
                ..params
            };
            match self.sequencer.execute(&hedge, &hedge_params).await {
                Ok(_) => {
                    info!(quantity = %hedge.quantity, %volatility, "protective hedge opened");
                }
                Err(e) => {
                    self.reporter.report("hedge", &e.to_string()).await;
                }
            }
        }

        Ok(())
    }

    fn cooldown_elapsed(&self) -> bool {
        if self.cooldown.is_zero() {
            return true;
        }
        match *self.last_trade.lock() {
            None => true,
            Some(at) => at.elapsed() >= self.cooldown,
        }
    }

    fn mark_traded(&self) {
        *self.last_trade.lock() = Some(Instant::now());
    }
}

#[async_trait]
impl TickHandler for Engine {
    async fn on_tick(&self, price: Decimal) -> Result<()> {
        self.process(PriceSample::now(price)).await
    }
}
