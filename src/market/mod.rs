//! Rolling price window and volatility estimation

use crate::error::{BotError, Result};
use crate::types::PriceSample;
use rust_decimal::{Decimal, MathematicalOps};
use std::collections::VecDeque;

/// Bounded ring of the most recent price samples
#[derive(Debug, Clone)]
pub struct PriceWindow {
    capacity: usize,
    samples: VecDeque<PriceSample>,
}

impl PriceWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    /// Push a sample, evicting the oldest once at capacity
    pub fn push(&mut self, sample: PriceSample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&PriceSample> {
        self.samples.back()
    }

    pub fn oldest(&self) -> Option<&PriceSample> {
        self.samples.front()
    }

    pub fn prices(&self) -> impl Iterator<Item = Decimal> + '_ {
        self.samples.iter().map(|s| s.price)
    }
}

/// Volatility as the sample standard deviation of percentage returns
/// over the trailing window
#[derive(Debug, Clone, Copy)]
pub struct VolatilityEstimator {
    window: usize,
}

impl VolatilityEstimator {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Estimate volatility from the trailing `window` samples.
    ///
    /// Fails with `InsufficientData` until the window holds enough samples.
    pub fn estimate(&self, window: &PriceWindow) -> Result<Decimal> {
        if window.len() < self.window {
            return Err(BotError::InsufficientData {
                needed: self.window,
                have: window.len(),
            });
        }

        let prices: Vec<Decimal> = window.prices().collect();
        let tail = &prices[prices.len() - self.window..];

        let mut returns = Vec::with_capacity(self.window - 1);
        for pair in tail.windows(2) {
            let (prev, curr) = (pair[0], pair[1]);
            if prev <= Decimal::ZERO {
                return Err(BotError::InvalidInput(format!(
                    "non-positive price {} in window",
                    prev
                )));
            }
            returns.push((curr - prev) / prev);
        }

        Ok(std_dev(&returns))
    }
}

/// Sample standard deviation (n-1 denominator)
fn std_dev(values: &[Decimal]) -> Decimal {
    let n = values.len();
    if n < 2 {
        return Decimal::ZERO;
    }

    let mean: Decimal = values.iter().sum::<Decimal>() / Decimal::from(n);
    let sum_sq: Decimal = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    let variance = sum_sq / Decimal::from(n - 1);

    variance.sqrt().unwrap_or(Decimal::ZERO)
}
