//! Monte Carlo price projection
//!
//! Resamples historical daily returns into multiplicative price paths and
//! summarizes the terminal distribution as a risk report.

use crate::error::{BotError, Result};
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Minimum price history: two returns for a spread estimate
const MIN_HISTORY: usize = 3;

/// Terminal-distribution summary of the simulated paths
#[derive(Debug, Clone, PartialEq)]
pub struct RiskReport {
    pub expected_price: Decimal,
    /// 5th percentile of terminal prices
    pub lower_bound: Decimal,
    /// 95th percentile of terminal prices
    pub upper_bound: Decimal,
    /// Loss vs the current price at the 5th percentile, floored at zero
    pub var_95: Decimal,
}

#[derive(Debug, Clone, Copy)]
pub struct MonteCarlo {
    num_paths: usize,
    horizon: usize,
}

impl MonteCarlo {
    pub fn new(num_paths: usize, horizon: usize) -> Self {
        Self { num_paths, horizon }
    }

    /// Simulate forward paths from a price history (oldest first)
    pub fn simulate(&self, prices: &[Decimal], rng: &mut impl Rng) -> Result<RiskReport> {
        if prices.len() < MIN_HISTORY {
            return Err(BotError::InsufficientData {
                needed: MIN_HISTORY,
                have: prices.len(),
            });
        }

        let series: Vec<f64> = prices.iter().filter_map(|p| p.to_f64()).collect();
        let returns: Vec<f64> = series
            .windows(2)
            .filter(|pair| pair[0] > 0.0)
            .map(|pair| (pair[1] - pair[0]) / pair[0])
            .collect();

        if returns.len() < 2 {
            return Err(BotError::InvalidInput(
                "price history has no usable returns".into(),
            ));
        }

        let mean = returns.iter().sum::<f64>() / returns.len() as f64;
        let variance = returns
            .iter()
            .map(|r| (r - mean).powi(2))
            .sum::<f64>()
            / (returns.len() - 1) as f64;
        let std = variance.sqrt();

        let last = *series.last().unwrap_or(&0.0);

        let mut finals: Vec<f64> = (0..self.num_paths)
            .map(|_| {
                let mut price = last;
                for _ in 0..self.horizon {
                    price *= 1.0 + normal_sample(rng, mean, std);
                }
                price
            })
            .collect();
        finals.sort_by(|a, b| a.total_cmp(b));

        let expected = finals.iter().sum::<f64>() / finals.len() as f64;
        let lower = percentile(&finals, 0.05);
        let upper = percentile(&finals, 0.95);

        Ok(RiskReport {
            expected_price: to_money(expected),
            lower_bound: to_money(lower),
            upper_bound: to_money(upper),
            var_95: to_money((last - lower).max(0.0)),
        })
    }
}

/// Box-Muller draw from N(mean, std)
fn normal_sample(rng: &mut impl Rng, mean: f64, std: f64) -> f64 {
    let u1: f64 = rng.random::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.random::<f64>();
    let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
    mean + std * z
}

/// Empirical percentile over a sorted slice
fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = q * (sorted.len() - 1) as f64;
    let low = rank.floor() as usize;
    let high = rank.ceil() as usize;
    if low == high {
        return sorted[low];
    }
    let weight = rank - low as f64;
    sorted[low] * (1.0 - weight) + sorted[high] * weight
}

fn to_money(value: f64) -> Decimal {
    Decimal::from_f64_retain(value)
        .unwrap_or_default()
        .round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal_macros::dec;

    #[test]
    fn test_insufficient_history() {
        let mc = MonteCarlo::new(100, 10);
        let mut rng = StdRng::seed_from_u64(7);

        let err = mc.simulate(&[dec!(100), dec!(101)], &mut rng).unwrap_err();
        assert!(matches!(err, BotError::InsufficientData { needed: 3, .. }));
    }

    #[test]
    fn test_zero_spread_is_deterministic() {
        // identical returns -> zero std -> every path is the same
        let mc = MonteCarlo::new(50, 10);
        let mut rng = StdRng::seed_from_u64(7);

        let report = mc
            .simulate(&[dec!(100), dec!(101), dec!(102.01)], &mut rng)
            .unwrap();

        assert_eq!(report.lower_bound, report.upper_bound);
        assert_eq!(report.expected_price, report.lower_bound);
        // 1% drift compounds upward from 102.01
        assert!(report.expected_price > dec!(102.01));
        assert_eq!(report.var_95, dec!(0));
    }

    #[test]
    fn test_seeded_run_is_reproducible() {
        let mc = MonteCarlo::new(200, 20);
        let history = [dec!(100), dec!(103), dec!(99), dec!(104), dec!(101)];

        let a = mc
            .simulate(&history, &mut StdRng::seed_from_u64(42))
            .unwrap();
        let b = mc
            .simulate(&history, &mut StdRng::seed_from_u64(42))
            .unwrap();

        assert_eq!(a, b);
        assert!(a.lower_bound <= a.expected_price);
        assert!(a.expected_price <= a.upper_bound);
    }

    #[test]
    fn test_var_reflects_downside() {
        let mc = MonteCarlo::new(500, 10);
        let history = [dec!(100), dec!(110), dec!(95), dec!(105), dec!(98)];

        let report = mc
            .simulate(&history, &mut StdRng::seed_from_u64(1))
            .unwrap();

        // volatile history: the 5th percentile lands below the last price
        assert!(report.lower_bound < dec!(98));
        assert!(report.var_95 > dec!(0));
    }
}
