//! Realized volatility.

use ndarray::Array1;
use ronda_traits::stats;
use serde::{Deserialize, Serialize};

/// Selectable realized volatility estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityMethod {
    /// Sample standard deviation of trailing daily percentage changes.
    #[default]
    PctChange,
    /// `sqrt(window * var(log_return))` over the trailing window.
    Log,
}

/// Realized volatility of the last `window` daily returns in `closes`.
///
/// Needs at least `window + 1` closes and `window >= 2`; returns `None`
/// otherwise or when the estimate is not finite.
pub fn realized_volatility(closes: &[f64], window: usize, method: VolatilityMethod) -> Option<f64> {
    if window < 2 || closes.len() < window + 1 {
        return None;
    }
    let tail = &closes[closes.len() - (window + 1)..];
    let vol = match method {
        VolatilityMethod::PctChange => Array1::from_vec(stats::pct_change(tail)).std(1.0),
        VolatilityMethod::Log => {
            let variance = stats::sample_variance(&stats::log_returns(tail))?;
            (window as f64 * variance).sqrt()
        }
    };
    vol.is_finite().then_some(vol)
}
