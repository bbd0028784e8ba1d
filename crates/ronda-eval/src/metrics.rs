//! Summary statistics of a completed run.

use ronda_traits::stats::{MIN_STD_THRESHOLD, mean, sample_std};
use serde::{Deserialize, Serialize};

use crate::PerformanceRecord;

/// Sessions per year used for annualization.
pub const TRADING_DAYS_PER_YEAR: usize = 252;

/// Headline performance figures of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    /// Run descriptor.
    pub descriptor: String,
    /// Final value over capital base, minus one.
    pub total_return: f64,
    /// Geometric annual return.
    pub annualized_return: Option<f64>,
    /// Sample volatility of daily returns, annualized.
    pub annualized_volatility: Option<f64>,
    /// Annualized Sharpe ratio at a zero risk-free rate.
    pub sharpe_ratio: Option<f64>,
    /// Largest peak-to-trough loss of portfolio value.
    pub max_drawdown: f64,
    /// Simulated sessions.
    pub trading_days: usize,
    /// Number of fills.
    pub transactions: usize,
}

impl PerformanceSummary {
    /// Computes the summary of `record`.
    pub fn from_record(record: &PerformanceRecord) -> Self {
        let returns = record.returns();
        let total_return = record.final_value() / record.capital_base - 1.0;
        let trading_days = record.days.len();

        let annualized_return = (trading_days > 0).then(|| {
            let years = trading_days as f64 / TRADING_DAYS_PER_YEAR as f64;
            (1.0 + total_return).powf(1.0 / years) - 1.0
        });
        let annualized_volatility =
            sample_std(&returns).map(|std| std * (TRADING_DAYS_PER_YEAR as f64).sqrt());

        Self {
            descriptor: record.descriptor.clone(),
            total_return,
            annualized_return: annualized_return.filter(|r| r.is_finite()),
            annualized_volatility,
            sharpe_ratio: sharpe_ratio(&returns, TRADING_DAYS_PER_YEAR),
            max_drawdown: max_drawdown(&record.cumulative_returns()),
            trading_days,
            transactions: record.transactions.len(),
        }
    }
}

/// Annualized Sharpe ratio of periodic returns.
///
/// Non-finite returns are ignored. `None` with fewer than two returns or a
/// flat series.
pub fn sharpe_ratio(returns: &[f64], periods_per_year: usize) -> Option<f64> {
    let valid: Vec<f64> = returns.iter().copied().filter(|x| x.is_finite()).collect();
    let std = sample_std(&valid)?;
    if std < MIN_STD_THRESHOLD {
        return None;
    }
    Some(mean(&valid)? / std * (periods_per_year as f64).sqrt())
}

/// Maximum drawdown of a cumulative-return path, as a fraction of the peak.
pub fn max_drawdown(cumulative_returns: &[f64]) -> f64 {
    let mut max_dd: f64 = 0.0;
    let mut peak: f64 = 0.0;

    for &cum_ret in cumulative_returns {
        peak = peak.max(cum_ret);
        max_dd = max_dd.max((peak - cum_ret) / (1.0 + peak));
    }

    max_dd
}
