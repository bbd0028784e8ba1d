//! Performance records produced by a completed run.

use std::collections::BTreeMap;

use ronda_traits::{Date, Symbol};
use serde::{Deserialize, Serialize};

/// End-of-day snapshot of the simulated portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Session date.
    pub date: Date,
    /// Cash plus marked value of every position at the close.
    pub portfolio_value: f64,
    /// Simple return over the previous session.
    pub daily_return: f64,
    /// Shares held per asset after the session's orders.
    pub positions: BTreeMap<Symbol, f64>,
}

/// A fill at the session close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Fill date.
    pub date: Date,
    /// Traded asset.
    pub asset: Symbol,
    /// Signed shares (negative sells).
    pub amount: f64,
    /// Fill price.
    pub price: f64,
}

/// Portfolio value, positions and transactions of one run.
///
/// Keyed by the run descriptor and never modified after the run completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    /// `<FAMILY>_<SIDE>_<ranking_period>_<holding_period>`.
    pub descriptor: String,
    /// Starting capital.
    pub capital_base: f64,
    /// One entry per simulated session.
    pub days: Vec<DailyRecord>,
    /// Every fill, in execution order.
    pub transactions: Vec<Transaction>,
}

impl PerformanceRecord {
    /// Daily simple returns.
    pub fn returns(&self) -> Vec<f64> {
        self.days.iter().map(|d| d.daily_return).collect()
    }

    /// Cumulative return at each session close.
    pub fn cumulative_returns(&self) -> Vec<f64> {
        self.days
            .iter()
            .map(|d| d.portfolio_value / self.capital_base - 1.0)
            .collect()
    }

    /// Portfolio value after the last session.
    pub fn final_value(&self) -> f64 {
        self.days
            .last()
            .map_or(self.capital_base, |d| d.portfolio_value)
    }

    /// First simulated session.
    pub fn start(&self) -> Option<Date> {
        self.days.first().map(|d| d.date)
    }

    /// Last simulated session.
    pub fn end(&self) -> Option<Date> {
        self.days.last().map(|d| d.date)
    }
}
