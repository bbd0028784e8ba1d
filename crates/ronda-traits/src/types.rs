//! Common types used throughout the Ronda framework.
//!
//! This module defines the price containers handed between the execution
//! engine, the market-data store and the signal computations, together with
//! the weight instructions a strategy emits.

use std::collections::BTreeMap;

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{Result, RondaError};

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// A market symbol identifier, typically an exchange ticker such as "SBER".
pub type Symbol = String;

/// Ordered close prices for a single asset.
///
/// Dates are strictly increasing; duplicates are rejected on construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: Symbol,
    points: Vec<(Date, f64)>,
}

impl PriceSeries {
    /// Creates a series, validating that dates strictly increase.
    pub fn new(symbol: impl Into<Symbol>, points: Vec<(Date, f64)>) -> Result<Self> {
        let symbol = symbol.into();
        if let Some(pair) = points.windows(2).find(|w| w[0].0 >= w[1].0) {
            return Err(RondaError::InvalidData(format!(
                "{symbol}: dates must strictly increase ({} then {})",
                pair[0].0, pair[1].0
            )));
        }
        Ok(Self { symbol, points })
    }

    /// The asset this series belongs to.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// All `(date, close)` observations in date order.
    pub fn points(&self) -> &[(Date, f64)] {
        &self.points
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no observations.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Close on exactly `date`, if observed.
    pub fn close_on(&self, date: Date) -> Option<f64> {
        self.points
            .binary_search_by(|(d, _)| d.cmp(&date))
            .ok()
            .map(|i| self.points[i].1)
    }

    /// Whether at least one observation falls inside `[first, last]`.
    pub fn observed_between(&self, first: Date, last: Date) -> bool {
        let idx = self.points.partition_point(|(d, _)| *d < first);
        self.points.get(idx).is_some_and(|(d, _)| *d <= last)
    }

    /// Sub-series restricted to `[first, last]`.
    pub fn slice(&self, first: Date, last: Date) -> Self {
        let points = self
            .points
            .iter()
            .filter(|(d, _)| *d >= first && *d <= last)
            .copied()
            .collect();
        Self {
            symbol: self.symbol.clone(),
            points,
        }
    }
}

/// A session-indexed matrix of close prices (one column per asset).
///
/// `PriceHistory` is what the execution engine returns from its `history`
/// query: rows are trading sessions in ascending order, columns are assets,
/// and a null cell marks a session without a recorded close. The prices live
/// in a Polars DataFrame; the session index is kept alongside it.
#[derive(Debug, Clone)]
pub struct PriceHistory {
    sessions: Vec<Date>,
    frame: DataFrame,
}

impl PriceHistory {
    /// Wraps an existing frame of `Float64` columns indexed by `sessions`.
    pub fn new(sessions: Vec<Date>, frame: DataFrame) -> Result<Self> {
        if sessions.windows(2).any(|w| w[0] >= w[1]) {
            return Err(RondaError::InvalidData(
                "history sessions must strictly increase".to_string(),
            ));
        }
        if frame.width() > 0 && frame.height() != sessions.len() {
            return Err(RondaError::InvalidData(format!(
                "history has {} rows for {} sessions",
                frame.height(),
                sessions.len()
            )));
        }
        Ok(Self { sessions, frame })
    }

    /// Builds a history from per-asset close columns aligned with `sessions`.
    ///
    /// Non-finite prices are stored as nulls.
    pub fn from_columns(
        sessions: Vec<Date>,
        columns: BTreeMap<Symbol, Vec<Option<f64>>>,
    ) -> Result<Self> {
        let mut cols = Vec::with_capacity(columns.len());
        for (symbol, values) in columns {
            if values.len() != sessions.len() {
                return Err(RondaError::InvalidData(format!(
                    "{symbol}: {} closes for {} sessions",
                    values.len(),
                    sessions.len()
                )));
            }
            let values: Vec<Option<f64>> = values
                .into_iter()
                .map(|v| v.filter(|p| p.is_finite()))
                .collect();
            cols.push(Column::from(Series::new(
                PlSmallStr::from(symbol.as_str()),
                &values,
            )));
        }
        Self::new(sessions, DataFrame::new(cols)?)
    }

    /// Trading sessions indexing the rows.
    pub fn sessions(&self) -> &[Date] {
        &self.sessions
    }

    /// Assets present as columns.
    pub fn symbols(&self) -> Vec<Symbol> {
        self.frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Closes for `symbol`, one entry per session.
    pub fn closes(&self, symbol: &str) -> Result<Vec<Option<f64>>> {
        let column = self
            .frame
            .column(symbol)
            .map_err(|_| RondaError::SymbolNotFound(symbol.to_string()))?;
        Ok(column.as_materialized_series().f64()?.into_iter().collect())
    }

    /// Restricts rows to `sessions`; sessions absent from this history become nulls.
    pub fn reindex(&self, sessions: &[Date]) -> Result<Self> {
        let rows: Vec<Option<usize>> = sessions
            .iter()
            .map(|d| self.sessions.binary_search(d).ok())
            .collect();
        let mut columns = BTreeMap::new();
        for symbol in self.symbols() {
            let closes = self.closes(&symbol)?;
            let aligned = rows
                .iter()
                .map(|row| row.and_then(|r| closes[r]))
                .collect();
            columns.insert(symbol, aligned);
        }
        Self::from_columns(sessions.to_vec(), columns)
    }

    /// Drops every asset with at least one missing close.
    pub fn complete(&self) -> Result<Self> {
        let kept: Vec<Column> = self
            .frame
            .get_columns()
            .iter()
            .filter(|c| c.as_materialized_series().null_count() == 0)
            .cloned()
            .collect();
        Self::new(self.sessions.clone(), DataFrame::new(kept)?)
    }

    /// Number of sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the history holds no sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// An `order_target_percent` instruction: hold `weight` of portfolio value in `asset`.
///
/// A weight of zero liquidates the position; negative weights are shorts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightInstruction {
    /// Target asset.
    pub asset: Symbol,
    /// Target fraction of portfolio value.
    pub weight: f64,
}

impl WeightInstruction {
    /// Creates a target-weight instruction.
    pub fn new(asset: impl Into<Symbol>, weight: f64) -> Self {
        Self {
            asset: asset.into(),
            weight,
        }
    }

    /// Creates a liquidation instruction.
    pub fn liquidate(asset: impl Into<Symbol>) -> Self {
        Self::new(asset, 0.0)
    }

    /// Whether this instruction closes the position.
    pub fn is_liquidation(&self) -> bool {
        self.weight == 0.0
    }
}

/// An open position as reported by the execution engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Signed number of shares held.
    pub amount: f64,
    /// Last close used to value the position.
    pub last_price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> Date {
        Date::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_price_series_rejects_duplicates() {
        let result = PriceSeries::new("SBER", vec![(d(2), 1.0), (d(2), 1.1)]);
        assert!(matches!(result, Err(RondaError::InvalidData(_))));
    }

    #[test]
    fn test_price_series_lookups() {
        let series = PriceSeries::new("SBER", vec![(d(2), 1.0), (d(4), 2.0), (d(8), 3.0)]).unwrap();
        assert_eq!(series.close_on(d(4)), Some(2.0));
        assert_eq!(series.close_on(d(5)), None);
        assert!(series.observed_between(d(3), d(4)));
        assert!(!series.observed_between(d(5), d(7)));
        assert_eq!(series.slice(d(3), d(8)).len(), 2);
    }

    #[test]
    fn test_history_from_columns() {
        let mut columns = BTreeMap::new();
        columns.insert("A".to_string(), vec![Some(1.0), Some(2.0)]);
        columns.insert("B".to_string(), vec![None, Some(f64::NAN)]);
        let history = PriceHistory::from_columns(vec![d(2), d(3)], columns).unwrap();

        assert_eq!(history.symbols(), vec!["A".to_string(), "B".to_string()]);
        assert_eq!(history.closes("A").unwrap(), vec![Some(1.0), Some(2.0)]);
        assert_eq!(history.closes("B").unwrap(), vec![None, None]);
        assert!(history.closes("C").is_err());
    }

    #[test]
    fn test_history_complete_drops_gappy_assets() {
        let mut columns = BTreeMap::new();
        columns.insert("A".to_string(), vec![Some(1.0), Some(2.0), Some(3.0)]);
        columns.insert("B".to_string(), vec![Some(1.0), None, Some(3.0)]);
        let history = PriceHistory::from_columns(vec![d(2), d(3), d(4)], columns).unwrap();

        let complete = history.complete().unwrap();
        assert_eq!(complete.symbols(), vec!["A".to_string()]);
        assert_eq!(complete.len(), 3);
    }

    #[test]
    fn test_history_reindex() {
        let mut columns = BTreeMap::new();
        columns.insert("A".to_string(), vec![Some(1.0), Some(2.0), Some(3.0)]);
        let history = PriceHistory::from_columns(vec![d(2), d(3), d(4)], columns).unwrap();

        let window = history.reindex(&[d(3), d(4), d(5)]).unwrap();
        assert_eq!(window.sessions(), &[d(3), d(4), d(5)]);
        assert_eq!(window.closes("A").unwrap(), vec![Some(2.0), Some(3.0), None]);
    }

    #[test]
    fn test_history_rejects_misaligned_columns() {
        let mut columns = BTreeMap::new();
        columns.insert("A".to_string(), vec![Some(1.0)]);
        assert!(PriceHistory::from_columns(vec![d(2), d(3)], columns).is_err());
    }

    #[test]
    fn test_weight_instruction() {
        let order = WeightInstruction::liquidate("GAZP");
        assert!(order.is_liquidation());
        assert!(!WeightInstruction::new("GAZP", -0.1).is_liquidation());
    }
}
