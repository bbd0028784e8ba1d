//! In-memory market-data store.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;

use ronda_traits::{Date, MarketDataStore, PriceSeries, Result, RondaError, Symbol};
use serde::Deserialize;
use tracing::debug;

/// One row of a long-format price file (`date,symbol,close`).
#[derive(Debug, Deserialize)]
struct PriceRow {
    date: Date,
    symbol: Symbol,
    close: f64,
}

/// Market-data store holding every series in memory.
///
/// Loaded once and shared read-only between concurrent runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    series: BTreeMap<Symbol, PriceSeries>,
}

impl InMemoryStore {
    /// Builds a store from already validated series.
    pub fn from_series(series: impl IntoIterator<Item = PriceSeries>) -> Self {
        Self {
            series: series
                .into_iter()
                .map(|s| (s.symbol().to_string(), s))
                .collect(),
        }
    }

    /// Loads a long-format CSV with a `date,symbol,close` header.
    ///
    /// Rows may come in any order; duplicate `(symbol, date)` pairs and
    /// non-positive closes are rejected.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut grouped: BTreeMap<Symbol, Vec<(Date, f64)>> = BTreeMap::new();
        let mut rdr = csv::Reader::from_reader(reader);
        for row in rdr.deserialize() {
            let row: PriceRow = row?;
            if !(row.close.is_finite() && row.close > 0.0) {
                return Err(RondaError::InvalidData(format!(
                    "{} on {}: close must be positive, got {}",
                    row.symbol, row.date, row.close
                )));
            }
            grouped
                .entry(row.symbol)
                .or_default()
                .push((row.date, row.close));
        }

        let mut series = Vec::with_capacity(grouped.len());
        for (symbol, mut points) in grouped {
            points.sort_by_key(|(d, _)| *d);
            series.push(PriceSeries::new(symbol, points)?);
        }
        debug!(assets = series.len(), "loaded price store");
        Ok(Self::from_series(series))
    }

    /// Loads a long-format CSV file from disk.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_csv_reader(file)
    }

    /// Full series of `symbol`, if known.
    pub fn series(&self, symbol: &str) -> Option<&PriceSeries> {
        self.series.get(symbol)
    }

    /// Number of assets held.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Whether the store holds no assets.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl MarketDataStore for InMemoryStore {
    fn available_assets(
        &self,
        first_date: Option<Date>,
        last_date: Option<Date>,
    ) -> Result<BTreeSet<Symbol>> {
        if let (Some(start), Some(end)) = (first_date, last_date) {
            if start > end {
                return Err(RondaError::InvalidRange { start, end });
            }
        }
        let first = first_date.unwrap_or(Date::MIN);
        let last = last_date.unwrap_or(Date::MAX);
        Ok(self
            .series
            .values()
            .filter(|s| s.observed_between(first, last))
            .map(|s| s.symbol().to_string())
            .collect())
    }

    fn price_history(
        &self,
        symbol: &str,
        first_date: Date,
        last_date: Date,
    ) -> Result<PriceSeries> {
        if first_date > last_date {
            return Err(RondaError::InvalidRange {
                start: first_date,
                end: last_date,
            });
        }
        self.series
            .get(symbol)
            .map(|s| s.slice(first_date, last_date))
            .ok_or_else(|| RondaError::SymbolNotFound(symbol.to_string()))
    }
}
