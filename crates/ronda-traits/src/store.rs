//! Market-data store seam.

use std::collections::BTreeSet;

use crate::{Date, PriceSeries, Result, Symbol};

/// Read-only access to recorded price history.
///
/// One store is shared by every run in a parameter sweep, so implementations
/// must tolerate concurrent reads.
pub trait MarketDataStore: Send + Sync {
    /// Assets with at least one observation inside `[first_date, last_date]`.
    ///
    /// With both bounds omitted this is every asset ever observed. A single
    /// bound leaves the other side of the range open.
    fn available_assets(
        &self,
        first_date: Option<Date>,
        last_date: Option<Date>,
    ) -> Result<BTreeSet<Symbol>>;

    /// Close prices of `symbol` inside `[first_date, last_date]`.
    fn price_history(&self, symbol: &str, first_date: Date, last_date: Date) -> Result<PriceSeries>;
}
