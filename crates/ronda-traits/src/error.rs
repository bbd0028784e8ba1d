//! Error types for the Ronda framework.
//!
//! Missing prices, zero volatility and empty baskets are not errors in Ronda:
//! they narrow the universe silently. The variants below cover the failures that
//! must reach the caller, such as invalid date ranges and broken data sources.

use crate::Date;
use thiserror::Error;

/// The main error type for Ronda operations.
#[derive(Debug, Error)]
pub enum RondaError {
    /// A date range whose start lies after its end.
    #[error("Invalid range: start {start} is after end {end}")]
    InvalidRange {
        /// First date of the requested range.
        start: Date,
        /// Last date of the requested range.
        end: Date,
    },

    /// The calendar service does not know the requested exchange calendar.
    #[error("Unknown trading calendar: {0}")]
    UnknownCalendar(String),

    /// Strategy or grid configuration that violates an invariant.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error due to invalid or malformed data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Error when a symbol is not known to the market-data store.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// Error fetching data from the market-data store or calendar service.
    #[error("Data fetch error: {0}")]
    DataFetch(String),

    /// A backtest run failed inside the run driver.
    #[error("Run {descriptor} failed: {reason}")]
    Run {
        /// Descriptor of the failed run.
        descriptor: String,
        /// Human readable failure reason.
        reason: String,
    },

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// I/O failure while reading inputs or persisting results.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV input.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),
}

impl From<String> for RondaError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for RondaError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

/// A specialized Result type for Ronda operations.
pub type Result<T> = std::result::Result<T, RondaError>;
