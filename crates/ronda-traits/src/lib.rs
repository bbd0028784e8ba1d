#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ronda/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types and collaborator seams for the Ronda momentum engine.
//!
//! The rebalancing engine talks to three external collaborators: a trading
//! calendar, a market-data store and the execution engine that drives the
//! simulation. This crate defines those seams as traits, together with the
//! shared error type and price containers.

/// The version of the ronda-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod calendar;
pub mod context;
pub mod error;
pub mod stats;
pub mod store;
pub mod types;

// Re-exports
pub use calendar::TradingCalendar;
pub use context::{ExecutionContext, ScheduleEvent};
pub use error::{Result, RondaError};
pub use store::MarketDataStore;
pub use types::{Date, Position, PriceHistory, PriceSeries, Symbol, WeightInstruction};
