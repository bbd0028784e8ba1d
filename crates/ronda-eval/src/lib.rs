//! Simulation, analysis and parallel execution for the Ronda engine.
//!
//! This crate provides the collaborators that surround the strategies:
//! - [`Simulator`]: a minimal daily execution engine with monthly
//!   rebalance and liquidation events, filling at the close
//! - [`PerformanceRecord`] and [`PerformanceSummary`]: what a run produced
//!   and its headline figures
//! - [`JsonSink`]: persists each run as `<descriptor>.json`
//! - [`RunDriver`]: runs a batch of strategies on bounded worker pools and
//!   collects one outcome per run
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ronda_eval::{DriverConfig, JsonSink, RunDriver, Simulator, SimulatorConfig};
//!
//! let simulator = Arc::new(Simulator::new(SimulatorConfig::default(), market)?);
//! let sink = Arc::new(JsonSink::new("results"));
//! let driver = RunDriver::new(simulator, sink, DriverConfig::default());
//! let outcomes = driver.run_all(strategies).await;
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

mod driver;
mod metrics;
mod record;
mod simulator;
mod sink;

#[cfg(test)]
mod testing;

pub use driver::{DriverConfig, RunDriver, RunOutcome, RunStatus};
pub use metrics::{PerformanceSummary, TRADING_DAYS_PER_YEAR, max_drawdown, sharpe_ratio};
pub use record::{DailyRecord, PerformanceRecord, Transaction};
pub use simulator::{Simulator, SimulatorConfig, monthly_events};
pub use sink::{JsonSink, RecordSink, RunReport};
