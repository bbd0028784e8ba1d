#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ronda/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use ronda::prelude::*;
//! use ronda::universe::{InMemoryStore, WeekdayCalendar};
//!
//! let store = Arc::new(InMemoryStore::from_csv_path("data/prices.csv")?);
//! let market = MarketData::new(Arc::new(WeekdayCalendar::default()), store);
//!
//! let strategy = build_strategy(StrategyConfig::cross_sectional(6, 3, 10, 10), market.clone())?;
//! let simulator = Simulator::new(SimulatorConfig::default(), market)?;
//! let record = simulator.run(strategy.as_ref())?;
//! println!("{:?}", PerformanceSummary::from_record(&record));
//! ```
//!
//! ## Crate Organization
//!
//! - [`traits`] - Error type, price containers and collaborator seams
//! - [`universe`] - Calendar, market-data store, universe filter, membership
//! - [`signals`] - Window returns and realized volatility
//! - [`allocate`] - Ranking split and position sizing
//! - [`strategy`] - Configuration, basket lifecycle and strategy facades
//! - [`eval`] - Simulator, metrics, persistence and parallel run driver
//!
//! ## Data Flow
//!
//! On each scheduled rebalance the execution engine calls the strategy,
//! which:
//!
//! 1. resolves the ranking window through the calendar
//! 2. resolves the tradable universe (exclusions, point-in-time membership)
//! 3. computes window returns (and volatility for time-series momentum)
//! 4. sizes positions and updates the open baskets
//! 5. returns target-weight instructions to the engine

/// Version information for the ronda crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Core Types
// ============================================================================

/// Core types and collaborator seams.
///
/// ```ignore
/// use ronda::traits::{ExecutionContext, MarketDataStore, TradingCalendar};
/// ```
pub mod traits {
    pub use ronda_traits::*;
}

pub use ronda_traits::{Date, Result, RondaError, Symbol, WeightInstruction};

// ============================================================================
// Universe
// ============================================================================

/// Calendar service, market-data store and universe filtering.
pub mod universe {
    pub use ronda_universe::*;
}

// ============================================================================
// Signals
// ============================================================================

/// Signal computation.
///
/// Point-to-point and compounded window returns are distinct algorithms;
/// they diverge whenever the compounding reaches the session before the
/// window.
pub mod signals {
    pub use ronda_signals::*;
}

// ============================================================================
// Sizing
// ============================================================================

/// Ranking split, equal-weight and volatility-scaled sizing.
pub mod allocate {
    pub use ronda_allocate::*;
}

// ============================================================================
// Strategies
// ============================================================================

/// Strategy configuration, basket lifecycle and facades.
pub mod strategy {
    pub use ronda_strategy::*;
}

pub use ronda_strategy::{RebalanceStrategy, StrategyConfig, build_strategy};

// ============================================================================
// Evaluation
// ============================================================================

/// Simulation, analysis and the parallel run driver.
pub mod eval {
    pub use ronda_eval::*;
}

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```ignore
/// use ronda::prelude::*;
/// ```
pub mod prelude {
    pub use ronda_eval::{
        DriverConfig, JsonSink, PerformanceRecord, PerformanceSummary, RunDriver, RunOutcome,
        RunStatus, Simulator, SimulatorConfig,
    };
    pub use ronda_strategy::{
        LiquidationPolicy, MarketData, RebalanceStrategy, RunState, StrategyConfig, StrategyKind,
        build_strategy,
    };
    pub use ronda_traits::{
        Date, ExecutionContext, MarketDataStore, Result, RondaError, ScheduleEvent, Symbol,
        TradingCalendar, WeightInstruction,
    };
}
