//! Momentum rebalancing strategies for the Ronda engine.
//!
//! The execution engine calls a [`RebalanceStrategy`] on its schedule. Each
//! call resolves the ranking window and universe, computes signals, sizes
//! them and returns target-weight instructions. Two families share that
//! contract:
//! - [`CrossSectionalMomentum`]: ranks assets against each other and ladders
//!   equal-weight baskets, each held for `holding_period` rebalances
//! - [`TimeSeriesMomentum`]: trades each asset on its own return with
//!   inverse-volatility weights, replaced every `holding_period` rebalances
//!
//! Per-run bookkeeping lives in [`RunState`], owned by the caller.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ronda_strategy::{MarketData, RunState, StrategyConfig, build_strategy};
//! use ronda_traits::ScheduleEvent;
//!
//! let market = MarketData::new(Arc::new(calendar), Arc::new(store));
//! let strategy = build_strategy(StrategyConfig::cross_sectional(6, 3, 10, 10), market)?;
//! let mut state = RunState::new();
//! let orders = strategy.on_schedule(&mut state, &ctx, ScheduleEvent::Rebalance)?;
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

mod basket;
mod config;
mod cross_sectional;
mod market;
mod strategy;
mod time_series;

#[cfg(test)]
mod testing;

pub use basket::{Basket, BasketLadder, Countdown, LiquidationPolicy, RunState};
pub use config::{DEFAULT_EXCLUDED, Family, MAX_LOOKBACK_MONTHS, StrategyConfig, StrategyKind};
pub use cross_sectional::CrossSectionalMomentum;
pub use market::{MarketData, TIME_SERIES_LOOKBACK_DAYS};
pub use strategy::{RebalanceStrategy, Snapshot, build_strategy};
pub use time_series::TimeSeriesMomentum;
