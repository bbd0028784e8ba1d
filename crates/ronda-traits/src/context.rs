//! Execution engine seam.
//!
//! The execution engine drives simulated days and calls a strategy on its
//! schedule. During such a call the strategy sees the engine only through
//! [`ExecutionContext`]: a per-day view offering price history, tradability
//! and current positions. Orders flow back as returned
//! [`crate::WeightInstruction`]s rather than as calls into the engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Date, Position, PriceHistory, Result, Symbol};

/// Scheduled callback kinds raised by the execution engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScheduleEvent {
    /// Recompute signals and emit target weights (first session of a month).
    Rebalance,
    /// Close positions whose holding period ended (last session of a month).
    Liquidate,
}

/// Per-day data access offered by the execution engine.
pub trait ExecutionContext {
    /// Current simulated session.
    fn current_date(&self) -> Date;

    /// Daily closes of `assets` over the last `bar_count` sessions ending today.
    ///
    /// Assets without a recorded close on a session get a null cell.
    fn history(&self, assets: &[Symbol], bar_count: usize) -> Result<PriceHistory>;

    /// Whether `asset` can be traded today.
    fn can_trade(&self, asset: &str) -> bool;

    /// Currently open positions keyed by asset.
    fn positions(&self) -> BTreeMap<Symbol, Position>;
}
