//! Basket lifecycle.
//!
//! Cross-sectional strategies keep a ladder of baskets: one is opened every
//! rebalance and each is liquidated once it has been held for
//! `holding_period` cycles. Time-series strategies instead keep a single
//! countdown that decides on which rebalances positions are replaced.

use std::collections::BTreeSet;

use ronda_allocate::TargetWeights;
use ronda_traits::Symbol;
use serde::{Deserialize, Serialize};

/// A set of positions opened together and aged as a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Basket {
    positions: TargetWeights,
    age: u32,
}

impl Basket {
    /// Opens a basket at age 1.
    pub const fn open(positions: TargetWeights) -> Self {
        Self { positions, age: 1 }
    }

    /// Target weight per member.
    pub const fn positions(&self) -> &TargetWeights {
        &self.positions
    }

    /// Cycles this basket has been held.
    pub const fn age(&self) -> u32 {
        self.age
    }
}

/// Overlapping baskets of a cross-sectional strategy.
///
/// In steady state a new basket enters exactly as the oldest one exits, so
/// at most `holding_period` baskets are open at once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BasketLadder {
    baskets: Vec<Basket>,
}

impl BasketLadder {
    /// Creates an empty ladder.
    pub const fn new() -> Self {
        Self {
            baskets: Vec::new(),
        }
    }

    /// Advances the ladder by one rebalance and opens `new_basket`.
    ///
    /// Baskets that reached `holding_period` are dropped; the rest age by
    /// one cycle with their weights untouched. Returns the members of the
    /// dropped baskets, in basket order, so the caller can zero them.
    pub fn roll(&mut self, holding_period: u32, new_basket: TargetWeights) -> Vec<Symbol> {
        let (expired, kept): (Vec<Basket>, Vec<Basket>) = std::mem::take(&mut self.baskets)
            .into_iter()
            .partition(|b| b.age >= holding_period);

        self.baskets = kept
            .into_iter()
            .map(|mut b| {
                b.age += 1;
                b
            })
            .collect();
        self.baskets.push(Basket::open(new_basket));

        expired
            .into_iter()
            .flat_map(|b| b.positions.into_iter().map(|(s, _)| s))
            .collect()
    }

    /// Removes `asset` from every open basket, returning whether it was held.
    pub fn force_exit(&mut self, asset: &str) -> bool {
        let mut held = false;
        for basket in &mut self.baskets {
            held |= basket.positions.remove(asset).is_some();
        }
        held
    }

    /// Every asset held by at least one open basket.
    pub fn assets(&self) -> BTreeSet<Symbol> {
        self.baskets
            .iter()
            .flat_map(|b| b.positions.assets().cloned())
            .collect()
    }

    /// Open baskets, oldest first.
    pub fn baskets(&self) -> &[Basket] {
        &self.baskets
    }

    /// Number of open baskets.
    pub fn len(&self) -> usize {
        self.baskets.len()
    }

    /// Whether no basket is open.
    pub fn is_empty(&self) -> bool {
        self.baskets.is_empty()
    }
}

/// When a time-series strategy closes its positions relative to re-entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiquidationPolicy {
    /// Close everything and re-enter inside the same rebalance call.
    #[default]
    SameTick,
    /// Close on the liquidation event that ends the holding period and
    /// re-enter on the following rebalance.
    Trailing,
}

/// Holding-period countdown of a time-series strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Countdown {
    counter: u32,
}

impl Countdown {
    /// Current counter value.
    pub const fn counter(&self) -> u32 {
        self.counter
    }

    /// Whether the next rebalance replaces positions.
    pub const fn is_due(&self) -> bool {
        self.counter == 0
    }

    /// Advances after a rebalance under [`LiquidationPolicy::SameTick`].
    ///
    /// The counter stays in `[0, holding_period)`.
    pub const fn advance_wrapping(&mut self, holding_period: u32) {
        self.counter = (self.counter + 1) % holding_period;
    }

    /// Advances after a rebalance under [`LiquidationPolicy::Trailing`].
    ///
    /// The counter climbs to `holding_period` and waits there for
    /// [`Self::settle`].
    pub const fn advance(&mut self) {
        self.counter += 1;
    }

    /// Handles a liquidation event under [`LiquidationPolicy::Trailing`].
    ///
    /// Resets a counter that reached `holding_period` and reports whether
    /// held positions must be closed now.
    pub const fn settle(&mut self, holding_period: u32) -> bool {
        if self.counter >= holding_period {
            self.counter = 0;
        }
        self.counter == 0
    }
}

/// Mutable state of one strategy run.
///
/// Owned by the caller that drives the strategy and lent to each scheduled
/// call; the strategy itself holds no per-run state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunState {
    /// Laddered baskets (cross-sectional strategies).
    pub ladder: BasketLadder,
    /// Holding countdown (time-series strategies).
    pub countdown: Countdown,
    /// Rebalances processed so far.
    pub rebalances: u64,
}

impl RunState {
    /// Fresh state for a new run.
    pub fn new() -> Self {
        Self::default()
    }
}
