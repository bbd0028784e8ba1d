//! Per-rebalance signal computation.

use std::collections::BTreeMap;

use ronda_traits::{Date, PriceHistory, Result, Symbol};
use serde::{Deserialize, Serialize};

use crate::{RankingWindow, ReturnMethod, VolatilityMethod, realized_volatility};

/// Configuration for the signal computer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalConfig {
    /// Window return algorithm.
    pub return_method: ReturnMethod,
    /// Realized volatility estimator.
    pub volatility_method: VolatilityMethod,
    /// Number of trailing daily returns in the volatility estimate.
    pub volatility_window: usize,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            return_method: ReturnMethod::PointToPoint,
            volatility_method: VolatilityMethod::PctChange,
            volatility_window: 242,
        }
    }
}

/// Signals produced for a single rebalance date.
///
/// Values are only meaningful for the rebalance that produced them and are
/// never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalSet {
    /// Window return per asset.
    pub returns: BTreeMap<Symbol, f64>,
    /// Realized volatility per asset (only filled by volatility-aware strategies).
    pub volatility: BTreeMap<Symbol, f64>,
}

impl SignalSet {
    /// Returns sorted ascending, ties broken by symbol.
    pub fn ranked(&self) -> Vec<(Symbol, f64)> {
        let mut ranked: Vec<(Symbol, f64)> =
            self.returns.iter().map(|(s, r)| (s.clone(), *r)).collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }

    /// Whether no asset produced a return.
    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }
}

/// Computes window returns and realized volatility from a price history.
///
/// Assets with any missing close in the history handed in are skipped,
/// so callers restrict the history to the span that must be gap-free.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalComputer {
    config: SignalConfig,
}

impl SignalComputer {
    /// Create a new signal computer with the given configuration.
    pub const fn new(config: SignalConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub const fn config(&self) -> &SignalConfig {
        &self.config
    }

    /// Window returns for every complete asset of `history`.
    pub fn returns(
        &self,
        history: &PriceHistory,
        window: &RankingWindow,
    ) -> Result<BTreeMap<Symbol, f64>> {
        self.returns_between(history, window.first_date(), window.last_date())
    }

    /// Returns over `[first, last]` for every complete asset of `history`.
    pub fn returns_between(
        &self,
        history: &PriceHistory,
        first: Date,
        last: Date,
    ) -> Result<BTreeMap<Symbol, f64>> {
        let mut returns = BTreeMap::new();
        for symbol in history.symbols() {
            let Some(closes) = complete_closes(history, &symbol)? else {
                continue;
            };
            if let Some(r) =
                self.config
                    .return_method
                    .window_return(history.sessions(), &closes, first, last)
            {
                returns.insert(symbol, r);
            }
        }
        Ok(returns)
    }

    /// Realized volatility for every complete asset of `history`.
    ///
    /// Assets with too short a history are skipped; zero volatility is kept
    /// and left for the allocator to exclude.
    pub fn volatility(&self, history: &PriceHistory) -> Result<BTreeMap<Symbol, f64>> {
        let mut vols = BTreeMap::new();
        for symbol in history.symbols() {
            let Some(closes) = complete_closes(history, &symbol)? else {
                continue;
            };
            if let Some(vol) = realized_volatility(
                &closes,
                self.config.volatility_window,
                self.config.volatility_method,
            ) {
                vols.insert(symbol, vol);
            }
        }
        Ok(vols)
    }
}

fn complete_closes(history: &PriceHistory, symbol: &str) -> Result<Option<Vec<f64>>> {
    Ok(history.closes(symbol)?.into_iter().collect())
}
