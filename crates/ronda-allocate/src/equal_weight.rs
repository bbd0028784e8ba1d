//! Equal-weight sizing for cross-sectional baskets.

use ronda_signals::SignalSet;
use ronda_traits::Result;
use serde::{Deserialize, Serialize};

use crate::{RankingSplit, TargetWeights, WeightAllocator};

/// Configuration for equal-weight sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EqualWeightConfig {
    /// Number of top performers to buy.
    pub winners_amount: usize,
    /// Number of bottom performers to sell short.
    pub losers_amount: usize,
    /// Number of cycles each basket stays open.
    pub holding_period: u32,
}

impl Default for EqualWeightConfig {
    fn default() -> Self {
        Self {
            winners_amount: 10,
            losers_amount: 10,
            holding_period: 3,
        }
    }
}

/// Equal-weight allocator for laddered cross-sectional baskets.
///
/// Every member of a basket of size `S` gets `1 / (S * holding_period)` of
/// capital, negative for losers. Up to `holding_period` baskets overlap, so
/// together they approximate full capital deployment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualWeightAllocator {
    config: EqualWeightConfig,
}

impl EqualWeightAllocator {
    /// Create a new equal-weight allocator with the given configuration.
    pub const fn new(config: EqualWeightConfig) -> Self {
        Self { config }
    }

    /// Winners and losers for the ranked signals.
    pub fn split(&self, signals: &SignalSet) -> RankingSplit {
        RankingSplit::from_ranked(
            &signals.ranked(),
            self.config.winners_amount,
            self.config.losers_amount,
        )
    }

    /// Sizes an already computed split.
    pub fn weights_for(&self, split: &RankingSplit) -> TargetWeights {
        if split.is_empty() {
            return TargetWeights::new();
        }
        let magnitude = 1.0 / (split.len() as f64 * f64::from(self.config.holding_period.max(1)));
        split
            .losers
            .iter()
            .map(|(s, _)| (s.clone(), -magnitude))
            .chain(split.winners.iter().map(|(s, _)| (s.clone(), magnitude)))
            .collect()
    }
}

impl WeightAllocator for EqualWeightAllocator {
    fn allocate(&self, signals: &SignalSet) -> Result<TargetWeights> {
        Ok(self.weights_for(&self.split(signals)))
    }

    fn name(&self) -> &str {
        "equal_weight"
    }
}
