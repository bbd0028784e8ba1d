//! Rebalance strategy seam.

use std::sync::Arc;

use ronda_allocate::TargetWeights;
use ronda_signals::{RankingWindow, SignalSet};
use ronda_traits::{ExecutionContext, Result, ScheduleEvent, WeightInstruction};
use ronda_universe::ResolvedUniverse;

use crate::{
    CrossSectionalMomentum, Family, MarketData, RunState, StrategyConfig, TimeSeriesMomentum,
};

/// Everything a rebalance computed before sizing.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Resolved ranking window.
    pub window: RankingWindow,
    /// Universe eligible on this rebalance.
    pub universe: ResolvedUniverse,
    /// Per-asset signals of the complete assets.
    pub signals: SignalSet,
}

/// A momentum strategy invoked by the execution engine on its schedule.
///
/// Implementations hold only their immutable configuration and read-only
/// service handles. Per-run state lives in a [`RunState`] the caller owns
/// and lends to [`RebalanceStrategy::on_schedule`], so calling it twice
/// with equal state and context yields equal instructions.
///
/// # Example
///
/// ```ignore
/// use ronda_strategy::{RebalanceStrategy, RunState, StrategyConfig, build_strategy};
/// use ronda_traits::ScheduleEvent;
///
/// let strategy = build_strategy(StrategyConfig::default(), market)?;
/// let mut state = RunState::new();
/// let orders = strategy.on_schedule(&mut state, &ctx, ScheduleEvent::Rebalance)?;
/// ```
pub trait RebalanceStrategy: Send + Sync {
    /// Configuration of this strategy.
    fn config(&self) -> &StrategyConfig;

    /// Persistence key of runs of this strategy.
    fn descriptor(&self) -> String {
        self.config().descriptor()
    }

    /// Resolves the window and universe and computes signals for today.
    ///
    /// Returns `Ok(None)` when the ranking window holds no session.
    ///
    /// # Errors
    ///
    /// Calendar, store and engine failures propagate unchanged.
    fn compute_signal(&self, ctx: &dyn ExecutionContext) -> Result<Option<Snapshot>>;

    /// Sizes the signals of one rebalance into target weights.
    fn compute_weights(&self, signals: &SignalSet) -> Result<TargetWeights>;

    /// Handles one scheduled event and returns the orders to place.
    fn on_schedule(
        &self,
        state: &mut RunState,
        ctx: &dyn ExecutionContext,
        event: ScheduleEvent,
    ) -> Result<Vec<WeightInstruction>>;
}

/// Builds the facade matching `config`'s family.
///
/// # Errors
///
/// Fails when the configuration does not validate.
pub fn build_strategy(
    config: StrategyConfig,
    market: MarketData,
) -> Result<Arc<dyn RebalanceStrategy>> {
    Ok(match config.family() {
        Family::CrossSectional => Arc::new(CrossSectionalMomentum::new(config, market)?),
        Family::TimeSeries => Arc::new(TimeSeriesMomentum::new(config, market)?),
    })
}
