//! Cross-sectional momentum with laddered equal-weight baskets.

use std::collections::BTreeSet;

use ronda_allocate::{EqualWeightAllocator, EqualWeightConfig, TargetWeights, WeightAllocator};
use ronda_signals::{SignalComputer, SignalConfig, SignalSet};
use ronda_traits::{ExecutionContext, Result, RondaError, ScheduleEvent, Symbol, WeightInstruction};
use ronda_universe::UniverseFilter;
use tracing::debug;

use crate::market::OrderBook;
use crate::{MarketData, RebalanceStrategy, RunState, Snapshot, StrategyConfig, StrategyKind};

/// Ranks the universe once per rebalance and opens a new basket of the top
/// winners and bottom losers, holding each basket for `holding_period`
/// rebalances.
#[derive(Debug, Clone)]
pub struct CrossSectionalMomentum {
    config: StrategyConfig,
    market: MarketData,
    filter: UniverseFilter,
    computer: SignalComputer,
    allocator: EqualWeightAllocator,
}

impl CrossSectionalMomentum {
    /// Creates the strategy after validating `config`.
    ///
    /// # Errors
    ///
    /// Fails on an invalid config or one of the time-series family.
    pub fn new(config: StrategyConfig, market: MarketData) -> Result<Self> {
        config.validate()?;
        let StrategyKind::CrossSectional {
            winners_amount,
            losers_amount,
        } = config.kind
        else {
            return Err(RondaError::InvalidConfig(format!(
                "{} is not a cross-sectional config",
                config.descriptor()
            )));
        };

        let allocator = EqualWeightAllocator::new(EqualWeightConfig {
            winners_amount,
            losers_amount,
            holding_period: config.holding_period,
        });
        let computer = SignalComputer::new(SignalConfig {
            return_method: config.return_method,
            ..SignalConfig::default()
        });
        Ok(Self {
            filter: config.universe_filter(),
            config,
            market,
            computer,
            allocator,
        })
    }

    fn rebalance(
        &self,
        state: &mut RunState,
        ctx: &dyn ExecutionContext,
    ) -> Result<Vec<WeightInstruction>> {
        let today = ctx.current_date();
        let Some(snapshot) = self.compute_signal(ctx)? else {
            debug!(%today, descriptor = %self.descriptor(), "empty ranking window, skipping");
            return Ok(Vec::new());
        };

        let mut book = OrderBook::new(ctx);

        let held: BTreeSet<Symbol> = ctx
            .positions()
            .into_keys()
            .chain(state.ladder.assets())
            .collect();
        for asset in snapshot.universe.forced_exits(&held) {
            state.ladder.force_exit(&asset);
            book.liquidate(&asset);
        }

        let split = self.allocator.split(&snapshot.signals);
        let basket = self.allocator.weights_for(&split);

        for asset in state.ladder.roll(self.config.holding_period, basket.clone()) {
            book.liquidate(&asset);
        }
        for (asset, weight) in basket.iter() {
            book.target(asset, weight);
        }
        state.rebalances += 1;

        debug!(
            %today,
            descriptor = %self.descriptor(),
            universe = snapshot.universe.assets.len(),
            ranked = snapshot.signals.returns.len(),
            winners = split.winners.len(),
            losers = split.losers.len(),
            open_baskets = state.ladder.len(),
            "rebalanced"
        );
        Ok(book.finish())
    }
}

impl RebalanceStrategy for CrossSectionalMomentum {
    fn config(&self) -> &StrategyConfig {
        &self.config
    }

    fn compute_signal(&self, ctx: &dyn ExecutionContext) -> Result<Option<Snapshot>> {
        let today = ctx.current_date();
        let Some(window) = self.market.window(&self.config, today)? else {
            return Ok(None);
        };
        let universe =
            self.filter
                .resolve(self.market.store(), window.first_date(), window.last_date())?;

        let assets: Vec<Symbol> = universe.assets.iter().cloned().collect();
        let bar_count = self.market.bar_count(&self.config, window.first_date(), today)?;
        let history = ctx
            .history(&assets, bar_count)?
            .reindex(window.sessions())?
            .complete()?;

        let returns = self.computer.returns(&history, &window)?;
        Ok(Some(Snapshot {
            window,
            universe,
            signals: SignalSet {
                returns,
                ..SignalSet::default()
            },
        }))
    }

    fn compute_weights(&self, signals: &SignalSet) -> Result<TargetWeights> {
        self.allocator.allocate(signals)
    }

    fn on_schedule(
        &self,
        state: &mut RunState,
        ctx: &dyn ExecutionContext,
        event: ScheduleEvent,
    ) -> Result<Vec<WeightInstruction>> {
        match event {
            ScheduleEvent::Rebalance => self.rebalance(state, ctx),
            // Baskets only expire when the ladder rolls.
            ScheduleEvent::Liquidate => Ok(Vec::new()),
        }
    }
}
