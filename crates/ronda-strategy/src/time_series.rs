//! Time-series momentum with inverse-volatility sizing.

use ronda_allocate::{Side, TargetWeights, VolScaledAllocator, VolScaledConfig, WeightAllocator};
use ronda_signals::{SignalComputer, SignalConfig, SignalSet};
use ronda_traits::{ExecutionContext, Result, RondaError, ScheduleEvent, Symbol, WeightInstruction};
use ronda_universe::{ResolvedUniverse, UniverseFilter};
use tracing::debug;

use crate::market::OrderBook;
use crate::{
    LiquidationPolicy, MarketData, RebalanceStrategy, RunState, Snapshot, StrategyConfig,
    StrategyKind,
};

/// Trades every asset on the sign of its own window return.
///
/// One logical basket is held at a time. Every `holding_period` rebalances
/// the held positions are closed and replaced by inverse-volatility weights
/// normalized over the eligible assets.
#[derive(Debug, Clone)]
pub struct TimeSeriesMomentum {
    config: StrategyConfig,
    market: MarketData,
    filter: UniverseFilter,
    computer: SignalComputer,
    allocator: VolScaledAllocator,
    liquidation: LiquidationPolicy,
}

impl TimeSeriesMomentum {
    /// Creates the strategy after validating `config`.
    ///
    /// # Errors
    ///
    /// Fails on an invalid config or one of the cross-sectional family.
    pub fn new(config: StrategyConfig, market: MarketData) -> Result<Self> {
        config.validate()?;
        let StrategyKind::TimeSeries {
            side,
            volatility_scale,
            volatility_window,
            volatility_method,
            liquidation,
        } = config.kind
        else {
            return Err(RondaError::InvalidConfig(format!(
                "{} is not a time-series config",
                config.descriptor()
            )));
        };

        let computer = SignalComputer::new(SignalConfig {
            return_method: config.return_method,
            volatility_method,
            volatility_window,
        });
        let allocator = VolScaledAllocator::new(VolScaledConfig {
            volatility_scale,
            side,
        });
        Ok(Self {
            filter: config.universe_filter(),
            config,
            market,
            computer,
            allocator,
            liquidation,
        })
    }

    /// Directional filter in use.
    pub fn side(&self) -> Side {
        self.config.side()
    }

    /// Liquidation timing in use.
    pub const fn liquidation(&self) -> LiquidationPolicy {
        self.liquidation
    }

    fn universe(&self, ctx: &dyn ExecutionContext) -> Result<Option<ResolvedUniverse>> {
        let Some(window) = self.market.window(&self.config, ctx.current_date())? else {
            return Ok(None);
        };
        self.filter
            .resolve(self.market.store(), window.first_date(), window.last_date())
            .map(Some)
    }

    fn rebalance(
        &self,
        state: &mut RunState,
        ctx: &dyn ExecutionContext,
    ) -> Result<Vec<WeightInstruction>> {
        let today = ctx.current_date();
        let held = ctx.positions();
        let mut book = OrderBook::new(ctx);

        if !state.countdown.is_due() {
            if let Some(universe) = self.universe(ctx)? {
                for asset in universe.forced_exits(held.keys()) {
                    book.liquidate(&asset);
                }
            }
            self.advance(state);
            debug!(
                %today,
                descriptor = %self.descriptor(),
                counter = state.countdown.counter(),
                "holding"
            );
            return Ok(book.finish());
        }

        let Some(snapshot) = self.compute_signal(ctx)? else {
            debug!(%today, descriptor = %self.descriptor(), "empty ranking window, skipping");
            return Ok(Vec::new());
        };

        for asset in snapshot.universe.forced_exits(held.keys()) {
            book.liquidate(&asset);
        }
        if self.liquidation == LiquidationPolicy::SameTick {
            for asset in held.keys() {
                book.liquidate(asset);
            }
        }

        let weights = self.compute_weights(&snapshot.signals)?;
        for (asset, weight) in weights.iter() {
            book.target(asset, weight);
        }
        self.advance(state);
        state.rebalances += 1;

        let orders = book.finish();
        debug!(
            %today,
            descriptor = %self.descriptor(),
            universe = snapshot.universe.assets.len(),
            ranked = snapshot.signals.returns.len(),
            positions = weights.len(),
            closed = orders.iter().filter(|o| o.is_liquidation()).count(),
            gross = weights.gross_exposure(),
            net = weights.net_exposure(),
            counter = state.countdown.counter(),
            "rebalanced"
        );
        Ok(orders)
    }

    fn advance(&self, state: &mut RunState) {
        match self.liquidation {
            LiquidationPolicy::SameTick => {
                state.countdown.advance_wrapping(self.config.holding_period);
            }
            LiquidationPolicy::Trailing => state.countdown.advance(),
        }
    }

    fn liquidate(
        &self,
        state: &mut RunState,
        ctx: &dyn ExecutionContext,
    ) -> Vec<WeightInstruction> {
        if self.liquidation != LiquidationPolicy::Trailing
            || !state.countdown.settle(self.config.holding_period)
        {
            return Vec::new();
        }
        let mut book = OrderBook::new(ctx);
        for asset in ctx.positions().keys() {
            book.liquidate(asset);
        }
        let orders = book.finish();
        if !orders.is_empty() {
            debug!(
                today = %ctx.current_date(),
                descriptor = %self.descriptor(),
                closed = orders.len(),
                "liquidated"
            );
        }
        orders
    }
}

impl RebalanceStrategy for TimeSeriesMomentum {
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
        let volatility_bars = self.computer.config().volatility_window.saturating_add(1);
        let bar_count =
            self.market
                .trailing_bar_count(&self.config, &window, volatility_bars, today)?;
        let history = ctx.history(&assets, bar_count)?.complete()?;

        let signals = SignalSet {
            returns: self.computer.returns(&history, &window)?,
            volatility: self.computer.volatility(&history)?,
        };
        Ok(Some(Snapshot {
            window,
            universe,
            signals,
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
            ScheduleEvent::Liquidate => Ok(self.liquidate(state, ctx)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockContext, d, market, run_liquidate, run_rebalance, step_series};
    use approx::assert_relative_eq;
    use ronda_traits::Date;
    use ronda_universe::{InMemoryStore, MembershipRow, MembershipTable};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn today() -> Date {
        d(2024, 7, 1)
    }

    fn store() -> Arc<InMemoryStore> {
        Arc::new(InMemoryStore::from_series(vec![
            step_series("UP", d(2024, 5, 31), 0.08, &[]),
            step_series("DOWN", d(2024, 5, 31), -0.04, &[]),
            step_series("BIG", d(2024, 5, 31), 0.30, &[]),
            step_series("FLAT", d(2024, 5, 31), 0.0, &[]),
        ]))
    }

    fn config(holding_period: u32, side: Side, liquidation: LiquidationPolicy) -> StrategyConfig {
        let mut config = StrategyConfig::time_series(1, holding_period, side)
            .with_excluded(Vec::<String>::new());
        if let StrategyKind::TimeSeries {
            liquidation: policy,
            ..
        } = &mut config.kind
        {
            *policy = liquidation;
        }
        config
    }

    fn strategy(config: StrategyConfig) -> TimeSeriesMomentum {
        TimeSeriesMomentum::new(config, market(store())).unwrap()
    }

    fn as_map(orders: &[WeightInstruction]) -> BTreeMap<String, f64> {
        orders.iter().map(|o| (o.asset.clone(), o.weight)).collect()
    }

    #[test]
    fn test_rejects_cross_sectional_config() {
        let config = StrategyConfig::cross_sectional(3, 3, 1, 1);
        assert!(TimeSeriesMomentum::new(config, market(store())).is_err());
    }

    #[test]
    fn test_signals_include_volatility() {
        let strategy = strategy(config(3, Side::LongShort, LiquidationPolicy::SameTick));
        let ctx = MockContext::new(today(), store());
        let snapshot = strategy.compute_signal(&ctx).unwrap().unwrap();

        assert_relative_eq!(snapshot.signals.returns["UP"], 0.08, epsilon = 1e-12);
        assert!(snapshot.signals.volatility["UP"] > 0.0);
        assert_eq!(snapshot.signals.volatility["FLAT"], 0.0);
        // a larger jump means a larger realized volatility
        assert!(snapshot.signals.volatility["BIG"] > snapshot.signals.volatility["UP"]);
    }

    #[test]
    fn test_long_short_weights_signed_and_normalized() {
        let strategy = strategy(config(3, Side::LongShort, LiquidationPolicy::SameTick));
        let ctx = MockContext::new(today(), store());
        let mut state = RunState::new();

        let orders = as_map(&run_rebalance(&strategy, &mut state, &ctx));

        assert!(!orders.contains_key("FLAT"));
        assert!(orders["UP"] > 0.0);
        assert!(orders["BIG"] > 0.0);
        assert!(orders["DOWN"] < 0.0);
        assert_relative_eq!(orders.values().map(|w| w.abs()).sum::<f64>(), 1.0, epsilon = 1e-9);
        // inverse volatility favours the calmer asset
        assert!(orders["UP"] > orders["BIG"]);
    }

    #[test]
    fn test_side_filters() {
        let ctx = MockContext::new(today(), store());

        let long = strategy(config(3, Side::Long, LiquidationPolicy::SameTick));
        let orders = as_map(&run_rebalance(&long, &mut RunState::new(), &ctx));
        assert_eq!(orders.keys().collect::<Vec<_>>(), vec!["BIG", "UP"]);
        assert_relative_eq!(orders.values().sum::<f64>(), 1.0, epsilon = 1e-9);

        let short = strategy(config(3, Side::Short, LiquidationPolicy::SameTick));
        let orders = as_map(&run_rebalance(&short, &mut RunState::new(), &ctx));
        assert_eq!(orders.len(), 1);
        assert_relative_eq!(orders["DOWN"], -1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_same_tick_liquidates_and_reenters() {
        let strategy = strategy(config(2, Side::Long, LiquidationPolicy::SameTick));
        let ctx = MockContext::new(today(), store()).holding(&["DOWN", "UP"]);
        let mut state = RunState::new();

        let orders = as_map(&run_rebalance(&strategy, &mut state, &ctx));
        assert_eq!(orders["DOWN"], 0.0);
        assert!(orders["UP"] > 0.0);
        assert_eq!(state.countdown.counter(), 1);

        // liquidation events are ignored under this policy
        assert!(run_liquidate(&strategy, &mut state, &ctx).is_empty());

        // mid-holding rebalance holds
        assert!(run_rebalance(&strategy, &mut state, &ctx).is_empty());
        assert!(state.countdown.is_due());
        assert_eq!(state.rebalances, 1);
    }

    #[test]
    fn test_trailing_liquidation_waits_for_event() {
        let strategy = strategy(config(1, Side::Long, LiquidationPolicy::Trailing));
        let ctx = MockContext::new(today(), store()).holding(&["DOWN"]);
        let mut state = RunState::new();

        let orders = as_map(&run_rebalance(&strategy, &mut state, &ctx));
        assert!(!orders.contains_key("DOWN"));
        assert!(orders["UP"] > 0.0);
        assert_eq!(state.countdown.counter(), 1);

        let ctx = MockContext::new(d(2024, 7, 31), store()).holding(&["UP", "BIG"]);
        let closed = as_map(&run_liquidate(&strategy, &mut state, &ctx));
        assert_eq!(closed.len(), 2);
        assert!(closed.values().all(|w| *w == 0.0));
        assert!(state.countdown.is_due());
    }

    #[test]
    fn test_trailing_holds_until_counter_reaches_holding_period() {
        let strategy = strategy(config(3, Side::Long, LiquidationPolicy::Trailing));
        let ctx = MockContext::new(today(), store()).holding(&["UP"]);
        let mut state = RunState::new();

        // first liquidation event before any rebalance closes what is held
        assert_eq!(run_liquidate(&strategy, &mut state, &ctx).len(), 1);
        run_rebalance(&strategy, &mut state, &ctx);
        assert!(run_liquidate(&strategy, &mut state, &ctx).is_empty());
        assert_eq!(state.countdown.counter(), 1);
    }

    #[test]
    fn test_long_ranking_window_trades() {
        let config = StrategyConfig::time_series(18, 1, Side::LongShort)
            .with_excluded(Vec::<String>::new());
        assert!(config.validate().is_ok());
        let strategy = strategy(config);
        let ctx = MockContext::new(today(), store());

        let orders = as_map(
            &strategy
                .on_schedule(&mut RunState::new(), &ctx, ScheduleEvent::Rebalance)
                .unwrap(),
        );
        assert_eq!(orders.keys().collect::<Vec<_>>(), vec!["BIG", "DOWN", "UP"]);
        assert_relative_eq!(orders.values().map(|w| w.abs()).sum::<f64>(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_long_volatility_window_trades() {
        let mut config = config(1, Side::LongShort, LiquidationPolicy::SameTick);
        if let StrategyKind::TimeSeries {
            volatility_window, ..
        } = &mut config.kind
        {
            *volatility_window = 300;
        }
        let strategy = strategy(config);
        let ctx = MockContext::new(today(), store());

        let snapshot = strategy.compute_signal(&ctx).unwrap().unwrap();
        assert_eq!(snapshot.signals.volatility.len(), 4);

        let orders = strategy
            .on_schedule(&mut RunState::new(), &ctx, ScheduleEvent::Rebalance)
            .unwrap();
        assert_eq!(orders.len(), 3);
    }

    #[test]
    fn test_untradable_assets_skipped() {
        let strategy = strategy(config(3, Side::Long, LiquidationPolicy::SameTick));
        let mut ctx = MockContext::new(today(), store());
        ctx.untradable.insert("BIG".to_string());

        let orders = as_map(&run_rebalance(&strategy, &mut RunState::new(), &ctx));
        assert_eq!(orders.len(), 1);
        assert!(orders["UP"] < 1.0);
    }

    #[test]
    fn test_forced_exit_between_rebalances() {
        let table = MembershipTable::new(vec![MembershipRow {
            date: d(2024, 1, 1),
            members: ["UP", "DOWN"].iter().map(|s| s.to_string()).collect(),
        }])
        .unwrap();
        let config = config(3, Side::LongShort, LiquidationPolicy::SameTick)
            .with_membership(Arc::new(table));
        let strategy = strategy(config);
        let ctx = MockContext::new(today(), store()).holding(&["BIG", "UP"]);

        let mut state = RunState::new();
        state.countdown.advance_wrapping(3);
        let orders = as_map(&run_rebalance(&strategy, &mut state, &ctx));
        assert_eq!(orders.len(), 1);
        assert_eq!(orders["BIG"], 0.0);
        assert_eq!(state.countdown.counter(), 2);
    }

    #[test]
    fn test_on_schedule_is_repeatable() {
        let strategy = strategy(config(3, Side::LongShort, LiquidationPolicy::SameTick));
        let ctx = MockContext::new(today(), store()).holding(&["UP"]);
        let mut first_state = RunState::new();
        let mut second_state = first_state.clone();

        let first = run_rebalance(&strategy, &mut first_state, &ctx);
        let second = run_rebalance(&strategy, &mut second_state, &ctx);
        assert_eq!(first, second);
        assert_eq!(first_state, second_state);
    }

    #[test]
    fn test_build_strategy_dispatches_on_family() {
        let config = config(9, Side::Long, LiquidationPolicy::SameTick);
        let built = crate::build_strategy(config, market(store())).unwrap();
        assert_eq!(built.descriptor(), "TSMOM_L_1_9");
        let config = StrategyConfig::cross_sectional(3, 6, 0, 20);
        let built = crate::build_strategy(config, market(store())).unwrap();
        assert_eq!(built.descriptor(), "CSMOM_S_3_6");
    }
}
