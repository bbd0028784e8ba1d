//! Fixtures shared by the facade tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::Duration;
use ronda_traits::{
    Date, ExecutionContext, Position, PriceHistory, PriceSeries, Result, ScheduleEvent, Symbol,
    TradingCalendar, WeightInstruction,
};
use ronda_universe::{DEFAULT_CALENDAR, InMemoryStore, WeekdayCalendar};

use crate::{MarketData, RebalanceStrategy, RunState};

pub(crate) fn d(y: i32, m: u32, day: u32) -> Date {
    Date::from_ymd_opt(y, m, day).unwrap()
}

/// Weekday closes at 100 that jump by `ret` on `switch` and stay there.
pub(crate) fn step_series(symbol: &str, switch: Date, ret: f64, missing: &[Date]) -> PriceSeries {
    let points = WeekdayCalendar::default()
        .sessions_in_range(d(2020, 1, 1), d(2024, 12, 31), DEFAULT_CALENDAR)
        .unwrap()
        .into_iter()
        .filter(|date| !missing.contains(date))
        .map(|date| {
            let close = if date >= switch { 100.0 * (1.0 + ret) } else { 100.0 };
            (date, close)
        })
        .collect();
    PriceSeries::new(symbol, points).unwrap()
}

pub(crate) fn market(store: Arc<InMemoryStore>) -> MarketData {
    MarketData::new(Arc::new(WeekdayCalendar::default()), store)
}

pub(crate) fn run_rebalance(
    strategy: &dyn RebalanceStrategy,
    state: &mut RunState,
    ctx: &dyn ExecutionContext,
) -> Vec<WeightInstruction> {
    strategy
        .on_schedule(state, ctx, ScheduleEvent::Rebalance)
        .unwrap()
}

pub(crate) fn run_liquidate(
    strategy: &dyn RebalanceStrategy,
    state: &mut RunState,
    ctx: &dyn ExecutionContext,
) -> Vec<WeightInstruction> {
    strategy
        .on_schedule(state, ctx, ScheduleEvent::Liquidate)
        .unwrap()
}

/// Execution context answering history queries from an in-memory store.
pub(crate) struct MockContext {
    pub(crate) today: Date,
    pub(crate) store: Arc<InMemoryStore>,
    pub(crate) untradable: BTreeSet<Symbol>,
    pub(crate) positions: BTreeMap<Symbol, Position>,
}

impl MockContext {
    pub(crate) fn new(today: Date, store: Arc<InMemoryStore>) -> Self {
        Self {
            today,
            store,
            untradable: BTreeSet::new(),
            positions: BTreeMap::new(),
        }
    }

    pub(crate) fn holding(mut self, assets: &[&str]) -> Self {
        for asset in assets {
            self.positions.insert(
                asset.to_string(),
                Position {
                    amount: 10.0,
                    last_price: 100.0,
                },
            );
        }
        self
    }
}

impl ExecutionContext for MockContext {
    fn current_date(&self) -> Date {
        self.today
    }

    fn history(&self, assets: &[Symbol], bar_count: usize) -> Result<PriceHistory> {
        let all = WeekdayCalendar::default().sessions_in_range(
            self.today - Duration::days(3650),
            self.today,
            DEFAULT_CALENDAR,
        )?;
        let sessions = all[all.len().saturating_sub(bar_count)..].to_vec();
        let columns = assets
            .iter()
            .map(|asset| {
                let closes = match self.store.series(asset) {
                    Some(series) => sessions.iter().map(|s| series.close_on(*s)).collect(),
                    None => vec![None; sessions.len()],
                };
                (asset.clone(), closes)
            })
            .collect();
        PriceHistory::from_columns(sessions, columns)
    }

    fn can_trade(&self, asset: &str) -> bool {
        !self.untradable.contains(asset)
    }

    fn positions(&self) -> BTreeMap<Symbol, Position> {
        self.positions.clone()
    }
}
