//! Shared-infrastructure access and order collection for the facades.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::Duration;
use ronda_signals::RankingWindow;
use ronda_traits::{
    Date, ExecutionContext, MarketDataStore, Result, Symbol, TradingCalendar, WeightInstruction,
};

use crate::StrategyConfig;

/// Minimum calendar days of history loaded for time-series volatility estimates.
pub const TIME_SERIES_LOOKBACK_DAYS: i64 = 400;

/// Calendar days loaded ahead of a ranking window, enough to reach the
/// session preceding it across weekends and holidays.
const WINDOW_LEAD_DAYS: i64 = 10;

/// Read-only handles to the calendar service and market-data store.
///
/// Cloning shares the underlying services, so many runs can hold one each.
#[derive(Clone)]
pub struct MarketData {
    calendar: Arc<dyn TradingCalendar>,
    store: Arc<dyn MarketDataStore>,
}

impl MarketData {
    /// Bundles the two services.
    pub fn new(calendar: Arc<dyn TradingCalendar>, store: Arc<dyn MarketDataStore>) -> Self {
        Self { calendar, store }
    }

    /// Calendar service.
    pub fn calendar(&self) -> &dyn TradingCalendar {
        self.calendar.as_ref()
    }

    /// Market-data store.
    pub fn store(&self) -> &dyn MarketDataStore {
        self.store.as_ref()
    }

    /// Ranking window for a rebalance on `today`.
    pub fn window(&self, config: &StrategyConfig, today: Date) -> Result<Option<RankingWindow>> {
        RankingWindow::resolve(
            self.calendar(),
            &config.calendar,
            today,
            config.ranking_period,
            config.momentum_gap,
        )
    }

    /// Number of sessions in `[first, today]`.
    pub fn bar_count(&self, config: &StrategyConfig, first: Date, today: Date) -> Result<usize> {
        Ok(self
            .calendar
            .sessions_in_range(first, today, &config.calendar)?
            .len())
    }

    /// Number of sessions a time-series rebalance on `today` loads.
    ///
    /// Covers the trailing [`TIME_SERIES_LOOKBACK_DAYS`], the ranking window
    /// together with the session before it, and at least `min_bars` sessions.
    pub fn trailing_bar_count(
        &self,
        config: &StrategyConfig,
        window: &RankingWindow,
        min_bars: usize,
        today: Date,
    ) -> Result<usize> {
        let first = (today - Duration::days(TIME_SERIES_LOOKBACK_DAYS))
            .min(window.first_date() - Duration::days(WINDOW_LEAD_DAYS));
        Ok(self.bar_count(config, first, today)?.max(min_bars))
    }
}

impl fmt::Debug for MarketData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarketData").finish_non_exhaustive()
    }
}

/// Collects the instructions of one scheduled call.
///
/// Untradable assets are skipped. A later instruction for the same asset
/// replaces the earlier one, matching `order_target_percent` semantics,
/// while the first-seen order of assets is kept.
pub(crate) struct OrderBook<'a> {
    ctx: &'a dyn ExecutionContext,
    orders: Vec<WeightInstruction>,
    index: BTreeMap<Symbol, usize>,
}

impl<'a> OrderBook<'a> {
    pub(crate) fn new(ctx: &'a dyn ExecutionContext) -> Self {
        Self {
            ctx,
            orders: Vec::new(),
            index: BTreeMap::new(),
        }
    }

    pub(crate) fn target(&mut self, asset: &str, weight: f64) {
        if !self.ctx.can_trade(asset) {
            return;
        }
        match self.index.get(asset) {
            Some(&i) => self.orders[i].weight = weight,
            None => {
                self.index.insert(asset.to_string(), self.orders.len());
                self.orders.push(WeightInstruction::new(asset, weight));
            }
        }
    }

    pub(crate) fn liquidate(&mut self, asset: &str) {
        self.target(asset, 0.0);
    }

    pub(crate) fn finish(self) -> Vec<WeightInstruction> {
        self.orders
    }
}
