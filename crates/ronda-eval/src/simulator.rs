//! Minimal daily simulator standing in for the execution engine.
//!
//! The simulator walks the calendar's sessions, raises the monthly schedule
//! events and fills every instruction at the session close with no costs.
//! Orders follow `order_target_percent` semantics: the position is resized
//! so that it makes up `weight` of current portfolio value.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use ronda_strategy::{MarketData, RebalanceStrategy, RunState};
use ronda_traits::{
    Date, ExecutionContext, MarketDataStore, Position, PriceHistory, Result, RondaError,
    ScheduleEvent, Symbol, WeightInstruction,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{DailyRecord, PerformanceRecord, Transaction};

/// Smallest share amount kept as an open position.
const MIN_AMOUNT: f64 = 1e-9;

/// Simulation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// First simulated date.
    pub start: Date,
    /// Last simulated date.
    pub end: Date,
    /// Starting cash.
    pub capital_base: f64,
    /// Exchange calendar driving the simulation.
    pub calendar: String,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2012, 1, 3).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2018, 12, 29).unwrap_or_default(),
            capital_base: 1_000_000.0,
            calendar: "XMOS".to_string(),
        }
    }
}

/// Schedule events raised on `today`.
///
/// `Rebalance` fires on the first session of a month and `Liquidate` on the
/// last one; a month with a single session raises both, rebalance first.
pub fn monthly_events(
    previous: Option<Date>,
    today: Date,
    next: Option<Date>,
) -> Vec<ScheduleEvent> {
    let same_month = |other: Date| other.year() == today.year() && other.month() == today.month();
    let mut events = Vec::with_capacity(2);
    if !previous.is_some_and(same_month) {
        events.push(ScheduleEvent::Rebalance);
    }
    if !next.is_some_and(same_month) {
        events.push(ScheduleEvent::Liquidate);
    }
    events
}

/// Runs strategies over a fixed period against shared market data.
#[derive(Debug, Clone)]
pub struct Simulator {
    config: SimulatorConfig,
    market: MarketData,
}

impl Simulator {
    /// Creates a simulator; fails on an inverted period or non-positive capital.
    pub fn new(config: SimulatorConfig, market: MarketData) -> Result<Self> {
        if config.start > config.end {
            return Err(RondaError::InvalidRange {
                start: config.start,
                end: config.end,
            });
        }
        if !(config.capital_base.is_finite() && config.capital_base > 0.0) {
            return Err(RondaError::InvalidConfig(
                "capital_base must be positive".to_string(),
            ));
        }
        Ok(Self { config, market })
    }

    /// Simulation settings.
    pub const fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Runs `strategy` from a fresh state and returns its record.
    ///
    /// # Errors
    ///
    /// Any error raised by the strategy or the data services aborts the run.
    pub fn run(&self, strategy: &dyn RebalanceStrategy) -> Result<PerformanceRecord> {
        let descriptor = strategy.descriptor();
        let calendar = self.market.calendar();
        // one month either side so the first and last sessions know their neighbours
        let sessions = calendar.sessions_in_range(
            self.config.start - Duration::days(31),
            self.config.end + Duration::days(31),
            &self.config.calendar,
        )?;
        let first = sessions.partition_point(|d| *d < self.config.start);
        let last = sessions.partition_point(|d| *d <= self.config.end);
        if first >= last {
            return Err(RondaError::InvalidConfig(format!(
                "no {} sessions between {} and {}",
                self.config.calendar, self.config.start, self.config.end
            )));
        }

        info!(%descriptor, start = %sessions[first], end = %sessions[last - 1], "starting run");

        let store = self.market.store();
        let mut portfolio = Portfolio::new(self.config.capital_base);
        let mut state = RunState::new();
        let mut days = Vec::with_capacity(last - first);
        let mut transactions = Vec::new();
        let mut previous_value = self.config.capital_base;
        let mut month_start_value: Option<f64> = None;

        for i in first..last {
            let today = sessions[i];
            portfolio.mark(store, today)?;

            let events = monthly_events(
                i.checked_sub(1).map(|p| sessions[p]),
                today,
                sessions.get(i + 1).copied(),
            );
            for event in events {
                if event == ScheduleEvent::Rebalance {
                    let value = portfolio.value();
                    if let Some(start_value) = month_start_value {
                        debug!(
                            %descriptor,
                            %today,
                            last_month = value / start_value - 1.0,
                            "monthly result"
                        );
                    }
                    month_start_value = Some(value);
                }

                let orders = {
                    let view = DayView {
                        today,
                        market: &self.market,
                        calendar_id: &self.config.calendar,
                        portfolio: &portfolio,
                    };
                    strategy.on_schedule(&mut state, &view, event)?
                };
                for order in &orders {
                    if let Some(fill) = portfolio.order_target_percent(store, order, today)? {
                        transactions.push(fill);
                    }
                }
            }

            let value = portfolio.value();
            days.push(DailyRecord {
                date: today,
                portfolio_value: value,
                daily_return: value / previous_value - 1.0,
                positions: portfolio.shares(),
            });
            previous_value = value;
        }

        info!(
            %descriptor,
            final_value = previous_value,
            transactions = transactions.len(),
            "finished run"
        );
        Ok(PerformanceRecord {
            descriptor,
            capital_base: self.config.capital_base,
            days,
            transactions,
        })
    }
}

/// Cash and open positions of a simulated account.
#[derive(Debug, Clone)]
struct Portfolio {
    cash: f64,
    holdings: BTreeMap<Symbol, Position>,
}

impl Portfolio {
    const fn new(cash: f64) -> Self {
        Self {
            cash,
            holdings: BTreeMap::new(),
        }
    }

    fn value(&self) -> f64 {
        self.cash
            + self
                .holdings
                .values()
                .map(|p| p.amount * p.last_price)
                .sum::<f64>()
    }

    fn shares(&self) -> BTreeMap<Symbol, f64> {
        self.holdings
            .iter()
            .map(|(s, p)| (s.clone(), p.amount))
            .collect()
    }

    /// Revalues held positions at today's closes; stale prices are kept.
    fn mark(&mut self, store: &dyn MarketDataStore, today: Date) -> Result<()> {
        for (symbol, position) in &mut self.holdings {
            if let Some(price) = close_on(store, symbol, today)? {
                position.last_price = price;
            }
        }
        Ok(())
    }

    fn order_target_percent(
        &mut self,
        store: &dyn MarketDataStore,
        order: &WeightInstruction,
        today: Date,
    ) -> Result<Option<Transaction>> {
        let Some(price) = close_on(store, &order.asset, today)? else {
            return Ok(None);
        };
        let target = order.weight * self.value() / price;
        let current = self.holdings.get(&order.asset).map_or(0.0, |p| p.amount);
        let delta = target - current;
        if delta.abs() < MIN_AMOUNT {
            return Ok(None);
        }

        self.cash -= delta * price;
        if target.abs() < MIN_AMOUNT {
            self.holdings.remove(&order.asset);
        } else {
            self.holdings.insert(
                order.asset.clone(),
                Position {
                    amount: target,
                    last_price: price,
                },
            );
        }
        Ok(Some(Transaction {
            date: today,
            asset: order.asset.clone(),
            amount: delta,
            price,
        }))
    }
}

fn close_on(store: &dyn MarketDataStore, symbol: &str, date: Date) -> Result<Option<f64>> {
    match store.price_history(symbol, date, date) {
        Ok(series) => Ok(series.close_on(date)),
        Err(RondaError::SymbolNotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// The per-day view a strategy sees during a scheduled call.
struct DayView<'a> {
    today: Date,
    market: &'a MarketData,
    calendar_id: &'a str,
    portfolio: &'a Portfolio,
}

impl ExecutionContext for DayView<'_> {
    fn current_date(&self) -> Date {
        self.today
    }

    fn history(&self, assets: &[Symbol], bar_count: usize) -> Result<PriceHistory> {
        // weekdays make up more than half of calendar days
        let span = i64::try_from(bar_count)
            .map_err(|_| RondaError::InvalidData(format!("bar count {bar_count} too large")))?;
        let all = self.market.calendar().sessions_in_range(
            self.today - Duration::days(span * 2 + 14),
            self.today,
            self.calendar_id,
        )?;
        let sessions = all[all.len().saturating_sub(bar_count)..].to_vec();
        let (Some(&first), Some(&last)) = (sessions.first(), sessions.last()) else {
            return PriceHistory::from_columns(sessions, BTreeMap::new());
        };

        let store = self.market.store();
        let mut columns = BTreeMap::new();
        for asset in assets {
            let series = match store.price_history(asset, first, last) {
                Ok(series) => Some(series),
                Err(RondaError::SymbolNotFound(_)) => None,
                Err(e) => return Err(e),
            };
            let closes = sessions
                .iter()
                .map(|d| series.as_ref().and_then(|s| s.close_on(*d)))
                .collect();
            columns.insert(asset.clone(), closes);
        }
        PriceHistory::from_columns(sessions, columns)
    }

    fn can_trade(&self, asset: &str) -> bool {
        matches!(close_on(self.market.store(), asset, self.today), Ok(Some(_)))
    }

    fn positions(&self) -> BTreeMap<Symbol, Position> {
        self.portfolio.holdings.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FixedWeights, d, market, trending_store};
    use approx::assert_relative_eq;
    use ronda_strategy::{StrategyConfig, build_strategy};

    #[test]
    fn test_monthly_events() {
        let events = monthly_events(Some(d(2024, 5, 31)), d(2024, 6, 3), Some(d(2024, 6, 4)));
        assert_eq!(events, vec![ScheduleEvent::Rebalance]);

        let events = monthly_events(Some(d(2024, 6, 27)), d(2024, 6, 28), Some(d(2024, 7, 1)));
        assert_eq!(events, vec![ScheduleEvent::Liquidate]);

        let events = monthly_events(Some(d(2024, 6, 3)), d(2024, 6, 4), Some(d(2024, 6, 5)));
        assert!(events.is_empty());

        let events = monthly_events(None, d(2024, 6, 4), None);
        assert_eq!(events, vec![ScheduleEvent::Rebalance, ScheduleEvent::Liquidate]);
    }

    #[test]
    fn test_rejects_inverted_period() {
        let config = SimulatorConfig {
            start: d(2024, 6, 1),
            end: d(2024, 5, 1),
            ..SimulatorConfig::default()
        };
        assert!(Simulator::new(config, market(trending_store())).is_err());
    }

    #[test]
    fn test_fully_invested_tracks_asset() {
        let config = SimulatorConfig {
            start: d(2024, 3, 1),
            end: d(2024, 3, 29),
            capital_base: 1000.0,
            ..SimulatorConfig::default()
        };
        let simulator = Simulator::new(config, market(trending_store())).unwrap();
        let record = simulator.run(&FixedWeights::new("UP", 1.0)).unwrap();

        // 2024-03-01 is a Friday: 21 weekdays in the period
        assert_eq!(record.days.len(), 21);
        assert_eq!(record.descriptor, "FIXED");
        assert_eq!(record.transactions.len(), 1);
        assert_eq!(record.days[0].daily_return, 0.0);

        // UP gains 1% per session after the entry fill
        let expected = 1000.0 * 1.01_f64.powi(20);
        assert_relative_eq!(record.final_value(), expected, max_relative = 1e-9);
        assert_relative_eq!(record.days[5].daily_return, 0.01, max_relative = 1e-9);
    }

    #[test]
    fn test_short_position_gains_when_price_falls() {
        let config = SimulatorConfig {
            start: d(2024, 3, 1),
            end: d(2024, 3, 8),
            capital_base: 1000.0,
            ..SimulatorConfig::default()
        };
        let simulator = Simulator::new(config, market(trending_store())).unwrap();
        let record = simulator.run(&FixedWeights::new("DOWN", -0.5)).unwrap();

        assert!(record.final_value() > 1000.0);
        assert!(record.days.last().unwrap().positions["DOWN"] < 0.0);
    }

    #[test]
    fn test_cross_sectional_run_trades() {
        let config = SimulatorConfig {
            start: d(2024, 6, 3),
            end: d(2024, 9, 30),
            capital_base: 1_000_000.0,
            ..SimulatorConfig::default()
        };
        let market = market(trending_store());
        let simulator = Simulator::new(config, market.clone()).unwrap();
        let strategy = build_strategy(
            StrategyConfig::cross_sectional(1, 1, 1, 1).with_excluded(Vec::<String>::new()),
            market,
        )
        .unwrap();

        let record = simulator.run(strategy.as_ref()).unwrap();
        assert_eq!(record.descriptor, "CSMOM_LS_1_1");
        assert!(!record.transactions.is_empty());
        assert!(record.days.iter().all(|d| d.portfolio_value.is_finite()));
        assert!(record.transactions.iter().all(|t| t.price > 0.0));
    }
}
