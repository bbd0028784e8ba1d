//! Fixtures shared by the evaluation tests.

use std::sync::Arc;

use ronda_allocate::TargetWeights;
use ronda_signals::SignalSet;
use ronda_strategy::{MarketData, RebalanceStrategy, RunState, Snapshot, StrategyConfig};
use ronda_traits::{
    Date, ExecutionContext, PriceSeries, Result, ScheduleEvent, TradingCalendar, WeightInstruction,
};
use ronda_universe::{DEFAULT_CALENDAR, InMemoryStore, WeekdayCalendar};

pub(crate) fn d(y: i32, m: u32, day: u32) -> Date {
    Date::from_ymd_opt(y, m, day).unwrap()
}

/// `UP` gains 1% and `DOWN` loses 1% every session; `FLAT` never moves.
pub(crate) fn trending_store() -> Arc<InMemoryStore> {
    let sessions = WeekdayCalendar::default()
        .sessions_in_range(d(2023, 1, 2), d(2024, 12, 31), DEFAULT_CALENDAR)
        .unwrap();
    let path = |step: f64| -> Vec<(Date, f64)> {
        sessions
            .iter()
            .enumerate()
            .map(|(k, date)| (*date, 100.0 * step.powi(k as i32)))
            .collect()
    };
    Arc::new(InMemoryStore::from_series(vec![
        PriceSeries::new("UP", path(1.01)).unwrap(),
        PriceSeries::new("DOWN", path(0.99)).unwrap(),
        PriceSeries::new("FLAT", path(1.0)).unwrap(),
    ]))
}

pub(crate) fn market(store: Arc<InMemoryStore>) -> MarketData {
    MarketData::new(Arc::new(WeekdayCalendar::default()), store)
}

/// Puts a fixed weight on one asset at every rebalance.
pub(crate) struct FixedWeights {
    asset: String,
    weight: f64,
    config: StrategyConfig,
}

impl FixedWeights {
    pub(crate) fn new(asset: &str, weight: f64) -> Self {
        Self {
            asset: asset.to_string(),
            weight,
            config: StrategyConfig::default(),
        }
    }
}

impl RebalanceStrategy for FixedWeights {
    fn config(&self) -> &StrategyConfig {
        &self.config
    }

    fn descriptor(&self) -> String {
        "FIXED".to_string()
    }

    fn compute_signal(&self, _ctx: &dyn ExecutionContext) -> Result<Option<Snapshot>> {
        Ok(None)
    }

    fn compute_weights(&self, _signals: &SignalSet) -> Result<TargetWeights> {
        Ok([(self.asset.clone(), self.weight)].into_iter().collect())
    }

    fn on_schedule(
        &self,
        _state: &mut RunState,
        _ctx: &dyn ExecutionContext,
        event: ScheduleEvent,
    ) -> Result<Vec<WeightInstruction>> {
        Ok(match event {
            ScheduleEvent::Rebalance => {
                vec![WeightInstruction::new(self.asset.clone(), self.weight)]
            }
            ScheduleEvent::Liquidate => Vec::new(),
        })
    }
}

/// How a [`Faulty`] strategy breaks.
#[derive(Clone, Copy)]
pub(crate) enum Fault {
    Error,
    Panic,
}

/// Fails on its first rebalance.
pub(crate) struct Faulty {
    fault: Fault,
    config: StrategyConfig,
}

impl Faulty {
    pub(crate) fn new(fault: Fault) -> Self {
        Self {
            fault,
            config: StrategyConfig::default(),
        }
    }
}

impl RebalanceStrategy for Faulty {
    fn config(&self) -> &StrategyConfig {
        &self.config
    }

    fn descriptor(&self) -> String {
        match self.fault {
            Fault::Error => "FAULTY_ERROR".to_string(),
            Fault::Panic => "FAULTY_PANIC".to_string(),
        }
    }

    fn compute_signal(&self, _ctx: &dyn ExecutionContext) -> Result<Option<Snapshot>> {
        Ok(None)
    }

    fn compute_weights(&self, _signals: &SignalSet) -> Result<TargetWeights> {
        Ok(TargetWeights::new())
    }

    fn on_schedule(
        &self,
        _state: &mut RunState,
        _ctx: &dyn ExecutionContext,
        _event: ScheduleEvent,
    ) -> Result<Vec<WeightInstruction>> {
        match self.fault {
            Fault::Error => Err("store went away".into()),
            Fault::Panic => panic!("strategy blew up"),
        }
    }
}
