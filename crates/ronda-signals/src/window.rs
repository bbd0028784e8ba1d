//! Ranking window resolution.
//!
//! Windows are expressed in months and converted to calendar days at 30 days
//! per month. The window ends `momentum_gap` months before the rebalance date
//! and spans `ranking_period` months before that.

use chrono::Duration;
use ronda_traits::{Date, Result, RondaError, TradingCalendar};

/// Calendar days counted per month of lookback.
pub const DAYS_PER_MONTH: i64 = 30;

/// Sessions of the ranking window for one rebalance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingWindow {
    sessions: Vec<Date>,
}

impl RankingWindow {
    /// Resolves the ranking window ending `momentum_gap` months before `today`.
    ///
    /// Returns `Ok(None)` when the calendar has no session in that range, and
    /// [`RondaError::InvalidConfig`] when the lookback reaches past the
    /// representable dates.
    pub fn resolve(
        calendar: &dyn TradingCalendar,
        calendar_id: &str,
        today: Date,
        ranking_period: u32,
        momentum_gap: u32,
    ) -> Result<Option<Self>> {
        let from = months_before(today, i64::from(ranking_period) + i64::from(momentum_gap))?;
        let to = months_before(today, i64::from(momentum_gap))?;
        let sessions = calendar.sessions_in_range(from, to, calendar_id)?;
        Ok(Self::from_sessions(sessions))
    }

    /// Builds a window from known, non-empty sessions.
    pub fn from_sessions(sessions: Vec<Date>) -> Option<Self> {
        (!sessions.is_empty()).then_some(Self { sessions })
    }

    /// First session of the window.
    pub fn first_date(&self) -> Date {
        self.sessions[0]
    }

    /// Last session of the window.
    pub fn last_date(&self) -> Date {
        self.sessions[self.sessions.len() - 1]
    }

    /// Every session of the window.
    pub fn sessions(&self) -> &[Date] {
        &self.sessions
    }
}

fn months_before(today: Date, months: i64) -> Result<Date> {
    Duration::try_days(months * DAYS_PER_MONTH)
        .and_then(|span| today.checked_sub_signed(span))
        .ok_or_else(|| {
            RondaError::InvalidConfig(format!(
                "a lookback of {months} months before {today} is out of range"
            ))
        })
}
