//! Weekday trading calendars.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Weekday};
use ronda_traits::{Date, Result, RondaError, TradingCalendar};

/// Calendar used when a configuration does not name one (Moscow Exchange).
pub const DEFAULT_CALENDAR: &str = "XMOS";

/// A calendar service whose sessions are weekdays minus per-calendar holidays.
///
/// Each registered calendar id carries its own holiday set. Looking up an
/// unregistered id is an error rather than a silent fallback.
#[derive(Debug, Clone)]
pub struct WeekdayCalendar {
    holidays: BTreeMap<String, BTreeSet<Date>>,
}

impl WeekdayCalendar {
    /// Creates a service with no registered calendars.
    pub const fn empty() -> Self {
        Self {
            holidays: BTreeMap::new(),
        }
    }

    /// Registers (or replaces) `calendar_id` with the given holidays.
    #[must_use]
    pub fn with_calendar(
        mut self,
        calendar_id: impl Into<String>,
        holidays: impl IntoIterator<Item = Date>,
    ) -> Self {
        self.holidays
            .insert(calendar_id.into(), holidays.into_iter().collect());
        self
    }

    fn holidays_for(&self, calendar_id: &str) -> Result<&BTreeSet<Date>> {
        self.holidays
            .get(calendar_id)
            .ok_or_else(|| RondaError::UnknownCalendar(calendar_id.to_string()))
    }
}

impl Default for WeekdayCalendar {
    /// Registers [`DEFAULT_CALENDAR`] without holidays.
    fn default() -> Self {
        Self::empty().with_calendar(DEFAULT_CALENDAR, std::iter::empty())
    }
}

impl TradingCalendar for WeekdayCalendar {
    fn sessions_in_range(&self, start: Date, end: Date, calendar_id: &str) -> Result<Vec<Date>> {
        if start > end {
            return Err(RondaError::InvalidRange { start, end });
        }
        let holidays = self.holidays_for(calendar_id)?;
        Ok(start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
            .filter(|d| !holidays.contains(d))
            .collect())
    }
}
