//! Trading calendar seam.

use crate::{Date, Result};

/// Resolves the trading sessions of an exchange calendar.
///
/// Implementations must be pure and safe to share between concurrently
/// running backtests.
pub trait TradingCalendar: Send + Sync {
    /// Ordered trading sessions in `[start, end]` for `calendar_id`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RondaError::InvalidRange`] when `start > end` and
    /// [`crate::RondaError::UnknownCalendar`] for an unsupported calendar.
    fn sessions_in_range(&self, start: Date, end: Date, calendar_id: &str) -> Result<Vec<Date>>;
}
