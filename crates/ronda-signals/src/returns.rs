//! Window return algorithms.
//!
//! Two algorithms are kept side by side because they answer different
//! questions about the same window:
//!
//! - [`ReturnMethod::PointToPoint`] reads only the closes on the first and
//!   last window sessions.
//! - [`ReturnMethod::Compounded`] compounds every daily return that ends
//!   inside the window, which includes the move from the session preceding
//!   the window into its first session whenever the history reaches back
//!   that far.

use ronda_traits::Date;
use serde::{Deserialize, Serialize};

/// Selectable window return algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnMethod {
    /// `price(last) / price(first) - 1`.
    #[default]
    PointToPoint,
    /// Cumulative product of daily simple returns ending inside the window.
    ///
    /// The first of those returns starts at the close of the session before
    /// the window's first session, so this reads one close outside the
    /// window. With no earlier session in the history it starts at the
    /// window's first close.
    Compounded,
}

impl ReturnMethod {
    /// Short identifier used in logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::PointToPoint => "point_to_point",
            Self::Compounded => "compounded",
        }
    }

    /// Return of one asset over `[first, last]`.
    ///
    /// `sessions` and `closes` are aligned and gap-free. Returns `None` when
    /// either window bound is not a session of the history.
    pub fn window_return(
        &self,
        sessions: &[Date],
        closes: &[f64],
        first: Date,
        last: Date,
    ) -> Option<f64> {
        let start = sessions.binary_search(&first).ok()?;
        let end = sessions.binary_search(&last).ok()?;
        if end < start || end >= closes.len() {
            return None;
        }
        let value = match self {
            Self::PointToPoint => point_to_point_return(closes[start], closes[end]),
            Self::Compounded => compounded_return(&closes[start.saturating_sub(1)..=end]),
        };
        value.is_finite().then_some(value)
    }
}

/// Simple return between two closes.
pub fn point_to_point_return(first_close: f64, last_close: f64) -> f64 {
    last_close / first_close - 1.0
}

/// Compounds the daily simple returns of `closes`.
///
/// Returns `0.0` for fewer than two closes.
pub fn compounded_return(closes: &[f64]) -> f64 {
    closes
        .windows(2)
        .map(|w| 1.0 + (w[1] / w[0] - 1.0))
        .product::<f64>()
        - 1.0
}
