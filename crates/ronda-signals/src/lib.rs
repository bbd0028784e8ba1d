//! Momentum signal computation for the Ronda engine.
//!
//! This crate turns a session-indexed price history into the per-asset
//! scalars a rebalance needs:
//! - window returns, point-to-point or compounded ([`ReturnMethod`])
//! - realized volatility, percentage-change or log based ([`VolatilityMethod`])
//!
//! Assets without a complete price history over the requested span are
//! dropped for that rebalance rather than reported as errors.
//!
//! # Example
//!
//! ```ignore
//! use ronda_signals::{RankingWindow, SignalComputer, SignalConfig};
//!
//! let window = RankingWindow::resolve(&calendar, "XMOS", today, 3, 1)?.unwrap();
//! let computer = SignalComputer::new(SignalConfig::default());
//! let returns = computer.returns(&history, &window)?;
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

mod computer;
mod returns;
mod volatility;
mod window;

pub use computer::{SignalComputer, SignalConfig, SignalSet};
pub use returns::{ReturnMethod, compounded_return, point_to_point_return};
pub use volatility::{VolatilityMethod, realized_volatility};
pub use window::{DAYS_PER_MONTH, RankingWindow};
