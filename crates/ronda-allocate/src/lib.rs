//! Position sizing for the Ronda momentum engine.
//!
//! This crate converts ranked momentum signals into target portfolio weights.
//! Two sizing schemes are provided:
//! - [`EqualWeightAllocator`]: winners/losers split sized at `1 / (S * H)`
//!   for laddered cross-sectional baskets
//! - [`VolScaledAllocator`]: inverse-volatility weights signed by each
//!   asset's own return, for time-series momentum
//!
//! # Examples
//!
//! ```rust,no_run
//! use ronda_allocate::{EqualWeightAllocator, EqualWeightConfig, WeightAllocator};
//! use ronda_signals::SignalSet;
//!
//! let allocator = EqualWeightAllocator::new(EqualWeightConfig {
//!     winners_amount: 10,
//!     losers_amount: 10,
//!     holding_period: 3,
//! });
//! let mut signals = SignalSet::default();
//! signals.returns.insert("SBER".to_string(), 0.12);
//! let weights = allocator.allocate(&signals).unwrap();
//! ```

mod allocator;
mod equal_weight;
mod ranking;
mod vol_scale;
mod weights;

// Re-export main types
pub use allocator::{Side, WeightAllocator};
pub use equal_weight::{EqualWeightAllocator, EqualWeightConfig};
pub use ranking::{RankingSplit, WINNER_THRESHOLD};
pub use vol_scale::{VolScaledAllocator, VolScaledConfig};
pub use weights::TargetWeights;
