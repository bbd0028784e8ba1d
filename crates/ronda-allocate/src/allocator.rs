//! Core trait definition for weight allocators.

use ronda_signals::SignalSet;
use ronda_traits::Result;
use serde::{Deserialize, Serialize};

use crate::TargetWeights;

/// Which side(s) of the book a strategy may trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Long positions only.
    Long,
    /// Short positions only.
    Short,
    /// Both sides.
    #[default]
    LongShort,
}

impl Side {
    /// Code used in run descriptors (`L`, `S` or `LS`).
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Long => "L",
            Self::Short => "S",
            Self::LongShort => "LS",
        }
    }

    /// Whether a window return passes this directional filter.
    pub fn admits(&self, ret: f64) -> bool {
        match self {
            Self::Long => ret > 0.0,
            Self::Short => ret < 0.0,
            Self::LongShort => true,
        }
    }
}

/// Converts one rebalance's signals into target weights.
///
/// Implementations are stateless and thread-safe; basket bookkeeping lives
/// with the caller.
pub trait WeightAllocator: Send + Sync {
    /// Target weights for the assets in `signals`.
    ///
    /// # Errors
    ///
    /// Returns an error if the allocation produces non-finite weights.
    fn allocate(&self, signals: &SignalSet) -> Result<TargetWeights>;

    /// Name of this allocation scheme, used in logs.
    fn name(&self) -> &str;
}
