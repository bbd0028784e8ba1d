//! Inverse-volatility sizing for time-series momentum.

use std::collections::BTreeMap;

use ndarray::Array1;
use ronda_signals::SignalSet;
use ronda_traits::{Result, Symbol};
use serde::{Deserialize, Serialize};

use crate::{Side, TargetWeights, WeightAllocator};

/// Configuration for volatility-scaled sizing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolScaledConfig {
    /// Numerator of the inverse-volatility score (target volatility).
    pub volatility_scale: f64,
    /// Directional filter applied to returns before sizing.
    pub side: Side,
}

impl Default for VolScaledConfig {
    fn default() -> Self {
        Self {
            volatility_scale: 0.4,
            side: Side::LongShort,
        }
    }
}

/// Volatility-scaled allocator.
///
/// Each eligible asset scores `volatility_scale / volatility`; scores are
/// normalized to sum to one and signed by the direction of the asset's own
/// window return. Eligible means: the return passes the side filter and the
/// volatility is finite and non-zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct VolScaledAllocator {
    config: VolScaledConfig,
}

impl VolScaledAllocator {
    /// Create a new volatility-scaled allocator with the given configuration.
    pub const fn new(config: VolScaledConfig) -> Self {
        Self { config }
    }

    /// Unsigned weights summing to one over the eligible assets.
    pub fn raw_weights(&self, signals: &SignalSet) -> BTreeMap<Symbol, f64> {
        let eligible: Vec<(&Symbol, f64)> = signals
            .returns
            .iter()
            .filter(|(_, r)| self.config.side.admits(**r))
            .filter_map(|(s, _)| {
                signals
                    .volatility
                    .get(s)
                    .filter(|v| v.is_finite() && **v != 0.0)
                    .map(|v| (s, *v))
            })
            .collect();

        if eligible.is_empty() {
            return BTreeMap::new();
        }

        let inverse_vol: Array1<f64> = eligible
            .iter()
            .map(|(_, v)| self.config.volatility_scale / v)
            .collect();
        let total = inverse_vol.sum();
        let normalized = inverse_vol / total;

        eligible
            .iter()
            .zip(normalized.iter())
            .map(|((s, _), w)| ((*s).clone(), *w))
            .collect()
    }
}

impl WeightAllocator for VolScaledAllocator {
    fn allocate(&self, signals: &SignalSet) -> Result<TargetWeights> {
        let weights: TargetWeights = self
            .raw_weights(signals)
            .into_iter()
            .map(|(s, w)| {
                let direction = sign(signals.returns[&s]);
                (s, w * direction)
            })
            .collect();

        if weights.iter().any(|(_, w)| !w.is_finite()) {
            return Err("Volatility scaling produced non-finite weights".into());
        }
        Ok(weights)
    }

    fn name(&self) -> &str {
        "vol_scale"
    }
}

/// Sign with `sign(0) == 0`.
fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn signals(rows: &[(&str, f64, f64)]) -> SignalSet {
        SignalSet {
            returns: rows.iter().map(|(s, r, _)| (s.to_string(), *r)).collect(),
            volatility: rows.iter().map(|(s, _, v)| (s.to_string(), *v)).collect(),
        }
    }

    #[test]
    fn test_raw_weights_sum_to_one() {
        let allocator = VolScaledAllocator::default();
        let raw = allocator.raw_weights(&signals(&[
            ("A", 0.1, 0.2),
            ("B", -0.05, 0.4),
            ("C", 0.02, 0.1),
        ]));
        assert_relative_eq!(raw.values().sum::<f64>(), 1.0, epsilon = 1e-12);
        // Lower volatility gets the larger share
        assert!(raw["C"] > raw["A"]);
        assert!(raw["A"] > raw["B"]);
    }

    #[test]
    fn test_inverse_volatility_proportions() {
        let allocator = VolScaledAllocator::default();
        let raw = allocator.raw_weights(&signals(&[("A", 0.1, 0.1), ("B", 0.1, 0.3)]));
        assert_relative_eq!(raw["A"], 0.75, epsilon = 1e-12);
        assert_relative_eq!(raw["B"], 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_signed_by_return() {
        let allocator = VolScaledAllocator::default();
        let weights = allocator
            .allocate(&signals(&[("A", 0.1, 0.2), ("B", -0.1, 0.2)]))
            .unwrap();
        assert_relative_eq!(weights.get("A").unwrap(), 0.5);
        assert_relative_eq!(weights.get("B").unwrap(), -0.5);
    }

    #[test]
    fn test_zero_volatility_excluded() {
        let allocator = VolScaledAllocator::default();
        let weights = allocator
            .allocate(&signals(&[("A", 0.1, 0.0), ("B", 0.1, 0.2)]))
            .unwrap();
        assert!(!weights.contains("A"));
        assert_relative_eq!(weights.get("B").unwrap(), 1.0);
    }

    #[test]
    fn test_side_filter_applied_before_normalization() {
        let allocator = VolScaledAllocator::new(VolScaledConfig {
            volatility_scale: 0.4,
            side: Side::Short,
        });
        let weights = allocator
            .allocate(&signals(&[("A", 0.1, 0.2), ("B", -0.1, 0.2), ("C", -0.2, 0.2)]))
            .unwrap();
        assert!(!weights.contains("A"));
        assert_relative_eq!(weights.get("B").unwrap(), -0.5);
        assert_relative_eq!(weights.get("C").unwrap(), -0.5);
    }

    #[test]
    fn test_missing_volatility_excluded() {
        let allocator = VolScaledAllocator::default();
        let mut set = signals(&[("A", 0.1, 0.2)]);
        set.returns.insert("B".to_string(), 0.3);
        let weights = allocator.allocate(&set).unwrap();
        assert_eq!(weights.len(), 1);
    }

    #[test]
    fn test_empty_signals() {
        let weights = VolScaledAllocator::default()
            .allocate(&SignalSet::default())
            .unwrap();
        assert!(weights.is_empty());
    }

    #[test]
    fn test_sign_of_zero() {
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(-2.0), -1.0);
    }
}
