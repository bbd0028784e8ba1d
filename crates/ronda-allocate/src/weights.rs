//! Target weight maps.

use std::collections::BTreeMap;

use ronda_traits::Symbol;

/// Target portfolio weights keyed by asset.
///
/// Positive weights are longs, negative weights shorts. An explicit zero
/// forces the liquidation of an asset that is no longer selected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetWeights(BTreeMap<Symbol, f64>);

impl TargetWeights {
    /// Creates an empty weight map.
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Weight of `asset`, if present.
    pub fn get(&self, asset: &str) -> Option<f64> {
        self.0.get(asset).copied()
    }

    /// Whether `asset` has an entry.
    pub fn contains(&self, asset: &str) -> bool {
        self.0.contains_key(asset)
    }

    /// Removes `asset`, returning its weight.
    pub fn remove(&mut self, asset: &str) -> Option<f64> {
        self.0.remove(asset)
    }

    /// Iterates entries in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, f64)> + '_ {
        self.0.iter().map(|(s, w)| (s, *w))
    }

    /// Assets with an entry.
    pub fn assets(&self) -> impl Iterator<Item = &Symbol> + '_ {
        self.0.keys()
    }

    /// Sum of absolute weights.
    pub fn gross_exposure(&self) -> f64 {
        self.0.values().map(|w| w.abs()).sum()
    }

    /// Sum of signed weights.
    pub fn net_exposure(&self) -> f64 {
        self.0.values().sum()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Symbol, f64)> for TargetWeights {
    fn from_iter<I: IntoIterator<Item = (Symbol, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for TargetWeights {
    type Item = (Symbol, f64);
    type IntoIter = std::collections::btree_map::IntoIter<Symbol, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
