//! Universe filtering.

use std::collections::BTreeSet;
use std::sync::Arc;

use ronda_traits::{Date, MarketDataStore, Result, Symbol};
use tracing::debug;

use crate::MembershipTable;

/// Removes statically excluded symbols from `raw`.
pub fn filtered_universe(raw: &BTreeSet<Symbol>, excluded: &BTreeSet<Symbol>) -> BTreeSet<Symbol> {
    raw.difference(excluded).cloned().collect()
}

/// Narrows `raw` to the index members in force on `as_of`.
///
/// `all_assets` is the full historical universe; members never observed in
/// the store are discarded before the intersection with `raw`.
pub fn point_in_time_filter(
    raw: &BTreeSet<Symbol>,
    table: &MembershipTable,
    as_of: Date,
    all_assets: &BTreeSet<Symbol>,
) -> BTreeSet<Symbol> {
    let members = table.members_as_of(as_of, all_assets);
    raw.intersection(&members).cloned().collect()
}

/// Held assets that dropped out of the resolved membership list.
pub fn forced_exits<'a>(
    held: impl IntoIterator<Item = &'a Symbol>,
    members: &BTreeSet<Symbol>,
) -> Vec<Symbol> {
    held.into_iter()
        .filter(|s| !members.contains(*s))
        .cloned()
        .collect()
}

/// The universe tradable at one rebalance.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedUniverse {
    /// Assets eligible for ranking.
    pub assets: BTreeSet<Symbol>,
    /// Index members in force, when a membership table is configured.
    pub members: Option<BTreeSet<Symbol>>,
}

impl ResolvedUniverse {
    /// Held positions that must be closed because they left the index.
    ///
    /// Always empty without a membership table.
    pub fn forced_exits<'a>(&self, held: impl IntoIterator<Item = &'a Symbol>) -> Vec<Symbol> {
        self.members
            .as_ref()
            .map(|members| forced_exits(held, members))
            .unwrap_or_default()
    }
}

/// Static exclusions plus optional point-in-time membership.
#[derive(Debug, Clone, Default)]
pub struct UniverseFilter {
    excluded: BTreeSet<Symbol>,
    membership: Option<Arc<MembershipTable>>,
}

impl UniverseFilter {
    /// Creates a filter excluding `excluded`.
    pub fn new<S: Into<Symbol>>(excluded: impl IntoIterator<Item = S>) -> Self {
        Self {
            excluded: excluded.into_iter().map(Into::into).collect(),
            membership: None,
        }
    }

    /// Adds a point-in-time membership table.
    #[must_use]
    pub fn with_membership(mut self, table: Arc<MembershipTable>) -> Self {
        self.membership = Some(table);
        self
    }

    /// Resolves the universe for a ranking window `[first_date, last_date]`.
    ///
    /// Membership is looked up as of `last_date`.
    pub fn resolve(
        &self,
        store: &dyn MarketDataStore,
        first_date: Date,
        last_date: Date,
    ) -> Result<ResolvedUniverse> {
        let raw = store.available_assets(Some(first_date), Some(last_date))?;
        let mut assets = filtered_universe(&raw, &self.excluded);

        let members = match &self.membership {
            Some(table) => {
                let all_assets = store.available_assets(None, None)?;
                let members = table.members_as_of(last_date, &all_assets);
                assets = assets.intersection(&members).cloned().collect();
                Some(members)
            }
            None => None,
        };

        debug!(
            %first_date,
            %last_date,
            raw = raw.len(),
            eligible = assets.len(),
            "resolved universe"
        );
        Ok(ResolvedUniverse { assets, members })
    }
}
