//! Parameter grids of strategy runs.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use ronda_allocate::Side;
use ronda_eval::{DriverConfig, SimulatorConfig};
use ronda_signals::ReturnMethod;
use ronda_strategy::{Family, LiquidationPolicy, StrategyConfig, StrategyKind};
use ronda_traits::Symbol;
use ronda_universe::MembershipTable;
use serde::{Deserialize, Serialize};

/// Names held by a one-sided cross-sectional basket; long-short splits it evenly.
const BASKET_SIZE: usize = 20;

/// Periods (months) of the full grid.
const PERIODS: [u32; 5] = [1, 3, 6, 9, 12];

/// Cartesian grid of ranking periods, holding periods, sides and families,
/// plus the simulation every run shares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct GridConfig {
    pub(crate) ranking_periods: Vec<u32>,
    pub(crate) holding_periods: Vec<u32>,
    pub(crate) sides: Vec<Side>,
    pub(crate) families: Vec<Family>,
    pub(crate) momentum_gap: u32,
    pub(crate) return_method: ReturnMethod,
    /// Replaces the default exclusion list when set.
    pub(crate) excluded: Option<Vec<Symbol>>,
    pub(crate) simulation: SimulatorConfig,
    pub(crate) workers: DriverConfig,
    pub(crate) liquidation: LiquidationPolicy,
    pub(crate) output_dir: Option<PathBuf>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            ranking_periods: PERIODS.to_vec(),
            holding_periods: PERIODS.to_vec(),
            sides: vec![Side::Short, Side::LongShort, Side::Long],
            families: vec![Family::TimeSeries, Family::CrossSectional],
            momentum_gap: 1,
            return_method: ReturnMethod::default(),
            excluded: None,
            simulation: SimulatorConfig::default(),
            workers: DriverConfig::default(),
            liquidation: LiquidationPolicy::default(),
            output_dir: None,
        }
    }
}

impl GridConfig {
    /// Reads a grid from a JSON file; missing fields take the full-grid defaults.
    pub(crate) fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading grid {}", path.display()))?;
        let grid: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing grid {}", path.display()))?;
        Ok(grid)
    }

    /// The grid in `path`, or the full grid.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::from_path)
    }

    /// One validated config per grid point, in J, K, side, family order.
    ///
    /// Fails when a point is invalid or two points share a descriptor, since
    /// both would persist to the same file.
    pub(crate) fn strategies(
        &self,
        membership: Option<&Arc<MembershipTable>>,
    ) -> Result<Vec<StrategyConfig>> {
        let mut configs = Vec::new();
        let mut seen = BTreeSet::new();

        for &ranking_period in &self.ranking_periods {
            for &holding_period in &self.holding_periods {
                for &side in &self.sides {
                    for &family in &self.families {
                        let mut config = self
                            .config_for(family, ranking_period, holding_period, side)
                            .with_momentum_gap(self.momentum_gap)
                            .with_return_method(self.return_method)
                            .with_calendar(self.simulation.calendar.clone());
                        if let Some(excluded) = &self.excluded {
                            config = config.with_excluded(excluded.iter().cloned());
                        }
                        if let Some(table) = membership {
                            config = config.with_membership(Arc::clone(table));
                        }
                        config
                            .validate()
                            .with_context(|| format!("grid point {}", config.descriptor()))?;
                        if !seen.insert(config.descriptor()) {
                            bail!("duplicate grid point {}", config.descriptor());
                        }
                        configs.push(config);
                    }
                }
            }
        }

        if configs.is_empty() {
            bail!("grid has no strategies");
        }
        Ok(configs)
    }

    fn config_for(
        &self,
        family: Family,
        ranking_period: u32,
        holding_period: u32,
        side: Side,
    ) -> StrategyConfig {
        match family {
            Family::CrossSectional => {
                let (winners, losers) = basket_split(side);
                StrategyConfig::cross_sectional(ranking_period, holding_period, winners, losers)
            }
            Family::TimeSeries => {
                let mut config = StrategyConfig::time_series(ranking_period, holding_period, side);
                if let StrategyKind::TimeSeries { liquidation, .. } = &mut config.kind {
                    *liquidation = self.liquidation;
                }
                config
            }
        }
    }
}

/// Winners and losers per cross-sectional basket.
const fn basket_split(side: Side) -> (usize, usize) {
    match side {
        Side::Long => (BASKET_SIZE, 0),
        Side::Short => (0, BASKET_SIZE),
        Side::LongShort => (BASKET_SIZE / 2, BASKET_SIZE / 2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_grid() {
        let configs = GridConfig::default().strategies(None).unwrap();
        assert_eq!(configs.len(), 5 * 5 * 3 * 2);
        assert_eq!(configs[0].descriptor(), "TSMOM_S_1_1");
        assert_eq!(configs[1].descriptor(), "CSMOM_S_1_1");
        assert_eq!(configs.last().unwrap().descriptor(), "CSMOM_L_12_12");
    }

    #[test]
    fn test_basket_split() {
        assert_eq!(basket_split(Side::Long), (20, 0));
        assert_eq!(basket_split(Side::Short), (0, 20));
        assert_eq!(basket_split(Side::LongShort), (10, 10));
    }

    #[test]
    fn test_partial_grid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.json");
        std::fs::write(
            &path,
            r#"{"ranking_periods": [9], "holding_periods": [9], "sides": ["long"],
                "families": ["time_series"], "liquidation": "trailing"}"#,
        )
        .unwrap();

        let grid = GridConfig::load(Some(&path)).unwrap();
        assert_eq!(grid.workers, DriverConfig::default());
        let configs = grid.strategies(None).unwrap();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].descriptor(), "TSMOM_L_9_9");
        assert!(matches!(
            configs[0].kind,
            StrategyKind::TimeSeries {
                liquidation: LiquidationPolicy::Trailing,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_grids() {
        let duplicate = GridConfig {
            ranking_periods: vec![3, 3],
            ..GridConfig::default()
        };
        assert!(duplicate.strategies(None).is_err());

        let zero = GridConfig {
            holding_periods: vec![0],
            ..GridConfig::default()
        };
        assert!(zero.strategies(None).is_err());

        let empty = GridConfig {
            families: Vec::new(),
            ..GridConfig::default()
        };
        assert!(empty.strategies(None).is_err());
    }

    #[test]
    fn test_shared_strategy_settings() {
        let grid = GridConfig {
            momentum_gap: 0,
            return_method: ReturnMethod::Compounded,
            excluded: Some(vec!["SBER".to_string()]),
            ..GridConfig::default()
        };
        let configs = grid.strategies(None).unwrap();
        assert!(configs.iter().all(|c| c.momentum_gap == 0
            && c.return_method == ReturnMethod::Compounded
            && c.excluded_symbols.len() == 1
            && c.excluded_symbols.contains("SBER")));

        let defaults = GridConfig::default().strategies(None).unwrap();
        assert!(defaults.iter().all(|c| c.momentum_gap == 1
            && c.return_method == ReturnMethod::PointToPoint
            && c.excluded_symbols.contains("TCSG")));
    }

    #[test]
    fn test_calendar_follows_simulation() {
        let mut grid = GridConfig::default();
        grid.simulation.calendar = "XNYS".to_string();
        let configs = grid.strategies(None).unwrap();
        assert!(configs.iter().all(|c| c.calendar == "XNYS"));
    }
}
