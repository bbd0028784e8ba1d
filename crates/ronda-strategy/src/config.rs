//! Strategy configuration and run descriptors.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use ronda_allocate::Side;
use ronda_signals::{ReturnMethod, VolatilityMethod};
use ronda_traits::{Result, RondaError, Symbol};
use ronda_universe::{DEFAULT_CALENDAR, MembershipTable, UniverseFilter};
use serde::{Deserialize, Serialize};

use crate::LiquidationPolicy;

/// Tickers excluded from every universe unless a config overrides the list.
pub const DEFAULT_EXCLUDED: &[&str] = &[
    "FIVE", "KZOSP", "NSVZ", "RKKE", "TRNFP", "TCSG", "ENPG", "KLSB", "UNAC", "TGKN", "KRKNP",
    "KROT", "MSST", "PRFN", "DASB", "TGKA",
];

/// Longest ranking window plus momentum gap accepted, in months.
pub const MAX_LOOKBACK_MONTHS: u32 = 600;

/// Strategy family, as used in run descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    /// Cross-sectional momentum (laddered equal-weight baskets).
    CrossSectional,
    /// Time-series momentum (volatility-scaled, single countdown).
    TimeSeries,
}

impl Family {
    /// Code used in run descriptors.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::CrossSectional => "CSMOM",
            Self::TimeSeries => "TSMOM",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Family-specific parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum StrategyKind {
    /// Rank assets against each other and ladder equal-weight baskets.
    CrossSectional {
        /// Number of top performers bought per basket.
        winners_amount: usize,
        /// Number of bottom performers sold short per basket.
        losers_amount: usize,
    },
    /// Trade each asset on the sign of its own return, sized by inverse volatility.
    TimeSeries {
        /// Directional filter on returns.
        #[serde(default)]
        side: Side,
        /// Target volatility numerator of the inverse-volatility score.
        #[serde(default = "default_volatility_scale")]
        volatility_scale: f64,
        /// Trailing daily returns in the volatility estimate.
        #[serde(default = "default_volatility_window")]
        volatility_window: usize,
        /// Realized volatility estimator.
        #[serde(default)]
        volatility_method: VolatilityMethod,
        /// When positions are closed relative to re-entry.
        #[serde(default)]
        liquidation: LiquidationPolicy,
    },
}

const fn default_volatility_scale() -> f64 {
    0.4
}

const fn default_volatility_window() -> usize {
    242
}

fn default_excluded() -> BTreeSet<Symbol> {
    DEFAULT_EXCLUDED.iter().map(|s| s.to_string()).collect()
}

fn default_calendar() -> String {
    DEFAULT_CALENDAR.to_string()
}

const fn default_one() -> u32 {
    1
}

const fn default_three() -> u32 {
    3
}

/// Immutable parameters of one strategy run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Months between the end of the ranking window and the rebalance date.
    #[serde(default = "default_one")]
    pub momentum_gap: u32,
    /// Months of lookback in the ranking window.
    #[serde(default = "default_three")]
    pub ranking_period: u32,
    /// Cycles a basket (or time-series position set) stays open.
    #[serde(default = "default_three")]
    pub holding_period: u32,
    /// Tickers never traded.
    #[serde(default = "default_excluded")]
    pub excluded_symbols: BTreeSet<Symbol>,
    /// Exchange calendar resolving sessions.
    #[serde(default = "default_calendar")]
    pub calendar: String,
    /// Window return algorithm.
    #[serde(default)]
    pub return_method: ReturnMethod,
    /// Family-specific parameters.
    pub kind: StrategyKind,
    /// Point-in-time index membership, loaded separately from the config file.
    #[serde(skip)]
    pub membership: Option<Arc<MembershipTable>>,
}

impl StrategyConfig {
    /// Cross-sectional config with the default gap, calendar and exclusions.
    pub fn cross_sectional(
        ranking_period: u32,
        holding_period: u32,
        winners_amount: usize,
        losers_amount: usize,
    ) -> Self {
        Self::with_kind(
            ranking_period,
            holding_period,
            StrategyKind::CrossSectional {
                winners_amount,
                losers_amount,
            },
        )
    }

    /// Time-series config with the default volatility settings.
    pub fn time_series(ranking_period: u32, holding_period: u32, side: Side) -> Self {
        Self::with_kind(
            ranking_period,
            holding_period,
            StrategyKind::TimeSeries {
                side,
                volatility_scale: default_volatility_scale(),
                volatility_window: default_volatility_window(),
                volatility_method: VolatilityMethod::default(),
                liquidation: LiquidationPolicy::default(),
            },
        )
    }

    fn with_kind(ranking_period: u32, holding_period: u32, kind: StrategyKind) -> Self {
        Self {
            momentum_gap: 1,
            ranking_period,
            holding_period,
            excluded_symbols: default_excluded(),
            calendar: default_calendar(),
            return_method: ReturnMethod::default(),
            kind,
            membership: None,
        }
    }

    /// Sets the gap between window end and rebalance.
    #[must_use]
    pub const fn with_momentum_gap(mut self, momentum_gap: u32) -> Self {
        self.momentum_gap = momentum_gap;
        self
    }

    /// Replaces the static exclusion list.
    #[must_use]
    pub fn with_excluded<S: Into<Symbol>>(mut self, excluded: impl IntoIterator<Item = S>) -> Self {
        self.excluded_symbols = excluded.into_iter().map(Into::into).collect();
        self
    }

    /// Attaches a point-in-time membership table.
    #[must_use]
    pub fn with_membership(mut self, table: Arc<MembershipTable>) -> Self {
        self.membership = Some(table);
        self
    }

    /// Selects the window return algorithm.
    #[must_use]
    pub const fn with_return_method(mut self, method: ReturnMethod) -> Self {
        self.return_method = method;
        self
    }

    /// Selects the exchange calendar.
    #[must_use]
    pub fn with_calendar(mut self, calendar: impl Into<String>) -> Self {
        self.calendar = calendar.into();
        self
    }

    /// Strategy family.
    pub const fn family(&self) -> Family {
        match self.kind {
            StrategyKind::CrossSectional { .. } => Family::CrossSectional,
            StrategyKind::TimeSeries { .. } => Family::TimeSeries,
        }
    }

    /// Traded side(s).
    ///
    /// Cross-sectional configs derive it from the winners/losers amounts.
    pub const fn side(&self) -> Side {
        match self.kind {
            StrategyKind::CrossSectional {
                winners_amount,
                losers_amount,
            } => match (winners_amount > 0, losers_amount > 0) {
                (true, false) => Side::Long,
                (false, true) => Side::Short,
                _ => Side::LongShort,
            },
            StrategyKind::TimeSeries { side, .. } => side,
        }
    }

    /// Persistence key: `<FAMILY>_<SIDE>_<ranking_period>_<holding_period>`.
    pub fn descriptor(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.family().code(),
            self.side().code(),
            self.ranking_period,
            self.holding_period
        )
    }

    /// Universe filter built from the exclusions and membership table.
    pub fn universe_filter(&self) -> UniverseFilter {
        let filter = UniverseFilter::new(self.excluded_symbols.iter().cloned());
        match &self.membership {
            Some(table) => filter.with_membership(Arc::clone(table)),
            None => filter,
        }
    }

    /// Checks the invariants every run relies on.
    pub fn validate(&self) -> Result<()> {
        if self.ranking_period == 0 {
            return Err(RondaError::InvalidConfig(
                "ranking_period must be at least 1".to_string(),
            ));
        }
        if self.holding_period == 0 {
            return Err(RondaError::InvalidConfig(
                "holding_period must be at least 1".to_string(),
            ));
        }
        if u64::from(self.ranking_period) + u64::from(self.momentum_gap)
            > u64::from(MAX_LOOKBACK_MONTHS)
        {
            return Err(RondaError::InvalidConfig(format!(
                "ranking_period + momentum_gap must not exceed {MAX_LOOKBACK_MONTHS} months"
            )));
        }
        match self.kind {
            StrategyKind::CrossSectional {
                winners_amount: 0,
                losers_amount: 0,
            } => Err(RondaError::InvalidConfig(
                "winners_amount or losers_amount must be positive".to_string(),
            )),
            StrategyKind::TimeSeries {
                volatility_window, ..
            } if volatility_window < 2 => Err(RondaError::InvalidConfig(
                "volatility_window must be at least 2".to_string(),
            )),
            StrategyKind::TimeSeries {
                volatility_scale, ..
            } if !(volatility_scale.is_finite() && volatility_scale > 0.0) => {
                Err(RondaError::InvalidConfig(
                    "volatility_scale must be positive".to_string(),
                ))
            }
            _ => Ok(()),
        }
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self::cross_sectional(3, 3, 10, 10)
    }
}

impl fmt::Display for StrategyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.descriptor())?;
        writeln!(f, "  Ranking period:  {} months", self.ranking_period)?;
        writeln!(f, "  Holding period:  {} months", self.holding_period)?;
        writeln!(f, "  Momentum gap:    {} months", self.momentum_gap)?;
        writeln!(f, "  Return method:   {}", self.return_method.name())?;
        match &self.kind {
            StrategyKind::CrossSectional {
                winners_amount,
                losers_amount,
            } => {
                writeln!(f, "  Winners/losers:  {winners_amount}/{losers_amount}")?;
                write!(f, "  Rebalance:       equal weight, laddered baskets")
            }
            StrategyKind::TimeSeries {
                volatility_scale,
                volatility_window,
                liquidation,
                ..
            } => {
                writeln!(f, "  Vol window:      {volatility_window}")?;
                writeln!(f, "  Liquidation:     {liquidation:?}")?;
                write!(
                    f,
                    "  Rebalance:       volatility-weighted scale ({:.2}%)",
                    volatility_scale * 100.0
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_time_series() {
        let config = StrategyConfig::time_series(9, 9, Side::Long);
        assert_eq!(config.descriptor(), "TSMOM_L_9_9");
    }

    #[test]
    fn test_descriptor_cross_sectional_sides() {
        assert_eq!(StrategyConfig::cross_sectional(3, 6, 20, 0).descriptor(), "CSMOM_L_3_6");
        assert_eq!(StrategyConfig::cross_sectional(3, 6, 0, 20).descriptor(), "CSMOM_S_3_6");
        assert_eq!(StrategyConfig::cross_sectional(3, 6, 10, 10).descriptor(), "CSMOM_LS_3_6");
    }

    #[test]
    fn test_descriptor_stable_and_unique() {
        let a = StrategyConfig::time_series(1, 12, Side::Short);
        let b = StrategyConfig::time_series(1, 12, Side::Short);
        assert_eq!(a.descriptor(), b.descriptor());

        let mut seen = BTreeSet::new();
        for j in [1, 3, 6, 9, 12] {
            for k in [1, 3, 6, 9, 12] {
                for side in [Side::Short, Side::LongShort, Side::Long] {
                    let config = StrategyConfig::time_series(j, k, side);
                    assert!(seen.insert(config.descriptor()));
                }
            }
        }
        assert_eq!(seen.len(), 75);
    }

    #[test]
    fn test_validate() {
        assert!(StrategyConfig::default().validate().is_ok());
        assert!(StrategyConfig::cross_sectional(3, 3, 0, 0).validate().is_err());
        assert!(StrategyConfig::cross_sectional(0, 3, 1, 0).validate().is_err());
        assert!(StrategyConfig::cross_sectional(3, 0, 1, 0).validate().is_err());

        let mut ts = StrategyConfig::time_series(3, 3, Side::Long);
        assert!(ts.validate().is_ok());
        if let StrategyKind::TimeSeries {
            volatility_window, ..
        } = &mut ts.kind
        {
            *volatility_window = 1;
        }
        assert!(ts.validate().is_err());
    }

    #[test]
    fn test_validate_bounds_lookback() {
        let longest = StrategyConfig::cross_sectional(MAX_LOOKBACK_MONTHS - 1, 3, 1, 0);
        assert!(longest.validate().is_ok());

        let too_long = StrategyConfig::cross_sectional(MAX_LOOKBACK_MONTHS, 3, 1, 0);
        assert!(matches!(too_long.validate(), Err(RondaError::InvalidConfig(_))));

        let overflowing = StrategyConfig::time_series(u32::MAX, 3, Side::Long)
            .with_momentum_gap(u32::MAX);
        assert!(matches!(overflowing.validate(), Err(RondaError::InvalidConfig(_))));
    }

    #[test]
    fn test_default_exclusions() {
        let config = StrategyConfig::default();
        assert_eq!(config.excluded_symbols.len(), DEFAULT_EXCLUDED.len());
        assert!(config.excluded_symbols.contains("TCSG"));
        assert_eq!(config.calendar, "XMOS");
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{
            "ranking_period": 6,
            "holding_period": 1,
            "kind": { "family": "time_series", "side": "short" }
        }"#;
        let config: StrategyConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.momentum_gap, 1);
        assert_eq!(config.descriptor(), "TSMOM_S_6_1");
        assert!(config.membership.is_none());
        match config.kind {
            StrategyKind::TimeSeries {
                volatility_window,
                volatility_scale,
                ..
            } => {
                assert_eq!(volatility_window, 242);
                assert!((volatility_scale - 0.4).abs() < 1e-12);
            }
            StrategyKind::CrossSectional { .. } => panic!("expected time series"),
        }
    }

    #[test]
    fn test_display_mentions_descriptor() {
        let text = StrategyConfig::time_series(3, 3, Side::LongShort).to_string();
        assert!(text.starts_with("TSMOM_LS_3_3"));
        assert!(text.contains("40.00%"));
    }
}
