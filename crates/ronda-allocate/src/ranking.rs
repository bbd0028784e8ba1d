//! Splitting a ranked return series into winners and losers.

use ronda_traits::Symbol;

/// Minimum window return for an asset to qualify as a winner (+1%).
pub const WINNER_THRESHOLD: f64 = 0.01;

/// Winners and losers selected from one ranked return series.
///
/// Losers have strictly negative returns and winners returns above
/// [`WINNER_THRESHOLD`], so the two sides never overlap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankingSplit {
    /// Lowest negative returns, most negative first.
    pub losers: Vec<(Symbol, f64)>,
    /// Highest returns above the threshold, in ascending order.
    pub winners: Vec<(Symbol, f64)>,
}

impl RankingSplit {
    /// Splits returns sorted ascending.
    ///
    /// Takes the `losers_amount` lowest strictly negative returns and the
    /// `winners_amount` highest returns above [`WINNER_THRESHOLD`]. Either
    /// side may come back shorter than requested, or empty.
    pub fn from_ranked(
        ranked: &[(Symbol, f64)],
        winners_amount: usize,
        losers_amount: usize,
    ) -> Self {
        let losers = ranked
            .iter()
            .filter(|(_, r)| *r < 0.0)
            .take(losers_amount)
            .cloned()
            .collect();

        let above: Vec<&(Symbol, f64)> = ranked
            .iter()
            .filter(|(_, r)| *r > WINNER_THRESHOLD)
            .collect();
        let winners = above[above.len().saturating_sub(winners_amount)..]
            .iter()
            .map(|&w| w.clone())
            .collect();

        Self { losers, winners }
    }

    /// Total number of selected assets.
    pub fn len(&self) -> usize {
        self.losers.len() + self.winners.len()
    }

    /// Whether neither side selected anything.
    pub fn is_empty(&self) -> bool {
        self.losers.is_empty() && self.winners.is_empty()
    }
}
