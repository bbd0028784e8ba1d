//! Point-in-time index membership.
//!
//! A membership table records, per date, which tickers belonged to an index
//! from that date on. Lookups are as-of: a rebalance on date `t` sees the
//! latest row strictly before `t`, so a composition published on `t` itself
//! is not yet known.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use ronda_traits::{Date, Result, RondaError, Symbol};

/// Delimiter between tickers in the member column.
pub const MEMBER_DELIMITER: char = ';';

/// Index composition valid from `date`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipRow {
    /// First date the composition applies.
    pub date: Date,
    /// Member tickers.
    pub members: BTreeSet<Symbol>,
}

/// Date-indexed index membership table.
///
/// Rows are kept sorted by date and the table is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipTable {
    rows: Vec<MembershipRow>,
}

impl MembershipTable {
    /// Builds a table from rows in any order.
    ///
    /// Fails on an empty input or a repeated date.
    pub fn new(mut rows: Vec<MembershipRow>) -> Result<Self> {
        if rows.is_empty() {
            return Err(RondaError::InvalidConfig(
                "membership table has no rows".to_string(),
            ));
        }
        rows.sort_by_key(|r| r.date);
        if let Some(pair) = rows.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(RondaError::InvalidData(format!(
                "membership table repeats date {}",
                pair[0].date
            )));
        }
        Ok(Self { rows })
    }

    /// Parses `date,members` CSV input where members are `;`-separated tickers.
    ///
    /// The first column is the date, the second the member list; the header
    /// names are not interpreted.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let (Some(date), Some(members)) = (record.get(0), record.get(1)) else {
                return Err(RondaError::InvalidData(format!(
                    "membership row needs date and members: {record:?}"
                )));
            };
            let date = Date::parse_from_str(date.trim(), "%Y-%m-%d")
                .map_err(|e| RondaError::InvalidData(format!("Invalid date format: {e}")))?;
            rows.push(MembershipRow {
                date,
                members: split_members(members),
            });
        }
        Self::new(rows)
    }

    /// Loads a membership CSV file from disk.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_csv_reader(file)
    }

    /// The row in force for a rebalance on `as_of`.
    ///
    /// Returns the latest row dated strictly before `as_of`; when every row
    /// is dated on or after `as_of`, falls back to the earliest row.
    pub fn as_of(&self, as_of: Date) -> &MembershipRow {
        let prior = self.rows.partition_point(|r| r.date < as_of);
        &self.rows[prior.saturating_sub(1)]
    }

    /// Members in force on `as_of` that also appear in `all_assets`.
    pub fn members_as_of(&self, as_of: Date, all_assets: &BTreeSet<Symbol>) -> BTreeSet<Symbol> {
        self.as_of(as_of)
            .members
            .intersection(all_assets)
            .cloned()
            .collect()
    }

    /// All rows, ascending by date.
    pub fn rows(&self) -> &[MembershipRow] {
        &self.rows
    }
}

fn split_members(raw: &str) -> BTreeSet<Symbol> {
    raw.split(MEMBER_DELIMITER)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
