//! Universe resolution for the Ronda momentum engine.
//!
//! This crate provides the leaf collaborators the rebalancing engine needs
//! before it can rank anything:
//! - [`WeekdayCalendar`]: exchange sessions (weekdays minus listed holidays)
//! - [`InMemoryStore`]: a CSV-backed market-data store answering universe queries
//! - [`UniverseFilter`]: static exclusions plus point-in-time index membership
//!
//! # Example
//!
//! ```ignore
//! use ronda_universe::{InMemoryStore, UniverseFilter, WeekdayCalendar};
//!
//! let store = InMemoryStore::from_csv_path("data/prices.csv")?;
//! let calendar = WeekdayCalendar::default();
//! let filter = UniverseFilter::new(["FIVE", "TCSG"]);
//! let universe = filter.resolve(&store, first_date, last_date)?;
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

mod calendar;
mod filter;
mod membership;
mod store;

pub use calendar::{DEFAULT_CALENDAR, WeekdayCalendar};
pub use filter::{
    ResolvedUniverse, UniverseFilter, filtered_universe, forced_exits, point_in_time_filter,
};
pub use membership::{MEMBER_DELIMITER, MembershipRow, MembershipTable};
pub use store::InMemoryStore;
