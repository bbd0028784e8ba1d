//! Calendar sessions command implementation.

use anyhow::Result;
use chrono::Datelike;
use ronda_traits::{Date, TradingCalendar};
use ronda_universe::WeekdayCalendar;

/// Prints the sessions of `calendar_id` between `start` and `end`, grouped by month.
pub(crate) fn list_sessions(start: Date, end: Date, calendar_id: &str) -> Result<()> {
    let sessions = WeekdayCalendar::default().sessions_in_range(start, end, calendar_id)?;

    println!("Calendar: {}", calendar_id);
    println!("Range:    {} to {}", start, end);
    println!("Sessions: {}", sessions.len());
    println!();

    for month in sessions.chunk_by(|a, b| (a.year(), a.month()) == (b.year(), b.month())) {
        let days: Vec<String> = month.iter().map(|d| format!("{:02}", d.day())).collect();
        println!(
            "{}-{:02}  {:>2}  {}",
            month[0].year(),
            month[0].month(),
            month.len(),
            days.join(" ")
        );
    }

    Ok(())
}
