//! Grid run command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use ronda_eval::{JsonSink, RunDriver, RunOutcome, RunStatus, Simulator};
use ronda_strategy::{MarketData, RebalanceStrategy, build_strategy};
use ronda_traits::TradingCalendar;
use ronda_universe::{InMemoryStore, MembershipTable, WeekdayCalendar};
use tracing::info;

use crate::grid::GridConfig;

const DATA_VAR: &str = "RONDA_DATA";
const OUTPUT_VAR: &str = "RONDA_OUTPUT";
const DEFAULT_OUTPUT: &str = "results";

/// Runs every strategy of a grid and prints a summary table.
pub(crate) async fn run_grid(
    grid_path: Option<PathBuf>,
    data: Option<PathBuf>,
    membership: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let grid = GridConfig::load(grid_path.as_deref())?;

    let data = match data {
        Some(path) => path,
        None => dotenvy::var(DATA_VAR)
            .map(PathBuf::from)
            .with_context(|| format!("no price file given and {} is not set", DATA_VAR))?,
    };
    let output = output
        .or_else(|| grid.output_dir.clone())
        .or_else(|| dotenvy::var(OUTPUT_VAR).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let store = InMemoryStore::from_csv_path(&data)
        .with_context(|| format!("loading prices from {}", data.display()))?;
    let membership = membership
        .map(|path| {
            MembershipTable::from_csv_path(&path)
                .with_context(|| format!("loading membership from {}", path.display()))
        })
        .transpose()?
        .map(Arc::new);

    let calendar = WeekdayCalendar::default();
    calendar
        .sessions_in_range(grid.simulation.start, grid.simulation.start, &grid.simulation.calendar)
        .context("resolving the simulation calendar")?;

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                     Momentum Grid Run                        ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("Prices:   {} ({} assets)", data.display(), store.len());
    println!(
        "Period:   {} to {}",
        grid.simulation.start, grid.simulation.end
    );
    println!("Capital:  {:.0}", grid.simulation.capital_base);
    println!("Output:   {}", output.display());
    println!();

    let market = MarketData::new(Arc::new(calendar), Arc::new(store));
    let strategies = grid
        .strategies(membership.as_ref())?
        .into_iter()
        .map(|config| build_strategy(config, market.clone()))
        .collect::<ronda_traits::Result<Vec<Arc<dyn RebalanceStrategy>>>>()?;

    info!(runs = strategies.len(), "grid resolved");

    let simulator = Simulator::new(grid.simulation.clone(), market)?;
    let driver = RunDriver::new(
        Arc::new(simulator),
        Arc::new(JsonSink::new(output.clone())),
        grid.workers,
    );
    let outcomes = driver.run_all(strategies).await;

    print_outcomes(&outcomes);

    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    if failed > 0 {
        bail!("{} of {} runs failed", failed, outcomes.len());
    }
    Ok(())
}

fn print_outcomes(outcomes: &[RunOutcome]) {
    println!(
        "{:<16} {:>10} {:>10} {:>8} {:>9} {:>7}",
        "Run", "Total", "Annual", "Sharpe", "Max DD", "Fills"
    );
    println!("{}", "-".repeat(65));

    for outcome in outcomes {
        match &outcome.status {
            RunStatus::Completed(summary) => {
                let annual = summary
                    .annualized_return
                    .map_or_else(|| "N/A".to_string(), |r| format!("{:.2}%", r * 100.0));
                let sharpe = summary
                    .sharpe_ratio
                    .map_or_else(|| "N/A".to_string(), |s| format!("{:.2}", s));
                println!(
                    "{:<16} {:>9.2}% {:>10} {:>8} {:>8.2}% {:>7}",
                    outcome.descriptor,
                    summary.total_return * 100.0,
                    annual,
                    sharpe,
                    summary.max_drawdown * 100.0,
                    summary.transactions
                );
            }
            RunStatus::Failed(reason) => {
                println!("{:<16} FAILED: {}", outcome.descriptor, reason);
            }
        }
    }
    println!();
}
