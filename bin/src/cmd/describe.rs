//! Describe command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use ronda_strategy::StrategyConfig;

use crate::grid::GridConfig;

/// Prints one config in full, or the runs of a grid.
pub(crate) fn describe(config: Option<PathBuf>, grid: Option<PathBuf>) -> Result<()> {
    if let Some(path) = config {
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: StrategyConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        print!("{}", config);
        return Ok(());
    }

    let grid = GridConfig::load(grid.as_deref())?;
    let configs = grid.strategies(None)?;

    println!(
        "Period:   {} to {} on {}",
        grid.simulation.start, grid.simulation.end, grid.simulation.calendar
    );
    println!(
        "Workers:  {} runs, {} analysis",
        grid.workers.run_workers, grid.workers.analysis_workers
    );
    println!(
        "Ranking:  {}-month gap, {} returns",
        grid.momentum_gap,
        grid.return_method.name()
    );
    println!("Runs:     {}", configs.len());
    println!();

    for config in &configs {
        println!("  {}", config.descriptor());
    }
    println!();

    Ok(())
}
