//! Ronda CLI binary.
//!
//! Runs grids of momentum backtests and inspects their configuration.

mod cmd;
mod grid;

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ronda_traits::Date;
use ronda_universe::DEFAULT_CALENDAR;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ronda")]
#[command(about = "Momentum rebalancing engine for equity backtests", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at debug level (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a parameter grid of backtests
    Run {
        /// Grid file (JSON); the full J x K x side grid when omitted
        #[arg(short, long)]
        grid: Option<PathBuf>,

        /// Price file (CSV with date,symbol,close); defaults to $RONDA_DATA
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Point-in-time membership file (CSV with date,members)
        #[arg(short, long)]
        membership: Option<PathBuf>,

        /// Output directory; defaults to the grid's, then $RONDA_OUTPUT
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the strategies a grid or a single config describes
    Describe {
        /// Single strategy config (JSON)
        #[arg(short, long, conflicts_with = "grid")]
        config: Option<PathBuf>,

        /// Grid file (JSON); the full grid when neither file is given
        #[arg(short, long)]
        grid: Option<PathBuf>,
    },

    /// List the trading sessions of a calendar
    Sessions {
        /// First date (YYYY-MM-DD)
        #[arg(long)]
        start: Date,

        /// Last date (YYYY-MM-DD)
        #[arg(long)]
        end: Date,

        /// Exchange calendar
        #[arg(short, long, default_value = DEFAULT_CALENDAR)]
        calendar: String,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            grid,
            data,
            membership,
            output,
        } => {
            cmd::run::run_grid(grid, data, membership, output).await?;
        }
        Commands::Describe { config, grid } => {
            cmd::describe::describe(config, grid)?;
        }
        Commands::Sessions {
            start,
            end,
            calendar,
        } => {
            cmd::sessions::list_sessions(start, end, &calendar)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
