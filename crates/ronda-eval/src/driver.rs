//! Parallel run driver.
//!
//! Every strategy becomes one task. A task first waits for a simulation slot
//! and runs its backtest on the blocking pool, then waits for an analysis
//! slot to summarize and persist the record. The two semaphores keep CPU-bound
//! simulation and I/O-bound persistence from starving each other.
//!
//! A failing or panicking task only marks its own outcome as failed.

use std::any::Any;
use std::sync::Arc;

use ronda_strategy::RebalanceStrategy;
use ronda_traits::{Result, RondaError};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tracing::{info, warn};

use crate::{PerformanceSummary, RecordSink, Simulator};

/// Worker pool sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Backtests running at once.
    pub run_workers: usize,
    /// Analysis and persistence steps running at once.
    pub analysis_workers: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            run_workers: 8,
            analysis_workers: 4,
        }
    }
}

/// How one task ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunStatus {
    /// Simulated, analyzed and persisted.
    Completed(PerformanceSummary),
    /// Failed at any step; the message says where.
    Failed(String),
}

/// Outcome of one task, keyed by run descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// Descriptor of the run.
    pub descriptor: String,
    /// Final status.
    pub status: RunStatus,
}

impl RunOutcome {
    /// Whether the run completed.
    pub const fn is_success(&self) -> bool {
        matches!(self.status, RunStatus::Completed(_))
    }
}

/// Runs many strategies concurrently against one simulator.
#[derive(Clone)]
pub struct RunDriver {
    simulator: Arc<Simulator>,
    sink: Arc<dyn RecordSink>,
    config: DriverConfig,
}

impl std::fmt::Debug for RunDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunDriver")
            .field("simulator", &self.simulator)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RunDriver {
    /// Creates a driver.
    pub fn new(simulator: Arc<Simulator>, sink: Arc<dyn RecordSink>, config: DriverConfig) -> Self {
        Self {
            simulator,
            sink,
            config,
        }
    }

    /// Runs every strategy and returns one outcome per strategy, in input order.
    ///
    /// Tasks are never cancelled and carry no timeout.
    pub async fn run_all(&self, strategies: Vec<Arc<dyn RebalanceStrategy>>) -> Vec<RunOutcome> {
        let run_slots = Arc::new(Semaphore::new(self.config.run_workers.max(1)));
        let analysis_slots = Arc::new(Semaphore::new(self.config.analysis_workers.max(1)));

        info!(
            runs = strategies.len(),
            run_workers = self.config.run_workers,
            analysis_workers = self.config.analysis_workers,
            "starting batch"
        );

        let mut handles = Vec::with_capacity(strategies.len());
        for strategy in strategies {
            let descriptor = strategy.descriptor();
            let task = run_one(
                descriptor.clone(),
                strategy,
                Arc::clone(&self.simulator),
                Arc::clone(&self.sink),
                Arc::clone(&run_slots),
                Arc::clone(&analysis_slots),
            );
            handles.push((descriptor, tokio::spawn(task)));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (descriptor, handle) in handles {
            let status = match handle.await {
                Ok(Ok(summary)) => RunStatus::Completed(summary),
                Ok(Err(e)) => RunStatus::Failed(e.to_string()),
                Err(e) => RunStatus::Failed(join_failure(&descriptor, e).to_string()),
            };
            if let RunStatus::Failed(reason) = &status {
                warn!(%descriptor, %reason, "run failed");
            }
            outcomes.push(RunOutcome { descriptor, status });
        }

        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        info!(completed = outcomes.len() - failed, failed, "batch finished");
        outcomes
    }
}

async fn run_one(
    descriptor: String,
    strategy: Arc<dyn RebalanceStrategy>,
    simulator: Arc<Simulator>,
    sink: Arc<dyn RecordSink>,
    run_slots: Arc<Semaphore>,
    analysis_slots: Arc<Semaphore>,
) -> Result<PerformanceSummary> {
    let record = {
        let _permit = run_slots
            .acquire_owned()
            .await
            .map_err(|e| run_error(&descriptor, e))?;
        tokio::task::spawn_blocking(move || simulator.run(strategy.as_ref()))
            .await
            .map_err(|e| join_failure(&descriptor, e))??
    };

    let _permit = analysis_slots
        .acquire_owned()
        .await
        .map_err(|e| run_error(&descriptor, e))?;
    let summary = tokio::task::spawn_blocking(move || {
        let summary = PerformanceSummary::from_record(&record);
        sink.persist(&record, &summary)?;
        Ok::<_, RondaError>(summary)
    })
    .await
    .map_err(|e| join_failure(&descriptor, e))??;

    info!(
        %descriptor,
        total_return = summary.total_return,
        sharpe = ?summary.sharpe_ratio,
        max_drawdown = summary.max_drawdown,
        "run completed"
    );
    Ok(summary)
}

fn run_error(descriptor: &str, reason: impl std::fmt::Display) -> RondaError {
    RondaError::Run {
        descriptor: descriptor.to_string(),
        reason: reason.to_string(),
    }
}

fn join_failure(descriptor: &str, error: JoinError) -> RondaError {
    if error.is_panic() {
        run_error(descriptor, format!("panicked: {}", panic_message(error.into_panic())))
    } else {
        run_error(descriptor, error)
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
