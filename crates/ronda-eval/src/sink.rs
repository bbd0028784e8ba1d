//! Persistence of completed runs.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use ronda_traits::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{PerformanceRecord, PerformanceSummary};

/// Destination of the analysis step.
pub trait RecordSink: Send + Sync {
    /// Stores one run's record and summary under its descriptor.
    fn persist(&self, record: &PerformanceRecord, summary: &PerformanceSummary) -> Result<()>;
}

/// What a [`JsonSink`] writes for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Headline figures.
    pub summary: PerformanceSummary,
    /// Full daily record.
    pub record: PerformanceRecord,
}

/// Writes `<descriptor>.json` files into one directory.
#[derive(Debug, Clone)]
pub struct JsonSink {
    dir: PathBuf,
}

impl JsonSink {
    /// Creates a sink writing into `dir`, created on first use.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File a run with `descriptor` is written to.
    pub fn path_for(&self, descriptor: &str) -> PathBuf {
        self.dir.join(format!("{descriptor}.json"))
    }

    /// Reads back a persisted report.
    pub fn load(&self, descriptor: &str) -> Result<RunReport> {
        let file = File::open(self.path_for(descriptor))?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

impl RecordSink for JsonSink {
    fn persist(&self, record: &PerformanceRecord, summary: &PerformanceSummary) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(&record.descriptor);
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(
            &mut writer,
            &RunReport {
                summary: summary.clone(),
                record: record.clone(),
            },
        )?;
        writer.flush()?;
        debug!(path = %path.display(), "persisted run");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DailyRecord;
    use ronda_traits::Date;
    use std::collections::BTreeMap;

    fn record() -> PerformanceRecord {
        PerformanceRecord {
            descriptor: "TSMOM_L_9_9".to_string(),
            capital_base: 1000.0,
            days: vec![DailyRecord {
                date: Date::from_ymd_opt(2024, 1, 3).unwrap(),
                portfolio_value: 1010.0,
                daily_return: 0.01,
                positions: BTreeMap::from([("SBER".to_string(), 2.5)]),
            }],
            transactions: Vec::new(),
        }
    }

    #[test]
    fn test_persist_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonSink::new(dir.path().join("runs"));
        let record = record();
        let summary = PerformanceSummary::from_record(&record);

        sink.persist(&record, &summary).unwrap();

        let path = dir.path().join("runs").join("TSMOM_L_9_9.json");
        assert!(path.exists());
        let report = sink.load("TSMOM_L_9_9").unwrap();
        assert_eq!(report.record, record);
        assert_eq!(report.summary.descriptor, "TSMOM_L_9_9");
    }

    #[test]
    fn test_persist_overwrites_same_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonSink::new(dir.path());
        let mut record = record();
        sink.persist(&record, &PerformanceSummary::from_record(&record)).unwrap();

        record.capital_base = 500.0;
        sink.persist(&record, &PerformanceSummary::from_record(&record)).unwrap();

        assert_eq!(sink.load("TSMOM_L_9_9").unwrap().record.capital_base, 500.0);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_load_missing_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonSink::new(dir.path());
        assert!(matches!(sink.load("CSMOM_L_1_1"), Err(ronda_traits::RondaError::Io(_))));
    }
}
