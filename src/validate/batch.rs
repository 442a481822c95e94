//! Validate many record files on a bounded worker pool
//!
//! Each record gets its own engine and its own report; the oracle, governance
//! data and policy tables are shared read-only across workers. A record file
//! that cannot be loaded becomes a single structural finding for that file and
//! the batch carries on.

use super::engine::{INDEPENDENT_SERIES, ValidationEngine};
use super::report::{FindingKind, Report};
use crate::checks::{CheckContext, CheckRunner, LinkProbe};
use crate::core::error::GuardResult;
use crate::governance::GovernanceDirectory;
use crate::oracle::HistoryOracle;
use crate::policy::ReleaseJobRequirements;
use crate::record::load_record;
use crate::ui::progress::BatchProgress;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outcome for one record file
#[derive(Debug, Clone, Serialize)]
pub struct RecordReport {
  pub path: PathBuf,
  pub report: Report,
}

/// Shared collaborators for a batch run
pub struct BatchValidator<'a> {
  oracle: &'a dyn HistoryOracle,
  directory: &'a dyn GovernanceDirectory,
  release_jobs: Option<&'a dyn ReleaseJobRequirements>,
  checks: Option<&'a CheckRunner>,
  probe: Option<&'a dyn LinkProbe>,
  launchpad_api: &'a str,
  current_series: &'a str,
  independent_series: &'a str,
  jobs: usize,
}

impl<'a> BatchValidator<'a> {
  pub fn new(oracle: &'a dyn HistoryOracle, directory: &'a dyn GovernanceDirectory, current_series: &'a str) -> Self {
    Self {
      oracle,
      directory,
      release_jobs: None,
      checks: None,
      probe: None,
      launchpad_api: "",
      current_series,
      independent_series: INDEPENDENT_SERIES,
      jobs: 1,
    }
  }

  pub fn with_release_jobs(mut self, release_jobs: &'a dyn ReleaseJobRequirements) -> Self {
    self.release_jobs = Some(release_jobs);
    self
  }

  /// Run metadata checks before the history checks
  ///
  /// `probe` is `None` for offline runs; network-only checks are skipped.
  pub fn with_checks(mut self, checks: &'a CheckRunner, probe: Option<&'a dyn LinkProbe>, launchpad_api: &'a str) -> Self {
    self.checks = Some(checks);
    self.probe = probe;
    self.launchpad_api = launchpad_api;
    self
  }

  pub fn with_independent_series(mut self, series: &'a str) -> Self {
    self.independent_series = series;
    self
  }

  /// Number of records validated concurrently (at least 1)
  pub fn with_jobs(mut self, jobs: usize) -> Self {
    self.jobs = jobs.max(1);
    self
  }

  /// Validate every file; results keep the order of `paths`
  pub fn validate_files(&self, paths: &[PathBuf], progress: &BatchProgress) -> GuardResult<Vec<RecordReport>> {
    let pool = rayon::ThreadPoolBuilder::new().num_threads(self.jobs).build()?;
    info!(records = paths.len(), jobs = self.jobs, "validating records");

    let reports: Vec<RecordReport> = pool.install(|| {
      paths
        .par_iter()
        .map(|path| {
          let report = self.validate_file(path);
          progress.inc();
          RecordReport {
            path: path.clone(),
            report,
          }
        })
        .collect()
    });
    Ok(reports)
  }

  /// Load and validate one file
  pub fn validate_file(&self, path: &Path) -> Report {
    let mut report = Report::new();

    let record = match load_record(path) {
      Ok(record) => record,
      Err(err) => {
        warn!(path = %path.display(), error = %err, "could not load record");
        report.error(FindingKind::Structural, format!("Could not load {}: {}", path.display(), err));
        return report;
      }
    };

    info!(deliverable = %record.name, series = %record.series, "validating");

    if let Some(checks) = self.checks {
      let ctx = CheckContext {
        record: &record,
        directory: self.directory,
        probe: self.probe,
        launchpad_api: self.launchpad_api,
      };
      checks.run_all(&ctx, &mut report);
    }

    let mut engine = ValidationEngine::new(self.oracle, self.directory, self.current_series)
      .with_independent_series(self.independent_series);
    if let Some(release_jobs) = self.release_jobs {
      engine = engine.with_release_jobs(release_jobs);
    }
    report.append(engine.validate(&record));

    report
  }
}
