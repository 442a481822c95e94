//! Release-record validation engine
//!
//! Walks a record's releases oldest to newest, carrying the previous
//! release's version and repository set forward, and checks every declared
//! `(repo, commit)` pair against repository history:
//!
//! 1. the hash is well formed and the commit exists;
//! 2. a version that is already tagged is tagged at the declared commit;
//! 3. a version that is not yet tagged (a *new* release) is well formed, and
//!    its commit is either the previous release's commit or a descendant of
//!    it;
//! 4. new releases only appear as the last entry of the record.
//!
//! Records of the current series are additionally reconciled against the
//! governance list of repositories for the deliverable.
//!
//! Nothing stops the walk early. Each problem becomes a finding and the next
//! check runs, so one pass reports everything wrong with a record.

use super::report::{FindingKind, Report};
use crate::governance::GovernanceDirectory;
use crate::oracle::HistoryOracle;
use crate::policy::{ReleaseJobRequirements, ReleaseModelRules, VersionRules};
use crate::record::{DeliverableRecord, ProjectRef, Release, is_a_hash};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info};

/// Series name for deliverables released outside any series
pub const INDEPENDENT_SERIES: &str = "_independent";

/// Where the walk stands when a project reference is checked
struct Previous<'r> {
  version: Option<&'r str>,
  repos: BTreeSet<String>,
}

/// One validation run over one record
///
/// The engine owns the run-scoped memo of repositories already confirmed to
/// be independent; build a fresh engine for each record.
pub struct ValidationEngine<'a> {
  oracle: &'a dyn HistoryOracle,
  directory: &'a dyn GovernanceDirectory,
  versions: &'a dyn VersionRules,
  release_jobs: Option<&'a dyn ReleaseJobRequirements>,
  current_series: &'a str,
  independent_series: &'a str,
  confirmed_independent: HashSet<(String, String)>,
}

impl<'a> ValidationEngine<'a> {
  /// Create an engine with the built-in version rules
  pub fn new(oracle: &'a dyn HistoryOracle, directory: &'a dyn GovernanceDirectory, current_series: &'a str) -> Self {
    Self {
      oracle,
      directory,
      versions: &ReleaseModelRules,
      release_jobs: None,
      current_series,
      independent_series: INDEPENDENT_SERIES,
      confirmed_independent: HashSet::new(),
    }
  }

  /// Enforce CI release-job requirements for deliverables that ship artifacts
  pub fn with_release_jobs(mut self, release_jobs: &'a dyn ReleaseJobRequirements) -> Self {
    self.release_jobs = Some(release_jobs);
    self
  }

  /// Override the independent series sentinel
  pub fn with_independent_series(mut self, series: &'a str) -> Self {
    self.independent_series = series;
    self
  }

  /// Validate `record` into a fresh report
  pub fn validate(&mut self, record: &DeliverableRecord) -> Report {
    let mut report = Report::new();
    self.run(record, &mut report);
    report
  }

  fn run(&mut self, record: &DeliverableRecord, report: &mut Report) {
    if record.releases.is_empty() {
      report.error(
        FindingKind::Structural,
        format!("{} declares no releases", record.name),
      );
      return;
    }

    let last = record.releases.len() - 1;
    let mut previous = Previous {
      version: None,
      repos: BTreeSet::new(),
    };

    for (index, release) in record.releases.iter().enumerate() {
      if let Some(problem) = &release.problem {
        report.error(FindingKind::Structural, problem.clone());
        continue;
      }

      let mut has_new = false;
      for project in &release.projects {
        if let Some(problem) = &project.problem {
          report.error(FindingKind::Structural, problem.clone());
          continue;
        }
        has_new |= self.check_project(record, release, project, &previous, report);
      }

      if has_new && index != last {
        report.error(
          FindingKind::Integrity,
          format!(
            "new release {} must be listed last, with one new release per validation run",
            release.version
          ),
        );
      }

      previous = Previous {
        version: Some(release.version.as_str()),
        repos: release.repos(),
      };
    }

    if record.series == self.current_series {
      self.reconcile(record, report);
    }
  }

  fn is_independent(&self, record: &DeliverableRecord, repo: &str) -> bool {
    record.series == self.independent_series
      || self
        .confirmed_independent
        .contains(&(record.series.clone(), repo.to_string()))
      || self.directory.is_independent_repo(repo)
  }

  /// Check one `(repo, hash)` entry; returns whether it declares a new tag
  fn check_project(
    &mut self,
    record: &DeliverableRecord,
    release: &Release,
    project: &ProjectRef,
    previous: &Previous<'_>,
    report: &mut Report,
  ) -> bool {
    let repo = project.repo.as_str();
    let hash = project.hash.as_str();
    let version = release.version.as_str();
    let series_is_independent = record.series == self.independent_series;
    let independent = self.is_independent(record, repo);

    if record.ships_artifacts()
      && let Some(release_jobs) = self.release_jobs
    {
      for finding in release_jobs.require_release_jobs(repo, &record.release_model) {
        if finding.is_error {
          report.error(FindingKind::Policy, finding.message);
        } else {
          report.warning(FindingKind::Policy, finding.message);
        }
      }
    }

    if independent {
      if !series_is_independent {
        report.warning(
          FindingKind::Reconciliation,
          format!(
            "{} uses the independent release model and should be in the {} directory, not in {}",
            repo, self.independent_series, record.series
          ),
        );
      }
      self
        .confirmed_independent
        .insert((record.series.clone(), repo.to_string()));
    }

    if !is_a_hash(hash) {
      report.error(
        FindingKind::Structural,
        format!("{} version {} release from {:?}, which is not a hash", repo, version, hash),
      );
      return false;
    }

    match self.oracle.commit_exists(repo, hash) {
      Ok(true) => debug!(repo, hash, "commit found"),
      Ok(false) => report.error(FindingKind::Integrity, format!("No commit {} in {}", hash, repo)),
      Err(err) => report.error(
        FindingKind::OracleFailure,
        format!("Could not check for commit {} in {}: {}", hash, repo, err),
      ),
    }

    let tagged = match self.oracle.tag_exists(repo, version) {
      Ok(tagged) => tagged,
      Err(err) => {
        report.error(
          FindingKind::OracleFailure,
          format!("Could not check for version {} in {}: {}", version, repo, err),
        );
        return false;
      }
    };

    if tagged {
      match self.oracle.resolve_tag(repo, version) {
        Ok(actual) if actual == hash => debug!(repo, version, "already tagged at the declared commit"),
        Ok(actual) => report.error(
          FindingKind::Integrity,
          format!("Version {} in {} is on commit {} instead of {}", version, repo, actual, hash),
        ),
        Err(err) => report.error(
          FindingKind::OracleFailure,
          format!("Could not resolve version {} in {}: {}", version, repo, err),
        ),
      }
      return false;
    }

    info!(repo, version, "new version");
    let Some(previous_version) = previous.version else {
      return true;
    };

    if !previous.repos.contains(repo) {
      let listed: Vec<&str> = previous.repos.iter().map(|s| s.as_str()).collect();
      report.note(format!(
        "{} is not included in previous release {}: {}",
        repo,
        previous_version,
        listed.join(", ")
      ));
      return true;
    }

    for violation in self.versions.validate(version, &record.release_model) {
      report.error(
        FindingKind::Policy,
        format!("could not validate version {} for {}: {}", version, record.name, violation),
      );
    }

    let previous_hash = match self.oracle.resolve_tag(repo, previous_version) {
      Ok(previous_hash) => previous_hash,
      Err(err) => {
        report.error(
          FindingKind::OracleFailure,
          format!("Could not resolve previous version {} in {}: {}", previous_version, repo, err),
        );
        return true;
      }
    };

    if previous_hash == hash {
      debug!(repo, version, previous_version, "retagging the previous commit");
      return true;
    }

    if independent {
      report.warning(
        FindingKind::Reconciliation,
        format!(
          "skipping descendant test for independent project {} {}, verify branch manually",
          repo, version
        ),
      );
      return true;
    }

    let (kind, message) = match self.oracle.is_descendant(repo, &previous_hash, hash) {
      Ok(true) => {
        debug!(repo, version, "commit descends from previous release");
        return true;
      }
      Ok(false) => (
        FindingKind::Integrity,
        format!(
          "{} {} receiving {} is not a descendant of {} ({})",
          repo, hash, version, previous_version, previous_hash
        ),
      ),
      Err(err) => (
        FindingKind::OracleFailure,
        format!(
          "Could not check whether {} {} descends from {} ({}): {}",
          repo, hash, previous_version, previous_hash, err
        ),
      ),
    };
    report.error(kind, message);
    true
  }

  /// Compare the newest release's repositories with governance
  fn reconcile(&self, record: &DeliverableRecord, report: &mut Report) {
    let Some(final_release) = record.final_release() else {
      return;
    };

    let expected = self.directory.repositories_for(&record.name);
    if record.ships_artifacts() && expected.is_empty() {
      report.error(
        FindingKind::Reconciliation,
        format!("unable to find deliverable {} in the governance list", record.name),
      );
    }

    let actual = final_release.repos();
    for extra in actual.difference(&expected) {
      report.warning(
        FindingKind::Reconciliation,
        format!(
          "{} release {} includes repository {} that is not in the governance list",
          record.name, final_release.version, extra
        ),
      );
    }
    for missing in expected.difference(&actual) {
      report.warning(
        FindingKind::Reconciliation,
        format!(
          "{} release {} is missing {}, which the governance list assigns to this deliverable",
          record.name, final_release.version, missing
        ),
      );
    }
  }
}
