//! Governance data: which teams exist, which repositories belong to which
//! deliverable, and which repositories follow the independent release model

mod projects;

use std::collections::BTreeSet;

pub use projects::ProjectsFile;

/// Deliverable tag marking repositories released outside any series
pub const INDEPENDENT_TAG: &str = "release:independent";

/// Read-only view of governance data
pub trait GovernanceDirectory: Send + Sync {
  /// Whether `repo` uses the independent release model
  fn is_independent_repo(&self, repo: &str) -> bool;

  /// Whether `team` is a known team
  fn team_exists(&self, team: &str) -> bool;

  /// Repositories governance assigns to `deliverable`
  fn repositories_for(&self, deliverable: &str) -> BTreeSet<String>;
}
