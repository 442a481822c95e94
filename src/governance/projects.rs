//! Governance directory loaded from a `projects.yaml` file
//!
//! ```yaml
//! nova:
//!   ptl: ...
//!   deliverables:
//!     nova:
//!       repos: [openstack/nova]
//!       tags: [release:cycle-with-milestones]
//!     python-novaclient:
//!       repos: [openstack/python-novaclient]
//! ```

use super::{GovernanceDirectory, INDEPENDENT_TAG};
use crate::core::error::{GuardError, GuardResult, RecordError, ResultExt};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
struct TeamEntry {
  #[serde(default)]
  deliverables: BTreeMap<String, DeliverableEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DeliverableEntry {
  #[serde(default)]
  repos: Vec<String>,
  #[serde(default)]
  tags: Vec<String>,
}

/// Governance data keyed by team
#[derive(Debug, Clone, Default)]
pub struct ProjectsFile {
  teams: BTreeMap<String, TeamEntry>,
  independent: BTreeSet<String>,
}

impl ProjectsFile {
  /// Parse governance YAML
  pub fn from_yaml(content: &str, origin: &Path) -> GuardResult<Self> {
    let teams: BTreeMap<String, TeamEntry> = serde_yaml::from_str(content).map_err(|e| {
      GuardError::Record(RecordError::Parse {
        path: origin.to_path_buf(),
        reason: e.to_string(),
      })
    })?;

    let mut file = Self {
      teams,
      independent: BTreeSet::new(),
    };
    file.index();
    Ok(file)
  }

  /// Load governance data from disk
  pub fn load(path: &Path) -> GuardResult<Self> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read governance data {}", path.display()))?;
    Self::from_yaml(&content, path)
  }

  /// Add or replace a deliverable
  pub fn insert_deliverable(&mut self, team: &str, deliverable: &str, repos: &[&str], tags: &[&str]) {
    self.teams.entry(team.to_string()).or_default().deliverables.insert(
      deliverable.to_string(),
      DeliverableEntry {
        repos: repos.iter().map(|s| s.to_string()).collect(),
        tags: tags.iter().map(|s| s.to_string()).collect(),
      },
    );
    self.index();
  }

  fn index(&mut self) {
    self.independent = self
      .teams
      .values()
      .flat_map(|team| team.deliverables.values())
      .filter(|d| d.tags.iter().any(|t| t == INDEPENDENT_TAG))
      .flat_map(|d| d.repos.iter().cloned())
      .collect();
  }
}

impl GovernanceDirectory for ProjectsFile {
  fn is_independent_repo(&self, repo: &str) -> bool {
    self.independent.contains(repo)
  }

  fn team_exists(&self, team: &str) -> bool {
    self.teams.contains_key(team)
  }

  fn repositories_for(&self, deliverable: &str) -> BTreeSet<String> {
    self
      .teams
      .values()
      .filter_map(|team| team.deliverables.get(deliverable))
      .flat_map(|d| d.repos.iter().cloned())
      .collect()
  }
}
