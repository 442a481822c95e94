//! Deliverable release records
//!
//! A record is one `deliverables/<series>/<name>.yaml` file: the declared
//! releases of a deliverable, each naming the repositories it tags and the
//! commit every repository is tagged at. Records are built fresh for each run
//! and never modified by validation.

pub mod discover;
pub mod load;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub use discover::find_deliverable_files;
pub use load::load_record;

/// Release model used when a record does not declare `release-type`
pub const DEFAULT_RELEASE_MODEL: &str = "std";

/// Whether a deliverable produces a distributable artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactLinkMode {
  /// Releases publish a tarball; release CI jobs are required
  #[default]
  Tarball,
  /// Nothing is published; release-job requirements are skipped
  None,
}

/// Release notes location: one link, or one link per series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReleaseNotes {
  Single(String),
  BySeries(BTreeMap<String, String>),
}

impl ReleaseNotes {
  /// All links, in a stable order
  pub fn links(&self) -> Vec<&str> {
    match self {
      ReleaseNotes::Single(link) => vec![link.as_str()],
      ReleaseNotes::BySeries(links) => links.values().map(|s| s.as_str()).collect(),
    }
  }
}

/// One repository tagged by a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectRef {
  /// Repository identifier (`namespace/name`); empty when not declared
  pub repo: String,
  /// Declared commit; not guaranteed to be a well-formed hash
  pub hash: String,
  /// Why the entry as written cannot be checked
  #[serde(skip_serializing_if = "Option::is_none")]
  pub problem: Option<String>,
}

impl ProjectRef {
  pub fn new(repo: impl Into<String>, hash: impl Into<String>) -> Self {
    Self {
      repo: repo.into(),
      hash: hash.into(),
      problem: None,
    }
  }
}

/// One declared release of a deliverable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Release {
  pub version: String,
  pub projects: Vec<ProjectRef>,
  /// Why the release as written cannot be checked
  #[serde(skip_serializing_if = "Option::is_none")]
  pub problem: Option<String>,
}

impl Release {
  pub fn new(version: impl Into<String>, projects: Vec<ProjectRef>) -> Self {
    Self {
      version: version.into(),
      projects,
      problem: None,
    }
  }

  /// Repositories tagged by this release
  pub fn repos(&self) -> BTreeSet<String> {
    self
      .projects
      .iter()
      .filter(|p| !p.repo.is_empty())
      .map(|p| p.repo.clone())
      .collect()
  }
}

/// In-memory form of one deliverable file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliverableRecord {
  /// Deliverable name (file stem)
  pub name: String,
  /// Release series (directory name), or the independent sentinel
  pub series: String,
  /// Declared `release-type`
  pub release_model: String,
  pub artifact_link_mode: ArtifactLinkMode,
  pub team: Option<String>,
  pub launchpad: Option<String>,
  pub send_announcements_to: Option<String>,
  pub release_notes: Option<ReleaseNotes>,
  /// Ordered oldest to newest; only the last entry may be new
  pub releases: Vec<Release>,
}

impl DeliverableRecord {
  /// Create a record with default metadata, mostly useful for tests
  pub fn new(name: impl Into<String>, series: impl Into<String>, releases: Vec<Release>) -> Self {
    Self {
      name: name.into(),
      series: series.into(),
      release_model: DEFAULT_RELEASE_MODEL.to_string(),
      artifact_link_mode: ArtifactLinkMode::default(),
      team: None,
      launchpad: None,
      send_announcements_to: None,
      release_notes: None,
      releases,
    }
  }

  /// The newest declared release
  pub fn final_release(&self) -> Option<&Release> {
    self.releases.last()
  }

  /// Whether release-job requirements apply
  pub fn ships_artifacts(&self) -> bool {
    self.artifact_link_mode != ArtifactLinkMode::None
  }
}

/// Return true if `val` looks like a full git commit hash
///
/// Exactly 40 characters from `0-9a-f`. Uppercase is rejected so that the
/// declared hash compares byte-for-byte with what git reports.
pub fn is_a_hash(val: &str) -> bool {
  val.len() == 40 && val.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
