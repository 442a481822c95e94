use crate::core::error::{ConfigError, GuardError, GuardResult, ResultExt};
use crate::validate::INDEPENDENT_SERIES;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for release-guard
/// Searched in order: release-guard.toml, .release-guard.toml, .config/release-guard.toml
///
/// Every section is optional; a missing file means all defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuardConfig {
  #[serde(default)]
  pub series: SeriesConfig,
  #[serde(default)]
  pub paths: PathsConfig,
  #[serde(default)]
  pub history: HistoryConfig,
  #[serde(default)]
  pub release_jobs: ReleaseJobsConfig,
  #[serde(default)]
  pub metadata: MetadataConfig,
}

/// Release series naming
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesConfig {
  /// Series under active development; records of this series are reconciled
  /// against governance
  #[serde(default)]
  pub current: Option<String>,

  /// Directory name for deliverables released outside any series
  #[serde(default = "default_independent")]
  pub independent: String,
}

fn default_independent() -> String {
  INDEPENDENT_SERIES.to_string()
}

impl Default for SeriesConfig {
  fn default() -> Self {
    Self {
      current: None,
      independent: default_independent(),
    }
  }
}

/// Data file locations, relative to the repository root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
  #[serde(default = "default_deliverables")]
  pub deliverables: PathBuf,

  /// Governance `projects.yaml`
  #[serde(default = "default_governance")]
  pub governance: PathBuf,

  /// CI layout; release-job requirements are only enforced when set
  #[serde(default)]
  pub ci_layout: Option<PathBuf>,
}

fn default_deliverables() -> PathBuf {
  PathBuf::from("deliverables")
}

fn default_governance() -> PathBuf {
  PathBuf::from("governance/projects.yaml")
}

impl Default for PathsConfig {
  fn default() -> Self {
    Self {
      deliverables: default_deliverables(),
      governance: default_governance(),
      ci_layout: None,
    }
  }
}

/// Which history oracle answers existence questions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryBackend {
  /// Local clones for everything
  #[default]
  Clone,
  /// cgit web views for existence, clones for resolution and ancestry
  Cgit,
}

/// Repository history access
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
  #[serde(default)]
  pub backend: HistoryBackend,

  /// Clone URL prefix; `<git_base>/<repo>` is cloned. May be a local path.
  #[serde(default = "default_git_base")]
  pub git_base: String,

  /// cgit commit view, with `{repo}` and `{ref}` placeholders
  #[serde(default = "default_commit_url")]
  pub commit_url: String,

  /// cgit tag view, with `{repo}` and `{ref}` placeholders
  #[serde(default = "default_tag_url")]
  pub tag_url: String,

  /// Deadline for each git command or HTTP request
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,

  /// Records validated concurrently
  #[serde(default = "default_jobs")]
  pub jobs: usize,
}

fn default_git_base() -> String {
  "https://opendev.org".to_string()
}

fn default_commit_url() -> String {
  "https://git.openstack.org/cgit/{repo}/commit/?id={ref}".to_string()
}

fn default_tag_url() -> String {
  "https://git.openstack.org/cgit/{repo}/tag/?h={ref}".to_string()
}

fn default_timeout_secs() -> u64 {
  120
}

fn default_jobs() -> usize {
  4
}

impl Default for HistoryConfig {
  fn default() -> Self {
    Self {
      backend: HistoryBackend::default(),
      git_base: default_git_base(),
      commit_url: default_commit_url(),
      tag_url: default_tag_url(),
      timeout_secs: default_timeout_secs(),
      jobs: default_jobs(),
    }
  }
}

impl HistoryConfig {
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }
}

/// Release-job template policy
///
/// # Example
///
/// ```toml
/// [release_jobs.templates]
/// publish-to-pypi = "python-pypi"
/// openstack-server-release-jobs = "std"
///
/// [release_jobs]
/// deprecated = ["-legacy$"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseJobsConfig {
  /// Release job template name to the release model it publishes for
  #[serde(default = "default_release_templates")]
  pub templates: BTreeMap<String, String>,

  /// Regular expressions matching deprecated templates
  #[serde(default)]
  pub deprecated: Vec<String>,
}

fn default_release_templates() -> BTreeMap<String, String> {
  [
    ("publish-to-pypi", "python-pypi"),
    ("publish-to-pypi-python3", "python-pypi"),
    ("openstack-server-release-jobs", "std"),
    ("release-openstack-server", "std"),
    ("xstatic-publish-jobs", "xstatic"),
  ]
  .into_iter()
  .map(|(k, v)| (k.to_string(), v.to_string()))
  .collect()
}

impl Default for ReleaseJobsConfig {
  fn default() -> Self {
    Self {
      templates: default_release_templates(),
      deprecated: Vec::new(),
    }
  }
}

/// Record metadata checks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
  /// Bug-tracker API base; `<launchpad_api>/<project>` must exist
  #[serde(default = "default_launchpad_api")]
  pub launchpad_api: String,
}

fn default_launchpad_api() -> String {
  "https://api.launchpad.net/1.0".to_string()
}

impl Default for MetadataConfig {
  fn default() -> Self {
    Self {
      launchpad_api: default_launchpad_api(),
    }
  }
}

impl GuardConfig {
  /// Find config file in search order: release-guard.toml, .release-guard.toml, .config/release-guard.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = [
      path.join("release-guard.toml"),
      path.join(".release-guard.toml"),
      path.join(".config").join("release-guard.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config for the repository at `root`, or defaults when there is none
  pub fn load(root: &Path) -> GuardResult<Self> {
    match Self::find_config_path(root) {
      Some(config_path) => Self::load_from(&config_path),
      None => Ok(Self::default()),
    }
  }

  /// Load and validate a specific config file
  pub fn load_from(config_path: &Path) -> GuardResult<Self> {
    let content = fs::read_to_string(config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: GuardConfig = toml_edit::de::from_str(&content)
      .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    config
      .validate()
      .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;

    Ok(config)
  }

  /// Validate values that deserialize fine but cannot work
  pub fn validate(&self) -> GuardResult<()> {
    if self.history.timeout_secs == 0 {
      return Err(invalid("history.timeout_secs", "must be at least 1"));
    }
    if self.history.jobs == 0 {
      return Err(invalid("history.jobs", "must be at least 1"));
    }
    if self.history.git_base.trim().is_empty() {
      return Err(invalid("history.git_base", "must not be empty"));
    }

    if self.history.backend == HistoryBackend::Cgit {
      for (field, template) in [
        ("history.commit_url", &self.history.commit_url),
        ("history.tag_url", &self.history.tag_url),
      ] {
        if !template.contains("{repo}") || !template.contains("{ref}") {
          return Err(invalid(field, "must contain {repo} and {ref}"));
        }
      }
    }

    if self.series.independent.is_empty() {
      return Err(invalid("series.independent", "must not be empty"));
    }
    if self.series.current.as_deref() == Some(self.series.independent.as_str()) {
      return Err(invalid("series.current", "cannot be the independent series"));
    }

    Ok(())
  }

  /// The current series, which must be configured one way or another
  pub fn current_series(&self) -> GuardResult<&str> {
    self
      .series
      .current
      .as_deref()
      .filter(|s| !s.is_empty())
      .ok_or(GuardError::Config(ConfigError::MissingSeries))
  }
}

fn invalid(field: &str, reason: &str) -> GuardError {
  GuardError::Config(ConfigError::Invalid {
    field: field.to_string(),
    reason: reason.to_string(),
  })
}
