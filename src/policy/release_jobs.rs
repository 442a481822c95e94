//! CI release-job requirements
//!
//! A deliverable that ships artifacts only produces them if every repository
//! it tags runs a release job. The CI layout lists the job templates attached
//! to each repository; the policy maps release templates to the release model
//! they publish for.

use crate::core::error::{GuardError, GuardResult, RecordError, ResultExt};
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

/// One outcome of a release-job requirement check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFinding {
  pub message: String,
  pub is_error: bool,
}

impl JobFinding {
  fn error(message: String) -> Self {
    Self { message, is_error: true }
  }

  fn warning(message: String) -> Self {
    Self {
      message,
      is_error: false,
    }
  }
}

/// Answers whether a repository is set up to publish releases
pub trait ReleaseJobRequirements: Send + Sync {
  /// Findings for `repo` released under `release_model`; empty when compliant
  fn require_release_jobs(&self, repo: &str, release_model: &str) -> Vec<JobFinding>;
}

#[derive(Debug, Deserialize)]
struct RawLayout {
  #[serde(default)]
  projects: Vec<RawProject>,
}

#[derive(Debug, Deserialize)]
struct RawProject {
  name: String,
  #[serde(default)]
  templates: Vec<String>,
}

/// Release-template policy: template name to release model, plus deprecated
/// template patterns
#[derive(Debug, Clone)]
pub struct TemplatePolicy {
  pub release_templates: BTreeMap<String, String>,
  pub deprecated: Vec<String>,
}

/// CI layout file plus the template policy applied to it
#[derive(Debug)]
pub struct CiLayout {
  origin: PathBuf,
  projects: HashMap<String, Vec<String>>,
  release_templates: BTreeMap<String, String>,
  deprecated: Vec<Regex>,
}

impl CiLayout {
  /// Parse a layout (`projects: [{name, templates}]`)
  pub fn from_yaml(content: &str, origin: &Path, policy: &TemplatePolicy) -> GuardResult<Self> {
    let raw: RawLayout = serde_yaml::from_str(content).map_err(|e| {
      GuardError::Record(RecordError::Parse {
        path: origin.to_path_buf(),
        reason: e.to_string(),
      })
    })?;

    let deprecated = policy
      .deprecated
      .iter()
      .map(|p| Regex::new(p).map_err(|e| GuardError::message(format!("Invalid deprecated template pattern {:?}: {}", p, e))))
      .collect::<GuardResult<Vec<_>>>()?;

    Ok(Self {
      origin: origin.to_path_buf(),
      projects: raw.projects.into_iter().map(|p| (p.name, p.templates)).collect(),
      release_templates: policy.release_templates.clone(),
      deprecated,
    })
  }

  /// Load a layout from disk
  pub fn load(path: &Path, policy: &TemplatePolicy) -> GuardResult<Self> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read CI layout {}", path.display()))?;
    Self::from_yaml(&content, path, policy)
  }
}

impl ReleaseJobRequirements for CiLayout {
  fn require_release_jobs(&self, repo: &str, release_model: &str) -> Vec<JobFinding> {
    let Some(templates) = self.projects.get(repo) else {
      return vec![JobFinding::error(format!(
        "did not find {} in {}",
        repo,
        self.origin.display()
      ))];
    };

    let mut findings = Vec::new();

    for template in templates {
      if self.deprecated.iter().any(|re| re.is_match(template)) {
        findings.push(JobFinding::warning(format!(
          "{} uses deprecated job template {}",
          repo, template
        )));
      }
    }

    let release_jobs: Vec<&String> = templates
      .iter()
      .filter(|t| self.release_templates.contains_key(t.as_str()))
      .collect();

    match release_jobs.as_slice() {
      [] => {
        let candidates: Vec<&str> = self
          .release_templates
          .iter()
          .filter(|(_, model)| model.as_str() == release_model)
          .map(|(name, _)| name.as_str())
          .collect();
        findings.push(JobFinding::error(format!(
          "no release job specified for {}, should be one of {:?} or no release will be published",
          repo, candidates
        )));
      }
      [_] => {}
      many => {
        let names: Vec<&str> = many.iter().map(|s| s.as_str()).collect();
        findings.push(JobFinding::warning(format!(
          "{} has more than one release job template: {}",
          repo,
          names.join(", ")
        )));
      }
    }

    for template in release_jobs {
      if let Some(model) = self.release_templates.get(template.as_str())
        && model != release_model
      {
        findings.push(JobFinding::error(format!(
          "{} uses release job template {} for release-type {}, but the deliverable declares {}",
          repo, template, model, release_model
        )));
      }
    }

    findings
  }
}
