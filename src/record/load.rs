//! Parse deliverable YAML files into [`DeliverableRecord`]s

use super::{ArtifactLinkMode, DEFAULT_RELEASE_MODEL, DeliverableRecord, ProjectRef, Release, ReleaseNotes};
use crate::core::error::{GuardError, GuardResult, RecordError, ResultExt};
use serde::Deserialize;
use serde_yaml::Value;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawRecord {
  #[serde(default)]
  team: Option<String>,
  #[serde(default)]
  launchpad: Option<String>,
  #[serde(default)]
  send_announcements_to: Option<String>,
  #[serde(default)]
  release_notes: Option<ReleaseNotes>,
  #[serde(default)]
  release_type: Option<String>,
  #[serde(default)]
  artifact_link_mode: Option<ArtifactLinkMode>,
  #[serde(default)]
  releases: Option<Vec<RawRelease>>,
}

#[derive(Debug, Deserialize)]
struct RawRelease {
  #[serde(default)]
  version: Option<Value>,
  #[serde(default)]
  projects: Vec<RawProject>,
}

#[derive(Debug, Deserialize)]
struct RawProject {
  #[serde(default)]
  repo: Option<Value>,
  #[serde(default)]
  hash: Option<Value>,
}

/// A scalar field as written in the file
enum Scalar {
  Text(String),
  Missing,
  /// Written without quotes and parsed as something other than a string;
  /// converting it back to text would not reproduce what the author wrote
  Unquoted(String),
}

impl Scalar {
  fn from_yaml(value: Option<Value>) -> Self {
    match value {
      Some(Value::String(s)) => Scalar::Text(s),
      None | Some(Value::Null) => Scalar::Missing,
      Some(Value::Number(n)) => Scalar::Unquoted(n.to_string()),
      Some(Value::Bool(b)) => Scalar::Unquoted(b.to_string()),
      Some(other) => Scalar::Unquoted(
        serde_yaml::to_string(&other)
          .map(|s| s.trim().to_string())
          .unwrap_or_default(),
      ),
    }
  }
}

fn convert_release(raw: RawRelease, index: usize, name: &str) -> Release {
  let (version, problem) = match Scalar::from_yaml(raw.version) {
    Scalar::Text(version) => (version, None),
    Scalar::Missing => (String::new(), Some(format!("release {} of {} has no version", index + 1, name))),
    Scalar::Unquoted(shown) => {
      let problem = format!("version {} of {} must be a quoted string", shown, name);
      (shown, Some(problem))
    }
  };

  let projects = raw
    .projects
    .into_iter()
    .map(|p| convert_project(p, &version, name))
    .collect();

  Release {
    version,
    projects,
    problem,
  }
}

fn convert_project(raw: RawProject, version: &str, name: &str) -> ProjectRef {
  let repo = match Scalar::from_yaml(raw.repo) {
    Scalar::Text(repo) => repo,
    Scalar::Missing | Scalar::Unquoted(_) => {
      return ProjectRef {
        repo: String::new(),
        hash: String::new(),
        problem: Some(format!("{} version {} lists a project without a repo name", name, version)),
      };
    }
  };

  let (hash, problem) = match Scalar::from_yaml(raw.hash) {
    Scalar::Text(hash) => (hash, None),
    Scalar::Missing => (String::new(), Some(format!("{} version {} has no hash", repo, version))),
    Scalar::Unquoted(shown) => {
      let problem = format!("{} version {} hash {} must be a quoted string", repo, version, shown);
      (shown, Some(problem))
    }
  };

  ProjectRef { repo, hash, problem }
}

/// Parse record content already read from `path`
///
/// `name` and `series` come from the file location, not the content.
pub fn parse_record(content: &str, path: &Path, name: &str, series: &str) -> GuardResult<DeliverableRecord> {
  let raw: RawRecord = serde_yaml::from_str(content).map_err(|e| {
    GuardError::Record(RecordError::Parse {
      path: path.to_path_buf(),
      reason: e.to_string(),
    })
  })?;

  let releases = raw.releases.ok_or_else(|| {
    GuardError::Record(RecordError::MissingField {
      path: path.to_path_buf(),
      field: "releases".to_string(),
    })
  })?;

  let releases = releases
    .into_iter()
    .enumerate()
    .map(|(index, r)| convert_release(r, index, name))
    .collect();

  Ok(DeliverableRecord {
    name: name.to_string(),
    series: series.to_string(),
    release_model: raw.release_type.unwrap_or_else(|| DEFAULT_RELEASE_MODEL.to_string()),
    artifact_link_mode: raw.artifact_link_mode.unwrap_or_default(),
    team: raw.team,
    launchpad: raw.launchpad,
    send_announcements_to: raw.send_announcements_to,
    release_notes: raw.release_notes,
    releases,
  })
}

/// Load a record from `deliverables/<series>/<name>.yaml`
pub fn load_record(path: &Path) -> GuardResult<DeliverableRecord> {
  let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

  let name = path
    .file_stem()
    .map(|s| s.to_string_lossy().to_string())
    .ok_or_else(|| GuardError::message(format!("No deliverable name in {}", path.display())))?;
  let series = path
    .parent()
    .and_then(|p| p.file_name())
    .map(|s| s.to_string_lossy().to_string())
    .ok_or_else(|| GuardError::message(format!("No series directory for {}", path.display())))?;

  parse_record(&content, path, &name, &series)
}

#[cfg(test)]
mod tests {
  use super::*;

  const NOVA: &str = r#"
launchpad: nova
team: nova
send-announcements-to: openstack-dev@lists.openstack.org
release-notes: https://docs.openstack.org/releasenotes/nova/ocata.html
releases:
  - version: 15.0.0
    projects:
      - repo: openstack/nova
        hash: "1111111111111111111111111111111111111111"
  - version: 15.0.1
    projects:
      - repo: openstack/nova
        hash: "2222222222222222222222222222222222222222"
"#;

  #[test]
  fn test_parse_full_record() {
    let record = parse_record(NOVA, Path::new("deliverables/ocata/nova.yaml"), "nova", "ocata").unwrap();
    assert_eq!(record.name, "nova");
    assert_eq!(record.series, "ocata");
    assert_eq!(record.release_model, "std");
    assert_eq!(record.artifact_link_mode, ArtifactLinkMode::Tarball);
    assert_eq!(record.team.as_deref(), Some("nova"));
    assert_eq!(record.releases.len(), 2);
    assert_eq!(record.releases[1].projects[0].hash, "2".repeat(40));
  }

  #[test]
  fn test_parse_release_type_and_link_mode() {
    let content = r#"
release-type: xstatic
artifact-link-mode: none
releases: []
"#;
    let record = parse_record(content, Path::new("x.yaml"), "x", "_independent").unwrap();
    assert_eq!(record.release_model, "xstatic");
    assert_eq!(record.artifact_link_mode, ArtifactLinkMode::None);
    assert!(!record.ships_artifacts());
  }

  #[test]
  fn test_unquoted_version_is_kept_verbatim_and_flagged() {
    let content = r#"
releases:
  - version: 1.10
    projects:
      - repo: openstack/oslo.config
        hash: "1111111111111111111111111111111111111111"
  - version: "1.10"
    projects:
      - repo: openstack/oslo.config
        hash: "2222222222222222222222222222222222222222"
"#;
    let record = parse_record(content, Path::new("x.yaml"), "x", "ocata").unwrap();
    let problem = record.releases[0].problem.as_deref().unwrap();
    assert_eq!(problem, "version 1.1 of x must be a quoted string");
    assert_eq!(record.releases[1].version, "1.10");
    assert!(record.releases[1].problem.is_none());
  }

  #[test]
  fn test_unquoted_hash_is_flagged() {
    let content = r#"
releases:
  - version: "1.0.0"
    projects:
      - repo: openstack/oslo.config
        hash: 2222222222222222222222222222222222222222
"#;
    let record = parse_record(content, Path::new("x.yaml"), "x", "ocata").unwrap();
    let project = &record.releases[0].projects[0];
    assert_eq!(project.repo, "openstack/oslo.config");
    let problem = project.problem.as_deref().unwrap();
    assert!(problem.starts_with("openstack/oslo.config version 1.0.0 hash "), "{}", problem);
    assert!(problem.ends_with("must be a quoted string"), "{}", problem);
  }

  #[test]
  fn test_missing_fields_only_affect_their_entry() {
    let content = r#"
releases:
  - version: 1.0.0
    projects:
      - repo: openstack/nova
        hash: "1111111111111111111111111111111111111111"
      - repo: openstack/python-novaclient
      - hash: "2222222222222222222222222222222222222222"
  - projects: []
"#;
    let record = parse_record(content, Path::new("nova.yaml"), "nova", "ocata").unwrap();
    let projects = &record.releases[0].projects;
    assert_eq!(projects.len(), 3);
    assert!(projects[0].problem.is_none());
    assert_eq!(projects[0].hash, "1".repeat(40));
    assert_eq!(
      projects[1].problem.as_deref(),
      Some("openstack/python-novaclient version 1.0.0 has no hash")
    );
    assert_eq!(
      projects[2].problem.as_deref(),
      Some("nova version 1.0.0 lists a project without a repo name")
    );
    assert_eq!(record.releases[1].problem.as_deref(), Some("release 2 of nova has no version"));
  }

  #[test]
  fn test_missing_releases_is_an_error() {
    let err = parse_record("team: nova\n", Path::new("nova.yaml"), "nova", "ocata").unwrap_err();
    assert!(matches!(
      err,
      GuardError::Record(RecordError::MissingField { ref field, .. }) if field == "releases"
    ));
  }

  #[test]
  fn test_invalid_yaml_is_a_parse_error() {
    let err = parse_record("releases: [", Path::new("bad.yaml"), "bad", "ocata").unwrap_err();
    assert!(matches!(err, GuardError::Record(RecordError::Parse { .. })));
  }

  #[test]
  fn test_release_notes_by_series() {
    let content = r#"
release-notes:
  ocata: https://a
  pike: https://b
releases: []
"#;
    let record = parse_record(content, Path::new("x.yaml"), "x", "pike").unwrap();
    assert_eq!(record.release_notes.unwrap().links().len(), 2);
  }

  #[test]
  fn test_load_record_uses_path_for_name_and_series() {
    let dir = tempfile::TempDir::new().unwrap();
    let series_dir = dir.path().join("deliverables").join("ocata");
    std::fs::create_dir_all(&series_dir).unwrap();
    let path = series_dir.join("nova.yaml");
    std::fs::write(&path, NOVA).unwrap();

    let record = load_record(&path).unwrap();
    assert_eq!(record.name, "nova");
    assert_eq!(record.series, "ocata");
  }
}
