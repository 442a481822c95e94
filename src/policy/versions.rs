//! Version-format rules keyed on release model

/// Validates a version string for a release model
pub trait VersionRules: Send + Sync {
  /// Every rule `version` breaks; empty when valid
  fn validate(&self, version: &str, release_model: &str) -> Vec<String>;
}

/// Models whose versions follow `X.Y.Z` with optional `.0aN`/`.0bN`/`.0rcN`
const SEMVER_MODELS: &[&str] = &[
  "std",
  "python-pypi",
  "python-server",
  "cycle-with-milestones",
  "cycle-with-intermediary",
  "cycle-trailing",
];

/// Models whose versions carry a fourth packaging component
const FOUR_PART_MODELS: &[&str] = &["xstatic"];

/// Built-in rules for the release models in use
#[derive(Debug, Clone, Copy, Default)]
pub struct ReleaseModelRules;

impl VersionRules for ReleaseModelRules {
  fn validate(&self, version: &str, release_model: &str) -> Vec<String> {
    if version.is_empty() {
      return vec!["version is empty".to_string()];
    }
    if SEMVER_MODELS.contains(&release_model) {
      semver_violations(version)
    } else if FOUR_PART_MODELS.contains(&release_model) {
      four_part_violations(version)
    } else {
      vec![format!("unknown release-type {:?}, cannot validate {}", release_model, version)]
    }
  }
}

fn semver_violations(version: &str) -> Vec<String> {
  if version.starts_with('V') {
    return vec![format!("{} should use a lowercase 'v' prefix or none", version)];
  }
  if version.strip_prefix('v').is_some_and(|rest| rest.starts_with('v')) {
    return vec![format!("{} has more than one 'v' prefix", version)];
  }
  // Tags like v1.2.3 are accepted; the rules apply to the numeric part
  let version = version.strip_prefix('v').unwrap_or(version);
  if version.contains('+') {
    return vec![format!("{} has build metadata, which is not allowed", version)];
  }

  if let Ok(parsed) = semver::Version::parse(version) {
    if parsed.pre.is_empty() {
      return vec![];
    }
    return vec![format!(
      "{} uses a semver pre-release ({}); use the X.Y.Z.0rcN form instead",
      version, parsed.pre
    )];
  }

  let parts: Vec<&str> = version.split('.').collect();
  if parts.len() == 4 {
    let mut violations = Vec::new();
    let base = parts[..3].join(".");
    if semver::Version::parse(&base).is_err() {
      violations.push(format!("{} does not start with a canonical X.Y.Z", version));
    }
    if !is_prerelease_component(parts[3]) {
      violations.push(format!(
        "{} has an invalid pre-release component {:?}, expected 0aN, 0bN or 0rcN",
        version, parts[3]
      ));
    }
    return violations;
  }

  vec![format!("{} is not a valid version, expected X.Y.Z or X.Y.Z.0rcN", version)]
}

/// `0a1`, `0b2`, `0rc1`; the counter has no leading zero
fn is_prerelease_component(part: &str) -> bool {
  let Some(rest) = part.strip_prefix('0') else {
    return false;
  };
  let counter = ["rc", "a", "b"].iter().find_map(|kind| rest.strip_prefix(kind));
  matches!(counter, Some(n) if is_canonical_number(n) && n != "0")
}

fn is_canonical_number(part: &str) -> bool {
  !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()) && (part == "0" || !part.starts_with('0'))
}

fn four_part_violations(version: &str) -> Vec<String> {
  let parts: Vec<&str> = version.split('.').collect();
  if parts.len() != 4 {
    return vec![format!("{} must have exactly four numeric components", version)];
  }
  parts
    .iter()
    .filter(|p| !is_canonical_number(p))
    .map(|p| format!("{} has a non-canonical component {:?}", version, p))
    .collect()
}
