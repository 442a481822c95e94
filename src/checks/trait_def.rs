//! Check trait abstraction for record metadata checks
//!
//! The history checks live in the validation engine. Everything else a
//! record declares about itself (bug tracker, owning team, announcement list,
//! release notes) is checked here, one `Check` per concern, so new checks can
//! be added without touching the engine.

use crate::core::error::GuardResult;
use crate::governance::GovernanceDirectory;
use crate::record::DeliverableRecord;
use crate::validate::{Finding, FindingKind, Severity};

/// Answers HTTP status questions for links a record declares
pub trait LinkProbe: Send + Sync {
  /// HTTP status returned for a GET of `url`
  fn status(&self, url: &str) -> GuardResult<u16>;
}

/// Context passed to checks
pub struct CheckContext<'a> {
  /// Record under check
  pub record: &'a DeliverableRecord,
  /// Governance data for team lookups
  pub directory: &'a dyn GovernanceDirectory,
  /// Network access, `None` when running offline
  pub probe: Option<&'a dyn LinkProbe>,
  /// Base URL of the bug-tracker API
  pub launchpad_api: &'a str,
}

impl CheckContext<'_> {
  /// Whether checks may use the network
  pub fn thorough(&self) -> bool {
    self.probe.is_some()
  }
}

/// Metadata check trait
///
/// # Example
///
/// ```rust,ignore
/// struct HasTeam;
///
/// impl Check for HasTeam {
///   fn name(&self) -> &str {
///     "has-team"
///   }
///
///   fn description(&self) -> &str {
///     "Record names an owning team"
///   }
///
///   fn run(&self, ctx: &CheckContext) -> GuardResult<Vec<Finding>> {
///     if ctx.record.team.is_some() {
///       Ok(vec![])
///     } else {
///       Ok(vec![policy_error("no team given")])
///     }
///   }
/// }
/// ```
pub trait Check: Send + Sync {
  /// Unique name for this check (kebab-case)
  fn name(&self) -> &str;

  /// Human-readable description of what this check validates
  fn description(&self) -> &str;

  /// Run the check; an empty list means the record passed
  fn run(&self, ctx: &CheckContext<'_>) -> GuardResult<Vec<Finding>>;

  /// Whether this check only makes sense with network access
  /// Default: false
  fn is_expensive(&self) -> bool {
    false
  }
}

/// Blocking metadata finding
pub fn policy_error(message: impl Into<String>) -> Finding {
  Finding {
    severity: Severity::Error,
    kind: FindingKind::Policy,
    message: message.into(),
  }
}

/// Advisory metadata finding
pub fn policy_warning(message: impl Into<String>) -> Finding {
  Finding {
    severity: Severity::Warning,
    kind: FindingKind::Policy,
    message: message.into(),
  }
}
