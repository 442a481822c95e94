//! Check runner for executing metadata checks

use super::trait_def::{Check, CheckContext, policy_error};
use crate::validate::Report;
use std::sync::Arc;
use tracing::debug;

/// Check runner that executes multiple checks
pub struct CheckRunner {
  checks: Vec<Arc<dyn Check>>,
}

impl CheckRunner {
  /// Create a new check runner
  pub fn new() -> Self {
    Self { checks: Vec::new() }
  }

  /// Add a check to the runner
  pub fn add_check(&mut self, check: Arc<dyn Check>) {
    self.checks.push(check);
  }

  /// Run all checks, appending their findings to `report`
  pub fn run_all(&self, ctx: &CheckContext<'_>, report: &mut Report) {
    for check in &self.checks {
      // Network-only checks are skipped offline
      if check.is_expensive() && !ctx.thorough() {
        debug!(check = check.name(), "skipping expensive check");
        continue;
      }

      debug!(check = check.name(), description = check.description(), "running check");
      match check.run(ctx) {
        Ok(findings) => {
          for finding in findings {
            report.push(finding);
          }
        }
        Err(err) => {
          // A check that cannot run is a finding, not a fatal error
          report.push(policy_error(format!("Check {} failed to run: {}", check.name(), err)));
        }
      }
    }
  }

  /// Get all registered checks
  pub fn checks(&self) -> &[Arc<dyn Check>] {
    &self.checks
  }
}

impl Default for CheckRunner {
  fn default() -> Self {
    Self::new()
  }
}

/// Create a runner with all built-in checks
pub fn create_default_runner() -> CheckRunner {
  let mut runner = CheckRunner::new();

  runner.add_check(Arc::new(super::launchpad::LaunchpadCheck));
  runner.add_check(Arc::new(super::team::TeamCheck));
  runner.add_check(Arc::new(super::announcements::AnnouncementCheck));
  runner.add_check(Arc::new(super::release_notes::ReleaseNotesCheck));

  runner
}
