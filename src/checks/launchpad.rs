//! Bug-tracker project check

use super::trait_def::{Check, CheckContext, policy_error};
use crate::core::error::GuardResult;
use crate::validate::Finding;

/// Record names a bug-tracker project, and the project exists
pub struct LaunchpadCheck;

impl Check for LaunchpadCheck {
  fn name(&self) -> &str {
    "launchpad"
  }

  fn description(&self) -> &str {
    "Validates the bug-tracker project name"
  }

  fn run(&self, ctx: &CheckContext<'_>) -> GuardResult<Vec<Finding>> {
    let record = ctx.record;
    let Some(project) = record.launchpad.as_deref().filter(|p| !p.is_empty()) else {
      return Ok(vec![policy_error(format!("No launchpad project given for {}", record.name))]);
    };

    // Existence needs the API; offline runs stop at presence
    let Some(probe) = ctx.probe else {
      return Ok(vec![]);
    };

    let url = format!("{}/{}", ctx.launchpad_api.trim_end_matches('/'), project);
    let status = probe.status(&url)?;
    if (400..500).contains(&status) {
      return Ok(vec![policy_error(format!(
        "Launchpad project {} for {} does not exist (HTTP {})",
        project, record.name, status
      ))]);
    }
    Ok(vec![])
  }
}
