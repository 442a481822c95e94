//! Release-notes link check

use super::trait_def::{Check, CheckContext, policy_error};
use crate::core::error::GuardResult;
use crate::validate::Finding;

/// Every declared release-notes link resolves
pub struct ReleaseNotesCheck;

impl Check for ReleaseNotesCheck {
  fn name(&self) -> &str {
    "release-notes"
  }

  fn description(&self) -> &str {
    "Validates release-notes links"
  }

  fn run(&self, ctx: &CheckContext<'_>) -> GuardResult<Vec<Finding>> {
    let (Some(notes), Some(probe)) = (&ctx.record.release_notes, ctx.probe) else {
      return Ok(vec![]);
    };

    let mut findings = Vec::new();
    for link in notes.links() {
      match probe.status(link) {
        Ok(status) if (200..300).contains(&status) => {}
        Ok(status) => findings.push(policy_error(format!(
          "Could not fetch release notes page {} for {}: HTTP {}",
          link, ctx.record.name, status
        ))),
        Err(err) => findings.push(policy_error(format!(
          "Could not fetch release notes page {} for {}: {}",
          link, ctx.record.name, err
        ))),
      }
    }
    Ok(findings)
  }

  fn is_expensive(&self) -> bool {
    true
  }
}
