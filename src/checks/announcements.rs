//! Announcement address check

use super::trait_def::{Check, CheckContext, policy_error};
use crate::core::error::GuardResult;
use crate::validate::Finding;

/// Record names exactly one address to announce releases to
pub struct AnnouncementCheck;

impl Check for AnnouncementCheck {
  fn name(&self) -> &str {
    "announcements"
  }

  fn description(&self) -> &str {
    "Validates send-announcements-to"
  }

  fn run(&self, ctx: &CheckContext<'_>) -> GuardResult<Vec<Finding>> {
    let record = ctx.record;
    let Some(address) = record.send_announcements_to.as_deref().filter(|a| !a.is_empty()) else {
      return Ok(vec![policy_error(format!(
        "No email address for send-announcements-to given for {}",
        record.name
      ))]);
    };

    if address.contains(char::is_whitespace) {
      return Ok(vec![policy_error(format!(
        "send-announcements-to for {} should be a single address, got {:?}",
        record.name, address
      ))]);
    }
    Ok(vec![])
  }
}
