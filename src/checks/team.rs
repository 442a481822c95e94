//! Owning team check

use super::trait_def::{Check, CheckContext, policy_error, policy_warning};
use crate::core::error::GuardResult;
use crate::validate::Finding;

/// Record names a team that governance knows about
pub struct TeamCheck;

impl Check for TeamCheck {
  fn name(&self) -> &str {
    "team"
  }

  fn description(&self) -> &str {
    "Validates the owning team"
  }

  fn run(&self, ctx: &CheckContext<'_>) -> GuardResult<Vec<Finding>> {
    let record = ctx.record;
    match record.team.as_deref().filter(|t| !t.is_empty()) {
      None => Ok(vec![policy_error(format!("No team name given for {}", record.name))]),
      Some(team) if !ctx.directory.team_exists(team) => Ok(vec![policy_warning(format!(
        "Team {:?} for {} is not in the governance list",
        team, record.name
      ))]),
      Some(_) => Ok(vec![]),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::checks::test_support::context;
  use crate::governance::ProjectsFile;
  use crate::record::DeliverableRecord;
  use crate::validate::Severity;

  fn check(team: Option<&str>) -> Vec<Finding> {
    let mut gov = ProjectsFile::default();
    gov.insert_deliverable("widgets", "widget", &["openstack/widget"], &[]);
    let mut record = DeliverableRecord::new("widget", "S", vec![]);
    record.team = team.map(String::from);
    TeamCheck.run(&context(&record, &gov, None)).unwrap()
  }

  #[test]
  fn test_known_team() {
    assert!(check(Some("widgets")).is_empty());
  }

  #[test]
  fn test_missing_team_is_error() {
    let findings = check(None);
    assert_eq!(findings[0].severity, Severity::Error);
    assert_eq!(check(Some("")).len(), 1);
  }

  #[test]
  fn test_unknown_team_is_warning() {
    let findings = check(Some("gadgets"));
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].severity, Severity::Warning);
  }
}
