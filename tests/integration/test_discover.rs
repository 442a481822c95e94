//! Integration tests for record discovery

use crate::helpers::{REPO, SERIES, TestWorkspace, git, run_release_guard, stdout};
use anyhow::Result;

#[test]
fn test_validates_only_records_from_last_commit() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let upstream = ws.upstream(REPO)?;
  let sha = upstream.commit("Work")?;
  upstream.tag("1.0.0", &sha)?;
  let next = upstream.commit("More work")?;

  // An old broken record that the last commit does not touch
  ws.write_file(&format!("deliverables/{}/stale.yaml", SERIES), "team: widgets\n")?;
  git(&ws.path, &["init", "--quiet", "--initial-branch=main"])?;
  git(&ws.path, &["add", "."])?;
  git(&ws.path, &["commit", "--quiet", "-m", "Seed release data"])?;

  ws.write_record(
    SERIES,
    "widget",
    &[("1.0.0", &[(REPO, sha.as_str())]), ("1.0.1", &[(REPO, next.as_str())])],
  )?;
  git(&ws.path, &["add", "."])?;
  git(&ws.path, &["commit", "--quiet", "-m", "Release widget 1.0.1"])?;

  let output = run_release_guard(&ws.path, &["validate", "--offline"])?;
  let out = stdout(&output);
  assert_eq!(output.status.code(), Some(0), "{}", out);
  assert!(out.contains("widget.yaml"), "{}", out);
  assert!(!out.contains("stale.yaml"), "{}", out);
  Ok(())
}

#[test]
fn test_falls_back_to_current_series() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file(&format!("deliverables/{}/stale.yaml", SERIES), "team: widgets\n")?;
  ws.write_file("deliverables/newton/other.yaml", "team: widgets\n")?;

  let output = run_release_guard(&ws.path, &["validate", "--offline"])?;
  let out = stdout(&output);
  assert_eq!(output.status.code(), Some(3), "{}", out);
  assert!(out.contains("stale.yaml"), "{}", out);
  assert!(!out.contains("other.yaml"), "{}", out);
  assert!(out.contains("Summary: 1 records"), "{}", out);
  Ok(())
}

#[test]
fn test_nothing_to_validate() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_release_guard(&ws.path, &["validate", "--offline"])?;
  assert_eq!(output.status.code(), Some(0));
  assert!(stdout(&output).contains("No deliverable files to validate"));
  Ok(())
}
