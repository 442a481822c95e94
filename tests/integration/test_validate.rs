//! Integration tests for `release-guard validate`

use crate::helpers::{REPO, SERIES, TestWorkspace, run_release_guard, stderr, stdout};
use anyhow::Result;

#[test]
fn test_descendant_release_passes() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let upstream = ws.upstream(REPO)?;
  let first = upstream.commit("Feature one")?;
  upstream.tag("1.0.0", &first)?;
  let second = upstream.commit("Feature two")?;

  ws.write_record(
    SERIES,
    "widget",
    &[("1.0.0", &[(REPO, first.as_str())]), ("1.1.0", &[(REPO, second.as_str())])],
  )?;

  let output = run_release_guard(&ws.path, &["validate", "--offline"])?;
  let out = stdout(&output);
  assert_eq!(output.status.code(), Some(0), "stdout: {}\nstderr: {}", out, stderr(&output));
  assert!(out.contains("Summary: 1 records, 0 failed, 0 errors, 0 warnings"), "{}", out);
  Ok(())
}

#[test]
fn test_non_descendant_release_fails() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let upstream = ws.upstream(REPO)?;
  let base = upstream.head()?;
  let released = upstream.commit("Released work")?;
  upstream.tag("1.0.0", &released)?;
  upstream.branch("side", &base)?;
  let unrelated = upstream.commit("Side work")?;

  ws.write_record(
    SERIES,
    "widget",
    &[("1.0.0", &[(REPO, released.as_str())]), ("1.1.0", &[(REPO, unrelated.as_str())])],
  )?;

  let output = run_release_guard(&ws.path, &["validate", "--offline"])?;
  let out = stdout(&output);
  assert_eq!(output.status.code(), Some(3), "{}", out);
  assert!(out.contains("is not a descendant of 1.0.0"), "{}", out);
  assert!(out.contains(&unrelated), "{}", out);
  Ok(())
}

#[test]
fn test_retag_mismatch_and_missing_commit() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let upstream = ws.upstream(REPO)?;
  let tagged = upstream.commit("Tagged")?;
  let declared = upstream.commit("Declared")?;
  upstream.tag("1.0.0", &tagged)?;
  let ghost = "0123456789abcdef0123456789abcdef01234567";

  ws.write_record(
    SERIES,
    "widget",
    &[("1.0.0", &[(REPO, declared.as_str())]), ("1.0.1", &[(REPO, ghost)])],
  )?;

  let output = run_release_guard(&ws.path, &["validate", "--offline"])?;
  let out = stdout(&output);
  assert_eq!(output.status.code(), Some(3), "{}", out);
  assert!(
    out.contains(&format!("Version 1.0.0 in {} is on commit {} instead of {}", REPO, tagged, declared)),
    "{}",
    out
  );
  assert!(out.contains(&format!("No commit {} in {}", ghost, REPO)), "{}", out);
  Ok(())
}

#[test]
fn test_json_output() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let upstream = ws.upstream(REPO)?;
  let first = upstream.commit("Feature one")?;
  upstream.tag("1.0.0", &first)?;

  let record = ws.write_record(SERIES, "widget", &[("1.0.0", &[(REPO, "not-a-hash")])])?;

  let output = run_release_guard(
    &ws.path,
    &["validate", "--offline", "--json", record.to_str().unwrap_or_default()],
  )?;
  assert_eq!(output.status.code(), Some(3));

  let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(value["summary"]["records"], 1);
  assert_eq!(value["summary"]["errors"], 1);
  let finding = &value["records"][0]["report"]["findings"][0];
  assert_eq!(finding["severity"], "error");
  assert_eq!(finding["kind"], "structural");
  assert!(finding["message"].as_str().unwrap_or_default().contains("which is not a hash"));
  Ok(())
}

#[test]
fn test_record_without_releases_is_reported() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file(&format!("deliverables/{}/broken.yaml", SERIES), "team: widgets\n")?;

  let output = run_release_guard(&ws.path, &["validate", "--offline"])?;
  let out = stdout(&output);
  assert_eq!(output.status.code(), Some(3), "{}", out);
  assert!(out.contains("has no releases entry"), "{}", out);
  Ok(())
}

#[test]
fn test_entry_without_hash_does_not_hide_siblings() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let upstream = ws.upstream(REPO)?;
  let tagged = upstream.commit("Tagged")?;
  let declared = upstream.commit("Declared")?;
  upstream.tag("1.0.0", &tagged)?;

  ws.write_file(
    &format!("deliverables/{}/widget.yaml", SERIES),
    &format!(
      "launchpad: widget\nteam: widgets\nsend-announcements-to: release-announce@lists.example.org\nreleases:\n  - version: \"1.0.0\"\n    projects:\n      - repo: {}\n        hash: \"{}\"\n      - repo: openstack/widget-extras\n",
      REPO, declared
    ),
  )?;

  let output = run_release_guard(&ws.path, &["validate", "--offline"])?;
  let out = stdout(&output);
  assert_eq!(output.status.code(), Some(3), "{}", out);
  assert!(out.contains("openstack/widget-extras version 1.0.0 has no hash"), "{}", out);
  assert!(out.contains(&format!("is on commit {} instead of {}", tagged, declared)), "{}", out);
  Ok(())
}

#[test]
fn test_governance_drift_is_a_warning() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let widget = ws.upstream(REPO)?;
  let extra = ws.upstream("openstack/widget-extras")?;
  let w = widget.commit("Widget")?;
  widget.tag("1.0.0", &w)?;
  let e = extra.commit("Extras")?;
  extra.tag("1.0.0", &e)?;

  ws.write_record(
    SERIES,
    "widget",
    &[("1.0.0", &[(REPO, w.as_str()), ("openstack/widget-extras", e.as_str())])],
  )?;

  let output = run_release_guard(&ws.path, &["validate", "--offline"])?;
  let out = stdout(&output);
  assert_eq!(output.status.code(), Some(0), "{}", out);
  assert!(
    out.contains("includes repository openstack/widget-extras that is not in the governance list"),
    "{}",
    out
  );
  Ok(())
}

#[test]
fn test_old_series_skips_reconciliation() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let upstream = ws.upstream("openstack/legacy")?;
  let sha = upstream.commit("Legacy")?;
  upstream.tag("0.9.0", &sha)?;

  let record = ws.write_record("newton", "legacy", &[("0.9.0", &[("openstack/legacy", sha.as_str())])])?;

  let output = run_release_guard(&ws.path, &["validate", "--offline", record.to_str().unwrap_or_default()])?;
  let out = stdout(&output);
  assert_eq!(output.status.code(), Some(0), "{}", out);
  assert!(out.contains("0 errors, 0 warnings"), "{}", out);
  Ok(())
}

#[test]
fn test_missing_series_is_user_error() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file("release-guard.toml", "[history]\njobs = 1\n")?;

  let output = run_release_guard(&ws.path, &["validate", "--offline"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("--series"));
  Ok(())
}

#[test]
fn test_series_flag_overrides_config() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let upstream = ws.upstream(REPO)?;
  let sha = upstream.commit("Work")?;
  upstream.tag("2.0.0", &sha)?;
  ws.write_record("pike", "widget", &[("2.0.0", &[(REPO, sha.as_str())])])?;

  let output = run_release_guard(&ws.path, &["validate", "--offline", "--series", "pike"])?;
  let out = stdout(&output);
  assert_eq!(output.status.code(), Some(0), "{}", out);
  assert!(out.contains("deliverables/pike/widget.yaml"), "{}", out);
  Ok(())
}

#[test]
fn test_no_cleanup_keeps_clones() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let upstream = ws.upstream(REPO)?;
  let sha = upstream.commit("Work")?;
  upstream.tag("1.0.0", &sha)?;
  ws.write_record(SERIES, "widget", &[("1.0.0", &[(REPO, sha.as_str())])])?;

  let output = run_release_guard(&ws.path, &["validate", "--offline", "--no-cleanup"])?;
  assert_eq!(output.status.code(), Some(0));

  let err = stderr(&output);
  let kept = err
    .lines()
    .find_map(|line| line.strip_prefix("Clones kept in "))
    .map(str::to_string);
  let kept = kept.ok_or_else(|| anyhow::anyhow!("no kept directory reported: {}", err))?;
  assert!(std::path::Path::new(&kept).join(REPO).exists());
  std::fs::remove_dir_all(&kept)?;
  Ok(())
}

#[test]
fn test_unreachable_repository_is_oracle_failure() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let hash = "89abcdef0123456789abcdef0123456789abcdef";
  ws.write_record(SERIES, "widget", &[("1.0.0", &[(REPO, hash)])])?;

  let output = run_release_guard(&ws.path, &["validate", "--offline"])?;
  let out = stdout(&output);
  assert_eq!(output.status.code(), Some(3), "{}", out);
  assert!(out.contains(&format!("Could not check for commit {} in {}", hash, REPO)), "{}", out);
  Ok(())
}
