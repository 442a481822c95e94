//! Decide which record files a run validates
//!
//! Explicit paths win. Otherwise the records touched by the last commit are
//! validated, and when the last commit touched none, every record of the
//! current series.

use crate::core::error::GuardResult;
use crate::core::vcs::SystemGit;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Record files to validate for the repository at `root`
pub fn find_deliverable_files(
  root: &Path,
  deliverables_dir: &Path,
  explicit: &[PathBuf],
  current_series: &str,
) -> GuardResult<Vec<PathBuf>> {
  if !explicit.is_empty() {
    return Ok(explicit.to_vec());
  }

  let modified = modified_deliverable_files(root, deliverables_dir);
  if !modified.is_empty() {
    info!(count = modified.len(), "validating records modified by the last commit");
    return Ok(modified);
  }

  info!(series = current_series, "no modified records, validating the current series");
  series_files(root, deliverables_dir, current_series)
}

/// Records changed since `HEAD^` that still exist
///
/// Not being in a git checkout, or having a single commit, just means there is
/// nothing modified.
fn modified_deliverable_files(root: &Path, deliverables_dir: &Path) -> Vec<PathBuf> {
  let changed = match SystemGit::open(root).and_then(|git| git.changed_files("HEAD^")) {
    Ok(changed) => changed,
    Err(err) => {
      debug!(error = %err, "could not list modified files");
      return Vec::new();
    }
  };

  let mut files: Vec<PathBuf> = changed
    .into_iter()
    .filter(|p| p.starts_with(deliverables_dir) && is_yaml(p))
    .map(|p| root.join(p))
    .filter(|p| p.is_file())
    .collect();
  files.sort();
  files
}

fn series_files(root: &Path, deliverables_dir: &Path, series: &str) -> GuardResult<Vec<PathBuf>> {
  let dir = root.join(deliverables_dir).join(series);
  let pattern = dir.join("*.yaml");
  let mut files = Vec::new();
  for entry in glob::glob(&pattern.to_string_lossy())? {
    match entry {
      Ok(path) => files.push(path),
      Err(err) => debug!(error = %err, "skipping unreadable path"),
    }
  }
  files.sort();
  Ok(files)
}

fn is_yaml(path: &Path) -> bool {
  path.extension().is_some_and(|ext| ext == "yaml")
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use std::process::Command;
  use tempfile::TempDir;

  fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
      .current_dir(dir)
      .args(["-c", "user.name=Test", "-c", "user.email=test@example.com"])
      .args(args)
      .status()
      .unwrap();
    assert!(status.success(), "git {:?} failed", args);
  }

  fn write(root: &Path, rel: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "releases: []\n").unwrap();
  }

  #[test]
  fn test_explicit_paths_win() {
    let temp = TempDir::new().unwrap();
    let explicit = vec![PathBuf::from("a.yaml")];
    let files = find_deliverable_files(temp.path(), Path::new("deliverables"), &explicit, "S").unwrap();
    assert_eq!(files, explicit);
  }

  #[test]
  fn test_series_glob_outside_git() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "deliverables/S/b.yaml");
    write(temp.path(), "deliverables/S/a.yaml");
    write(temp.path(), "deliverables/S/notes.txt");
    write(temp.path(), "deliverables/old/c.yaml");

    let files = find_deliverable_files(temp.path(), Path::new("deliverables"), &[], "S").unwrap();
    assert_eq!(
      files,
      vec![
        temp.path().join("deliverables/S/a.yaml"),
        temp.path().join("deliverables/S/b.yaml"),
      ]
    );
  }

  #[test]
  fn test_modified_files_from_last_commit() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    git(root, &["init", "--quiet"]);
    write(root, "deliverables/S/a.yaml");
    write(root, "deliverables/old/gone.yaml");
    git(root, &["add", "."]);
    git(root, &["commit", "--quiet", "-m", "initial"]);

    write(root, "deliverables/old/b.yaml");
    write(root, "README.yaml");
    fs::remove_file(root.join("deliverables/old/gone.yaml")).unwrap();
    git(root, &["add", "-A"]);
    git(root, &["commit", "--quiet", "-m", "second"]);

    let files = find_deliverable_files(root, Path::new("deliverables"), &[], "S").unwrap();
    assert_eq!(files, vec![root.join("deliverables/old/b.yaml")]);
  }
}
