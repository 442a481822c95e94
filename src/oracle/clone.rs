//! History answered from local clones
//!
//! Each repository is cloned at most once per run into a scratch directory the
//! caller owns. Clones are made lazily, the first time a question about the
//! repository is asked, and every git invocation carries the configured
//! deadline.

use super::{HistoryOracle, OracleError, OracleErrorKind, OracleResult};
use crate::core::vcs::{RunError, SystemGit, first_line};
use crate::record::is_a_hash;
use crate::utils;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info};

type CloneSlot = Arc<Mutex<Option<OracleResult<SystemGit>>>>;

/// Oracle backed by `git clone` of `<git_base>/<repo>`
pub struct CloneHistoryOracle {
  workdir: PathBuf,
  git_base: String,
  timeout: Duration,
  clones: Mutex<HashMap<String, CloneSlot>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn run_error(repo: &str, err: RunError) -> OracleError {
  match err {
    RunError::TimedOut(_) => OracleError::new(OracleErrorKind::Timeout, repo, err.to_string()),
    RunError::Spawn(_) => OracleError::new(OracleErrorKind::Unreachable, repo, err.to_string()),
  }
}

impl CloneHistoryOracle {
  /// Create an oracle that clones into `workdir`
  pub fn new(workdir: &Path, git_base: impl Into<String>, timeout: Duration) -> Self {
    Self {
      workdir: workdir.to_path_buf(),
      git_base: git_base.into(),
      timeout,
      clones: Mutex::new(HashMap::new()),
    }
  }

  /// Where `repo` is fetched from
  pub fn remote_url(&self, repo: &str) -> String {
    if utils::is_local_path(&self.git_base) {
      Path::new(&self.git_base).join(repo).to_string_lossy().to_string()
    } else {
      format!("{}/{}", self.git_base.trim_end_matches('/'), repo)
    }
  }

  /// Get the clone for `repo`, creating it on first use
  ///
  /// Concurrent callers asking about the same repository wait for a single
  /// clone; a failed clone is remembered for the rest of the run.
  fn repository(&self, repo: &str) -> OracleResult<SystemGit> {
    let slot = {
      let mut clones = lock(&self.clones);
      clones.entry(repo.to_string()).or_default().clone()
    };

    let mut slot = lock(&slot);
    if let Some(existing) = slot.as_ref() {
      return existing.clone();
    }

    let result = self.clone_repo(repo);
    *slot = Some(result.clone());
    result
  }

  fn clone_repo(&self, repo: &str) -> OracleResult<SystemGit> {
    if repo.is_empty() || repo.starts_with('/') || repo.split('/').any(|part| part == "..") {
      return Err(OracleError::new(
        OracleErrorKind::Malformed,
        repo,
        "not a namespace/name repository identifier",
      ));
    }

    let dest = self.workdir.join(repo);
    if let Some(parent) = dest.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| OracleError::new(OracleErrorKind::Unreachable, repo, format!("creating {}: {}", parent.display(), e)))?;
    }

    let url = self.remote_url(repo);
    info!(repo, url = %url, "cloning");
    let (git, output) = SystemGit::clone_repo(&url, &dest, Some(self.timeout)).map_err(|e| run_error(repo, e))?;
    if !output.status.success() {
      return Err(OracleError::new(
        OracleErrorKind::Unreachable,
        repo,
        format!("git clone {} failed: {}", url, String::from_utf8_lossy(&output.stderr)),
      ));
    }

    // Tags not reachable from the default branch are not copied by clone.
    let output = git
      .run(&["fetch", "--quiet", "--tags", "origin"])
      .map_err(|e| run_error(repo, e))?;
    if !output.status.success() {
      return Err(OracleError::new(
        OracleErrorKind::Unreachable,
        repo,
        format!("git fetch --tags failed: {}", String::from_utf8_lossy(&output.stderr)),
      ));
    }

    debug!(repo, path = %dest.display(), "clone ready");
    Ok(git)
  }
}

impl HistoryOracle for CloneHistoryOracle {
  fn commit_exists(&self, repo: &str, hash: &str) -> OracleResult<bool> {
    let git = self.repository(repo)?;
    let spec = format!("{}^{{commit}}", hash);
    let output = git.run(&["cat-file", "-e", &spec]).map_err(|e| run_error(repo, e))?;
    Ok(output.status.success())
  }

  fn tag_exists(&self, repo: &str, version: &str) -> OracleResult<bool> {
    let git = self.repository(repo)?;
    let tag_ref = format!("refs/tags/{}", version);
    let output = git
      .run(&["rev-parse", "--verify", "--quiet", &tag_ref])
      .map_err(|e| run_error(repo, e))?;
    Ok(output.status.success())
  }

  fn resolve_tag(&self, repo: &str, version: &str) -> OracleResult<String> {
    let git = self.repository(repo)?;
    let spec = format!("refs/tags/{}^{{commit}}", version);
    let output = git
      .run(&["rev-parse", "--verify", "--quiet", &spec])
      .map_err(|e| run_error(repo, e))?;

    if !output.status.success() {
      return Err(OracleError::new(
        OracleErrorKind::NotFound,
        repo,
        format!("no tag {}", version),
      ));
    }

    let sha = first_line(&output);
    if !is_a_hash(&sha) {
      return Err(OracleError::new(
        OracleErrorKind::Malformed,
        repo,
        format!("tag {} resolved to {:?}", version, sha),
      ));
    }
    Ok(sha)
  }

  fn is_descendant(&self, repo: &str, ancestor: &str, descendant: &str) -> OracleResult<bool> {
    let git = self.repository(repo)?;
    let output = git
      .run(&["merge-base", "--is-ancestor", ancestor, descendant])
      .map_err(|e| run_error(repo, e))?;

    // 0 = ancestor, 1 = not an ancestor, anything else = git could not decide
    match output.status.code() {
      Some(0) => Ok(true),
      Some(1) => Ok(false),
      _ => Err(OracleError::new(
        OracleErrorKind::NotFound,
        repo,
        format!(
          "git merge-base --is-ancestor {} {}: {}",
          ancestor,
          descendant,
          String::from_utf8_lossy(&output.stderr)
        ),
      )),
    }
  }
}
