//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub const SERIES: &str = "ocata";
pub const REPO: &str = "openstack/widget";

/// An upstream repository the history oracle clones from
pub struct Upstream {
  pub path: PathBuf,
}

impl Upstream {
  /// Create `<base>/<repo>` with one initial commit on `main`
  pub fn create(base: &Path, repo: &str) -> Result<Self> {
    let path = base.join(repo);
    std::fs::create_dir_all(&path)?;
    git(&path, &["init", "--quiet", "--initial-branch=main"])?;
    let upstream = Self { path };
    upstream.commit("Initial commit")?;
    Ok(upstream)
  }

  /// Add an empty commit on the current branch and return its SHA
  pub fn commit(&self, message: &str) -> Result<String> {
    git(&self.path, &["commit", "--quiet", "--allow-empty", "-m", message])?;
    self.head()
  }

  pub fn head(&self) -> Result<String> {
    let output = git(&self.path, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Lightweight tag `version` at `sha`
  pub fn tag(&self, version: &str, sha: &str) -> Result<()> {
    git(&self.path, &["tag", version, sha])?;
    Ok(())
  }

  /// Create and switch to `branch` starting at `start`
  pub fn branch(&self, branch: &str, start: &str) -> Result<()> {
    git(&self.path, &["checkout", "--quiet", "-b", branch, start])?;
    Ok(())
  }
}

/// A release-data checkout with config, governance data and records
pub struct TestWorkspace {
  _root: TempDir,
  pub path: PathBuf,
  pub git_base: PathBuf,
}

impl TestWorkspace {
  /// Create a workspace whose current series is [`SERIES`] and whose
  /// governance data assigns [`REPO`] to the `widget` deliverable
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().join("releases");
    let git_base = root.path().join("upstream");
    std::fs::create_dir_all(&path)?;
    std::fs::create_dir_all(&git_base)?;

    std::fs::write(
      path.join("release-guard.toml"),
      format!(
        r#"[series]
current = "{}"

[history]
git_base = "{}"
timeout_secs = 60
jobs = 2
"#,
        SERIES,
        git_base.display()
      ),
    )?;

    std::fs::create_dir_all(path.join("governance"))?;
    std::fs::write(
      path.join("governance/projects.yaml"),
      format!(
        r#"widgets:
  deliverables:
    widget:
      repos:
        - {}
"#,
        REPO
      ),
    )?;

    Ok(Self {
      _root: root,
      path,
      git_base,
    })
  }

  /// Create an upstream repository under the configured `git_base`
  pub fn upstream(&self, repo: &str) -> Result<Upstream> {
    Upstream::create(&self.git_base, repo)
  }

  /// Write `deliverables/<series>/<name>.yaml` with full metadata
  pub fn write_record(&self, series: &str, name: &str, releases: &[(&str, &[(&str, &str)])]) -> Result<PathBuf> {
    let mut yaml = String::from(
      "launchpad: widget\nteam: widgets\nsend-announcements-to: release-announce@lists.example.org\nreleases:\n",
    );
    for (version, projects) in releases {
      yaml.push_str(&format!("  - version: \"{}\"\n    projects:\n", version));
      for (repo, hash) in projects.iter() {
        yaml.push_str(&format!("      - repo: {}\n        hash: \"{}\"\n", repo, hash));
      }
    }
    self.write_file(&format!("deliverables/{}/{}.yaml", series, name), &yaml)
  }

  /// Write an arbitrary file relative to the workspace
  pub fn write_file(&self, rel: &str, content: &str) -> Result<PathBuf> {
    let file = self.path.join(rel);
    if let Some(parent) = file.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&file, content)?;
    Ok(file)
  }
}

/// Run git with a fixed identity and no user configuration
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .env("GIT_CONFIG_NOSYSTEM", "1")
    .env("GIT_CONFIG_GLOBAL", "/dev/null")
    .args([
      "-c",
      "user.name=Test User",
      "-c",
      "user.email=test@example.com",
      "-c",
      "commit.gpgsign=false",
      "-c",
      "tag.gpgsign=false",
    ])
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run the release-guard binary; the exit status is left to the caller
pub fn run_release_guard(cwd: &Path, args: &[&str]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_release-guard");

  Command::new(bin)
    .current_dir(cwd)
    .env_remove("RELEASE_GUARD_LOG")
    .args(args)
    .output()
    .context("Failed to run release-guard")
}

pub fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).to_string()
}
