//! System git backend
//!
//! Every call shells out to `git` with an isolated environment. Calls made on
//! behalf of the history oracle carry a deadline; a child that outlives it is
//! killed so a hung fetch can never stall a validation run.

use crate::core::error::{GitError, GuardError, GuardResult, ResultExt};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Failure to obtain any output from a git child process
#[derive(Debug)]
pub enum RunError {
  /// `git` could not be started or waited on
  Spawn(io::Error),
  /// The child was killed after exceeding its deadline
  TimedOut(Duration),
}

impl std::fmt::Display for RunError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      RunError::Spawn(e) => write!(f, "failed to run git: {}", e),
      RunError::TimedOut(d) => write!(f, "git did not finish within {}s", d.as_secs_f32()),
    }
  }
}

/// Run a command to completion, killing it once `timeout` has elapsed
///
/// Output pipes are drained on reader threads while the child runs, so a
/// chatty child never blocks on a full pipe.
pub fn run_with_timeout(mut cmd: Command, timeout: Option<Duration>) -> Result<Output, RunError> {
  cmd.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());

  let Some(timeout) = timeout else {
    return cmd.output().map_err(RunError::Spawn);
  };

  let mut child = cmd.spawn().map_err(RunError::Spawn)?;
  let stdout = drain(child.stdout.take());
  let stderr = drain(child.stderr.take());
  let started = Instant::now();
  loop {
    match child.try_wait().map_err(RunError::Spawn)? {
      Some(status) => {
        return Ok(Output {
          status,
          stdout: collect(stdout),
          stderr: collect(stderr),
        });
      }
      None if started.elapsed() >= timeout => {
        let _ = child.kill();
        let _ = child.wait();
        // Reader threads are left detached: a grandchild may still hold the pipes
        return Err(RunError::TimedOut(timeout));
      }
      None => thread::sleep(POLL_INTERVAL),
    }
  }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
  pipe.map(|mut pipe| {
    thread::spawn(move || {
      let mut buf = Vec::new();
      let _ = pipe.read_to_end(&mut buf);
      buf
    })
  })
}

fn collect(reader: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
  reader.and_then(|h| h.join().ok()).unwrap_or_default()
}

/// Create a safe git command with isolated environment
///
/// - Clears environment variables
/// - Whitelists only PATH and HOME
/// - Adds safe configuration overrides
fn isolated_git() -> Command {
  let mut cmd = Command::new("git");

  // Isolated environment (don't trust global config)
  cmd.env_clear();
  if let Ok(path) = std::env::var("PATH") {
    cmd.env("PATH", path);
  }
  if let Ok(home) = std::env::var("HOME") {
    cmd.env("HOME", home);
  }
  cmd.env("GIT_TERMINAL_PROMPT", "0");

  // Force safe behavior (override user config)
  cmd.arg("-c").arg("protocol.version=2");
  cmd.arg("-c").arg("advice.detachedHead=false");
  cmd.arg("-c").arg("core.quotePath=false");

  cmd
}

/// Git backend using system git
#[derive(Debug, Clone)]
pub struct SystemGit {
  /// Repository working directory
  pub(crate) repo_path: PathBuf,

  /// Deadline applied to every command run through [`SystemGit::run`]
  timeout: Option<Duration>,
}

impl SystemGit {
  /// Open an existing git repository
  pub fn open(path: &Path) -> GuardResult<Self> {
    let git = Self {
      repo_path: path.to_path_buf(),
      timeout: None,
    };

    let output = git
      .git_cmd()
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(GuardError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(GuardError::message(format!("Failed to open git repository: {}", stderr)));
    }

    Ok(git)
  }

  /// Wrap a directory without probing it; used for fresh clones
  pub(crate) fn at(path: &Path, timeout: Option<Duration>) -> Self {
    Self {
      repo_path: path.to_path_buf(),
      timeout,
    }
  }

  /// Clone `url` into `dest` and fetch every tag
  pub fn clone_repo(url: &str, dest: &Path, timeout: Option<Duration>) -> Result<(Self, Output), RunError> {
    let mut cmd = isolated_git();
    cmd.args(["clone", "--quiet", "--no-checkout", url]).arg(dest);
    let output = run_with_timeout(cmd, timeout)?;
    Ok((Self::at(dest, timeout), output))
  }

  /// Run `git <args>` in this repository under the configured deadline
  pub fn run(&self, args: &[&str]) -> Result<Output, RunError> {
    let mut cmd = self.git_cmd();
    cmd.args(args);
    run_with_timeout(cmd, self.timeout)
  }

  /// Paths changed between `base` and the working tree
  ///
  /// Deleted paths are included; callers decide what to do with them.
  pub fn changed_files(&self, base: &str) -> GuardResult<Vec<PathBuf>> {
    let output = self
      .git_cmd()
      .args(["diff", "--name-only", "--pretty=format:", base])
      .output()
      .context("Failed to run git diff")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(GuardError::Git(GitError::CommandFailed {
        command: format!("git diff --name-only {}", base),
        stderr: stderr.to_string(),
      }));
    }

    Ok(
      String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(PathBuf::from)
        .collect(),
    )
  }

  /// Create a git command bound to this repository
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = isolated_git();
    cmd.arg("-C").arg(&self.repo_path);
    cmd
  }
}

/// First line of stdout, trimmed
pub fn first_line(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout)
    .lines()
    .next()
    .unwrap_or("")
    .trim()
    .to_string()
}
