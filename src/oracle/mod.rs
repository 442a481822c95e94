//! Authoritative repository history
//!
//! The engine never talks to git or the network directly. It asks a
//! [`HistoryOracle`], which may be backed by local clones, a cgit web front
//! end, or an in-memory fake in tests.
//!
//! Every method distinguishes "no" from "could not find out": an unreachable
//! remote or a timed-out command is an [`OracleError`], never `Ok(false)`.

pub mod cgit;
pub mod clone;

use std::fmt;

pub use cgit::CgitHistoryOracle;
pub use clone::CloneHistoryOracle;

/// Why an oracle question went unanswered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleErrorKind {
  /// The call exceeded its deadline
  Timeout,
  /// The repository or service could not be reached
  Unreachable,
  /// The requested object does not exist where the question presumed it would
  NotFound,
  /// The oracle answered with something that could not be interpreted
  Malformed,
}

impl fmt::Display for OracleErrorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      OracleErrorKind::Timeout => write!(f, "timed out"),
      OracleErrorKind::Unreachable => write!(f, "unreachable"),
      OracleErrorKind::NotFound => write!(f, "not found"),
      OracleErrorKind::Malformed => write!(f, "malformed response"),
    }
  }
}

/// A failed oracle call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleError {
  pub kind: OracleErrorKind,
  pub repo: String,
  pub detail: String,
}

impl OracleError {
  pub fn new(kind: OracleErrorKind, repo: impl Into<String>, detail: impl Into<String>) -> Self {
    Self {
      kind,
      repo: repo.into(),
      detail: detail.into(),
    }
  }
}

impl fmt::Display for OracleError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} ({}): {}", self.repo, self.kind, self.detail.trim())
  }
}

impl std::error::Error for OracleError {}

pub type OracleResult<T> = Result<T, OracleError>;

/// Questions the engine asks about a repository's history
///
/// Implementations are shared by every record validated in a run, possibly
/// from several worker threads at once.
pub trait HistoryOracle: Send + Sync {
  /// Whether `hash` names a commit in `repo`
  fn commit_exists(&self, repo: &str, hash: &str) -> OracleResult<bool>;

  /// Whether `version` is a tag in `repo`
  fn tag_exists(&self, repo: &str, version: &str) -> OracleResult<bool>;

  /// Commit the tag `version` points at; an error if the tag is absent
  fn resolve_tag(&self, repo: &str, version: &str) -> OracleResult<String>;

  /// Whether `descendant` has `ancestor` in its history
  fn is_descendant(&self, repo: &str, ancestor: &str, descendant: &str) -> OracleResult<bool>;
}
