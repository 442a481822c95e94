//! Accumulated outcome of validating one record
//!
//! A report only grows. Findings keep the order the checks produced them and
//! are never deduplicated: the same message from two releases appears twice.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity level for findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  /// Informational message (not an issue)
  Info,
  /// Warning (non-blocking, advisory)
  Warning,
  /// Error (blocks acceptance of the record)
  Error,
}

impl fmt::Display for Severity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Severity::Info => write!(f, "INFO"),
      Severity::Warning => write!(f, "WARN"),
      Severity::Error => write!(f, "ERROR"),
    }
  }
}

/// What sort of problem a finding describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingKind {
  /// Malformed input: bad hash, missing field, no releases
  Structural,
  /// Declared history contradicts the repository: missing commit, retag
  /// mismatch, non-descendant commit, out-of-order new release
  Integrity,
  /// Record and governance disagree, or a human has to look
  Reconciliation,
  /// The history oracle could not answer
  OracleFailure,
  /// Version format, release jobs, record metadata
  Policy,
  /// Informational
  Note,
}

/// A single finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
  pub severity: Severity,
  pub kind: FindingKind,
  pub message: String,
}

/// Ordered findings for one record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
  findings: Vec<Finding>,
}

impl Report {
  /// Create an empty report
  pub fn new() -> Self {
    Self::default()
  }

  /// Append a finding
  pub fn push(&mut self, finding: Finding) {
    self.findings.push(finding);
  }

  /// Append every finding of `other`, keeping its order
  pub fn append(&mut self, other: Report) {
    self.findings.extend(other.findings);
  }

  /// Append a blocking finding
  pub fn error(&mut self, kind: FindingKind, message: impl Into<String>) {
    self.push(Finding {
      severity: Severity::Error,
      kind,
      message: message.into(),
    });
  }

  /// Append an advisory finding
  pub fn warning(&mut self, kind: FindingKind, message: impl Into<String>) {
    self.push(Finding {
      severity: Severity::Warning,
      kind,
      message: message.into(),
    });
  }

  /// Append an informational note
  pub fn note(&mut self, message: impl Into<String>) {
    self.push(Finding {
      severity: Severity::Info,
      kind: FindingKind::Note,
      message: message.into(),
    });
  }

  /// All findings in the order they were recorded
  pub fn findings(&self) -> &[Finding] {
    &self.findings
  }

  fn messages(&self, severity: Severity) -> Vec<&str> {
    self
      .findings
      .iter()
      .filter(|f| f.severity == severity)
      .map(|f| f.message.as_str())
      .collect()
  }

  /// Error messages, in order
  pub fn errors(&self) -> Vec<&str> {
    self.messages(Severity::Error)
  }

  /// Warning messages, in order
  pub fn warnings(&self) -> Vec<&str> {
    self.messages(Severity::Warning)
  }

  /// Informational notes, in order
  pub fn notes(&self) -> Vec<&str> {
    self.messages(Severity::Info)
  }

  /// Whether the record must be rejected
  pub fn has_errors(&self) -> bool {
    self.findings.iter().any(|f| f.severity == Severity::Error)
  }
}
