//! Error types for release-guard with contextual messages and exit codes
//!
//! These are *program* errors: a config that does not parse, a record file
//! that cannot be read, git missing from PATH. Problems found inside a record
//! are never errors in this sense; they are findings in a
//! [`Report`](crate::validate::Report).

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for release-guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, missing files)
  User = 1,
  /// System error (git, network, I/O)
  System = 2,
  /// Validation failure (at least one record has errors)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for release-guard
#[derive(Debug)]
pub enum GuardError {
  /// Configuration errors
  Config(ConfigError),

  /// Git operation errors
  Git(GitError),

  /// Record or data file errors (deliverables, governance, CI layout)
  Record(RecordError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl GuardError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    GuardError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      GuardError::Message { message, context, help } => GuardError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      GuardError::Io(err) => GuardError::Message {
        message: format!("{}: {}", ctx_str, err),
        context: None,
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      GuardError::Config(_) => ExitCode::User,
      GuardError::Git(_) => ExitCode::System,
      GuardError::Record(_) => ExitCode::User,
      GuardError::Io(_) => ExitCode::System,
      GuardError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      GuardError::Config(e) => e.help_message(),
      GuardError::Git(e) => e.help_message(),
      GuardError::Record(e) => e.help_message(),
      GuardError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for GuardError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GuardError::Config(e) => write!(f, "{}", e),
      GuardError::Git(e) => write!(f, "{}", e),
      GuardError::Record(e) => write!(f, "{}", e),
      GuardError::Io(e) => write!(f, "I/O error: {}", e),
      GuardError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for GuardError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      GuardError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for GuardError {
  fn from(err: io::Error) -> Self {
    GuardError::Io(err)
  }
}

impl From<String> for GuardError {
  fn from(msg: String) -> Self {
    GuardError::message(msg)
  }
}

impl From<&str> for GuardError {
  fn from(msg: &str) -> Self {
    GuardError::message(msg)
  }
}

impl From<toml_edit::de::Error> for GuardError {
  fn from(err: toml_edit::de::Error) -> Self {
    GuardError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_yaml::Error> for GuardError {
  fn from(err: serde_yaml::Error) -> Self {
    GuardError::message(format!("YAML error: {}", err))
  }
}

impl From<serde_json::Error> for GuardError {
  fn from(err: serde_json::Error) -> Self {
    GuardError::message(format!("JSON error: {}", err))
  }
}

impl From<glob::PatternError> for GuardError {
  fn from(err: glob::PatternError) -> Self {
    GuardError::message(format!("Invalid glob pattern: {}", err))
  }
}

impl From<rayon::ThreadPoolBuildError> for GuardError {
  fn from(err: rayon::ThreadPoolBuildError) -> Self {
    GuardError::message(format!("Failed to build worker pool: {}", err))
  }
}

impl From<reqwest::Error> for GuardError {
  fn from(err: reqwest::Error) -> Self {
    GuardError::message(format!("HTTP client error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// A value failed validation after load
  Invalid { field: String, reason: String },

  /// No current series given on the command line or in the config
  MissingSeries,
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::MissingSeries => {
        Some("Set `series.current` in release-guard.toml or pass --series <name>.".to_string())
      }
      ConfigError::Invalid { field, .. } => Some(format!("Fix `{}` in release-guard.toml.", field)),
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::Invalid { field, reason } => {
        write!(f, "Invalid configuration value for {}: {}", field, reason)
      }
      ConfigError::MissingSeries => write!(f, "No current release series configured"),
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::RepoNotFound { path } => Some(format!(
        "Run release-guard from inside the releases repository or pass files explicitly: {}",
        path.display()
      )),
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
    }
  }
}

/// Errors reading structured data files
#[derive(Debug)]
pub enum RecordError {
  /// File could not be parsed as the expected document
  Parse { path: PathBuf, reason: String },

  /// A required top-level key is missing
  MissingField { path: PathBuf, field: String },
}

impl RecordError {
  fn help_message(&self) -> Option<String> {
    match self {
      RecordError::Parse { .. } => Some("Check the file for YAML syntax errors.".to_string()),
      RecordError::MissingField { field, .. } => Some(format!("Add a `{}` entry to the file.", field)),
    }
  }
}

impl fmt::Display for RecordError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RecordError::Parse { path, reason } => {
        write!(f, "Could not parse {}: {}", path.display(), reason)
      }
      RecordError::MissingField { path, field } => {
        write!(f, "{} has no {} entry", path.display(), field)
      }
    }
  }
}

/// Result type alias for release-guard
pub type GuardResult<T> = Result<T, GuardError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> GuardResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> GuardResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<GuardError>,
{
  fn context(self, ctx: impl Into<String>) -> GuardResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> GuardResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &GuardError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
