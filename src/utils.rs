//! Small helpers shared by the clone oracle and the validate command

use std::path::Path;

/// Whether a clone source is a filesystem path rather than a URL
///
/// `git_base` may point at a directory of bare repositories (mirrors, test
/// fixtures) or at a git host. Paths are absolute, `./`/`../` relative, or
/// Windows drive paths; anything with a scheme or an scp-style `user@host:`
/// prefix is remote. Bare names are treated as remote.
pub fn is_local_path(source: &str) -> bool {
  if source.is_empty() || source.contains("://") {
    return false;
  }
  if source.starts_with("./") || source.starts_with("../") || source.starts_with("\\\\") {
    return true;
  }
  if let [drive, b':', sep, ..] = source.as_bytes()
    && drive.is_ascii_alphabetic()
    && matches!(sep, b'/' | b'\\')
  {
    return true;
  }
  if source.starts_with('/') {
    return !source.contains('@');
  }
  !source.contains('@') && Path::new(source).is_absolute()
}
