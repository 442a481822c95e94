//! Existence checks through a cgit web front end
//!
//! Asking the public web view whether a commit or tag exists avoids trusting
//! anything fetched into a local clone from a change under review. Questions
//! that need real history (tag resolution, ancestry) still go to a clone.

use super::{CloneHistoryOracle, HistoryOracle, OracleError, OracleErrorKind, OracleResult};
use crate::core::error::GuardResult;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::debug;

/// cgit marks unknown objects with this text while still answering 200
const BAD_OBJECT_MARKER: &str = "Bad object id";

/// URL templates for the cgit views; `{repo}` and `{ref}` are substituted
#[derive(Debug, Clone)]
pub struct CgitTemplates {
  pub commit_url: String,
  pub tag_url: String,
}

/// Oracle that answers existence over HTTP and delegates the rest
pub struct CgitHistoryOracle {
  client: Client,
  templates: CgitTemplates,
  clones: CloneHistoryOracle,
}

impl CgitHistoryOracle {
  pub fn new(templates: CgitTemplates, timeout: Duration, clones: CloneHistoryOracle) -> GuardResult<Self> {
    let client = Client::builder()
      .timeout(timeout)
      .redirect(reqwest::redirect::Policy::limited(10))
      .build()?;
    Ok(Self {
      client,
      templates,
      clones,
    })
  }

  fn probe(&self, template: &str, repo: &str, reference: &str) -> OracleResult<bool> {
    let url = expand(template, repo, reference);
    let response = self.client.get(&url).send().map_err(|e| http_error(repo, &url, e))?;

    let status = response.status();
    debug!(repo, url = %url, status = status.as_u16(), "cgit probe");
    if status == StatusCode::NOT_FOUND {
      return Ok(false);
    }
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
      return Err(OracleError::new(
        OracleErrorKind::Unreachable,
        repo,
        format!("GET {}: HTTP {}", url, status),
      ));
    }
    if !status.is_success() {
      return Err(OracleError::new(
        OracleErrorKind::Malformed,
        repo,
        format!("GET {}: unexpected HTTP {}", url, status),
      ));
    }

    let body = response.text().map_err(|e| http_error(repo, &url, e))?;
    Ok(!body.contains(BAD_OBJECT_MARKER))
  }
}

/// Substitute `{repo}` and `{ref}` in a URL template
pub fn expand(template: &str, repo: &str, reference: &str) -> String {
  template.replace("{repo}", repo).replace("{ref}", reference)
}

fn http_error(repo: &str, url: &str, err: reqwest::Error) -> OracleError {
  let kind = if err.is_timeout() {
    OracleErrorKind::Timeout
  } else if err.is_decode() || err.is_body() {
    OracleErrorKind::Malformed
  } else {
    OracleErrorKind::Unreachable
  };
  OracleError::new(kind, repo, format!("GET {}: {}", url, err))
}

impl HistoryOracle for CgitHistoryOracle {
  fn commit_exists(&self, repo: &str, hash: &str) -> OracleResult<bool> {
    self.probe(&self.templates.commit_url, repo, hash)
  }

  fn tag_exists(&self, repo: &str, version: &str) -> OracleResult<bool> {
    self.probe(&self.templates.tag_url, repo, version)
  }

  fn resolve_tag(&self, repo: &str, version: &str) -> OracleResult<String> {
    self.clones.resolve_tag(repo, version)
  }

  fn is_descendant(&self, repo: &str, ancestor: &str, descendant: &str) -> OracleResult<bool> {
    self.clones.is_descendant(repo, ancestor, descendant)
  }
}
