//! HTTP link probe

use super::trait_def::LinkProbe;
use crate::core::error::GuardResult;
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::debug;

/// Probe backed by a blocking reqwest client with a request timeout
pub struct HttpProbe {
  client: Client,
}

impl HttpProbe {
  pub fn new(timeout: Duration) -> GuardResult<Self> {
    let client = Client::builder()
      .timeout(timeout)
      .user_agent(concat!("release-guard/", env!("CARGO_PKG_VERSION")))
      .build()?;
    Ok(Self { client })
  }
}

impl LinkProbe for HttpProbe {
  fn status(&self, url: &str) -> GuardResult<u16> {
    let status = self.client.get(url).send()?.status().as_u16();
    debug!(url, status, "probed link");
    Ok(status)
  }
}
