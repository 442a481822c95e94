//! Progress indicator for validation batches
//!
//! Uses `linya`, which draws to stderr and tolerates increments from several
//! worker threads. Nothing is drawn when stderr is not a terminal.

use linya::{Bar, Progress};
use std::io::IsTerminal;
use std::sync::{Arc, Mutex};

/// One bar counting validated records, shared across worker threads
#[derive(Clone)]
pub struct BatchProgress {
  inner: Option<(Arc<Mutex<Progress>>, Arc<Bar>)>,
}

impl BatchProgress {
  /// Create a bar for `total` records, or a no-op when stderr is not a tty
  pub fn new(total: usize, label: impl Into<String>) -> Self {
    if total == 0 || !std::io::stderr().is_terminal() {
      return Self::hidden();
    }
    let mut progress = Progress::new();
    let bar = progress.bar(total, label.into());
    Self {
      inner: Some((Arc::new(Mutex::new(progress)), Arc::new(bar))),
    }
  }

  /// A progress handle that never draws
  pub fn hidden() -> Self {
    Self { inner: None }
  }

  /// Increment by 1 (thread-safe)
  pub fn inc(&self) {
    if let Some((progress, bar)) = &self.inner
      && let Ok(mut progress) = progress.lock()
    {
      progress.inc_and_draw(bar, 1);
    }
  }
}
