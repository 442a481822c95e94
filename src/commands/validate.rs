//! `release-guard validate` - Check release records against repository history
//!
//! Loads configuration, governance data and the optional CI layout, picks the
//! record files to validate, and runs them through metadata checks and the
//! history engine. Clones go into a scratch directory removed at the end of
//! the run unless `--no-cleanup` is given.

use crate::checks::{HttpProbe, LinkProbe, create_default_runner};
use crate::core::config::{GuardConfig, HistoryBackend};
use crate::core::error::{GuardResult, ResultExt};
use crate::governance::ProjectsFile;
use crate::oracle::cgit::CgitTemplates;
use crate::oracle::{CgitHistoryOracle, CloneHistoryOracle, HistoryOracle};
use crate::policy::{CiLayout, TemplatePolicy};
use crate::record::find_deliverable_files;
use crate::ui::progress::BatchProgress;
use crate::ui::report::{Summary, write_json, write_text};
use crate::utils;
use crate::validate::BatchValidator;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Options for one `validate` invocation
#[derive(Debug, Clone, Default)]
pub struct ValidateArgs {
  /// Record files; empty means discover them
  pub files: Vec<PathBuf>,
  /// Override `series.current`
  pub series: Option<String>,
  /// Explicit config file instead of the search path
  pub config: Option<PathBuf>,
  /// Override `history.jobs`
  pub jobs: Option<usize>,
  /// Skip checks that need the network
  pub offline: bool,
  /// Keep the clone directory after the run
  pub no_cleanup: bool,
  /// Print JSON instead of text
  pub json: bool,
}

/// Run the validate command for the repository at `root`
///
/// Returns whether every record passed. Findings are never an `Err`; only
/// problems that stop the run are.
pub fn run_validate(root: &Path, args: ValidateArgs) -> GuardResult<bool> {
  let mut config = match &args.config {
    Some(path) => GuardConfig::load_from(path)?,
    None => GuardConfig::load(root)?,
  };
  if let Some(series) = args.series {
    config.series.current = Some(series);
  }
  if let Some(jobs) = args.jobs {
    config.history.jobs = jobs;
  }
  config.validate()?;
  let current_series = config.current_series()?.to_string();

  let governance = ProjectsFile::load(&root.join(&config.paths.governance))?;
  let ci_layout = match &config.paths.ci_layout {
    Some(path) => {
      let policy = TemplatePolicy {
        release_templates: config.release_jobs.templates.clone(),
        deprecated: config.release_jobs.deprecated.clone(),
      };
      Some(CiLayout::load(&root.join(path), &policy)?)
    }
    None => None,
  };

  let files = find_deliverable_files(root, &config.paths.deliverables, &args.files, &current_series)?;
  if files.is_empty() {
    if args.json {
      write_json(&mut io::stdout(), &[])?;
    } else {
      println!("✅ No deliverable files to validate");
    }
    return Ok(true);
  }

  let workdir = tempfile::Builder::new()
    .prefix("release-guard-")
    .tempdir()
    .context("Failed to create clone directory")?;
  info!(workdir = %workdir.path().display(), "cloning into scratch directory");

  let timeout = config.history.timeout();
  let git_base = resolve_git_base(root, &config.history.git_base);
  let clones = CloneHistoryOracle::new(workdir.path(), git_base, timeout);
  let oracle: Box<dyn HistoryOracle> = match config.history.backend {
    HistoryBackend::Clone => Box::new(clones),
    HistoryBackend::Cgit => {
      let templates = CgitTemplates {
        commit_url: config.history.commit_url.clone(),
        tag_url: config.history.tag_url.clone(),
      };
      Box::new(CgitHistoryOracle::new(templates, timeout, clones)?)
    }
  };

  let probe = if args.offline {
    None
  } else {
    Some(HttpProbe::new(timeout)?)
  };
  let runner = create_default_runner();
  for check in runner.checks() {
    debug!(check = check.name(), expensive = check.is_expensive(), online = probe.is_some(), "metadata check registered");
  }

  let mut batch = BatchValidator::new(oracle.as_ref(), &governance, &current_series)
    .with_checks(&runner, probe.as_ref().map(|p| p as &dyn LinkProbe), &config.metadata.launchpad_api)
    .with_independent_series(&config.series.independent)
    .with_jobs(config.history.jobs);
  if let Some(layout) = &ci_layout {
    batch = batch.with_release_jobs(layout);
  }

  let progress = if args.json {
    BatchProgress::hidden()
  } else {
    BatchProgress::new(files.len(), format!("Validating {} records", files.len()))
  };
  let reports = batch.validate_files(&files, &progress)?;

  if args.json {
    write_json(&mut io::stdout(), &reports)?;
  } else {
    write_text(&mut io::stdout(), &reports)?;
  }

  if args.no_cleanup {
    let kept = workdir.keep();
    eprintln!("Clones kept in {}", kept.display());
  }

  Ok(Summary::from_reports(&reports).passed())
}

/// Local relative clone sources are taken relative to the repository root
fn resolve_git_base(root: &Path, git_base: &str) -> String {
  let path = Path::new(git_base);
  if utils::is_local_path(git_base) && path.is_relative() {
    root.join(path).to_string_lossy().to_string()
  } else {
    git_base.to_string()
  }
}
