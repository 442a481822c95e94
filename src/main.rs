mod checks;
mod commands;
mod core;
mod governance;
mod oracle;
mod policy;
mod record;
mod ui;
mod utils;
mod validate;

use clap::{Parser, Subcommand};
use crate::core::error::{ExitCode, GuardError, print_error};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (`warn` when unset)
const LOG_ENV: &str = "RELEASE_GUARD_LOG";

/// Validate deliverable release records against repository history
#[derive(Parser)]
#[command(name = "release-guard")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Validate release records (modified records, or the current series)
  Validate {
    /// Record files to validate (default: records changed by the last commit)
    files: Vec<PathBuf>,
    /// Current release series (overrides series.current)
    #[arg(long)]
    series: Option<String>,
    /// Config file (default: release-guard.toml search path)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Records validated concurrently (overrides history.jobs)
    #[arg(short, long)]
    jobs: Option<usize>,
    /// Skip checks that need the network (bug tracker, release notes)
    #[arg(long)]
    offline: bool,
    /// Keep cloned repositories after the run
    #[arg(long)]
    no_cleanup: bool,
    /// Output results in JSON format
    #[arg(long)]
    json: bool,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn init_logging() {
  let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_logging();

  let root = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => handle_error(GuardError::message(format!("Failed to get current directory: {}", e))),
  };

  let result = match cli.command {
    Commands::Validate {
      files,
      series,
      config,
      jobs,
      offline,
      no_cleanup,
      json,
    } => commands::run_validate(
      &root,
      commands::ValidateArgs {
        files,
        series,
        config,
        jobs,
        offline,
        no_cleanup,
        json,
      },
    ),
  };

  match result {
    Ok(true) => {}
    Ok(false) => std::process::exit(ExitCode::Validation.as_i32()),
    Err(err) => handle_error(err),
  }
}

fn handle_error(err: GuardError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
