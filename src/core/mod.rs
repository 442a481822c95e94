//! Core building blocks for release-guard
//!
//! - **config**: release-guard.toml parsing and validation
//! - **error**: error types with contextual help messages and exit codes
//! - **vcs**: system git with an isolated environment and deadlines

pub mod config;
pub mod error;
pub mod vcs;
