//! CLI commands for release-guard
//!
//! - **validate**: check release records against repository history,
//!   governance data and release policy

pub mod validate;

pub use validate::{ValidateArgs, run_validate};
