//! Record metadata checks
//!
//! All checks implement the `Check` trait and are registered in
//! [`create_default_runner`]. Findings go into the same report as the
//! engine's history findings.
//!
//! # Built-in Checks
//!
//! - **launchpad**: bug-tracker project is named and exists
//! - **team**: owning team is named and known to governance
//! - **announcements**: one announcement address is given
//! - **release-notes**: release-notes links resolve (network only)

mod announcements;
mod launchpad;
mod probe;
mod release_notes;
mod runner;
mod team;
mod trait_def;

pub use probe::HttpProbe;
pub use runner::{CheckRunner, create_default_runner};
pub use trait_def::{CheckContext, LinkProbe};
