//! Release policy tables consulted by the engine
//!
//! - **versions**: version-format rules per release model
//! - **release_jobs**: CI release-job requirements per repository

pub mod release_jobs;
pub mod versions;

pub use release_jobs::{CiLayout, JobFinding, ReleaseJobRequirements, TemplatePolicy};
pub use versions::{ReleaseModelRules, VersionRules};
