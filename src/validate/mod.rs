//! Release-record validation
//!
//! - **engine**: history checks for one record
//! - **report**: findings accumulated for one record
//! - **batch**: many records on a worker pool, with metadata checks

pub mod batch;
pub mod engine;
pub mod report;

pub use batch::{BatchValidator, RecordReport};
pub use engine::INDEPENDENT_SERIES;
pub use report::{Finding, FindingKind, Report, Severity};
