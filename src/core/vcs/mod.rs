pub mod system_git;

pub use system_git::{RunError, SystemGit, first_line};
