//! End-to-end tests for the release-guard binary
//!
//! Each test builds upstream git repositories and a release-data checkout in
//! temporary directories, then runs the binary against them offline.

mod helpers;
mod test_discover;
mod test_validate;
