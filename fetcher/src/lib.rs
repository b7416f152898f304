//! Third-party artifact fetcher library.
//!
//! This crate downloads a Maven-hosted binary distribution and GitHub archive
//! snapshots into a destination directory, unpacks them, and renames the
//! unpacked trees to canonical names. It backs the `thirdparty-fetch` binary
//! and can be driven programmatically with stubbed backends for testing.
//!
//! # Modules
//!
//! - [`cli`] - Command-line argument definitions and validation
//! - [`command`] - External command execution with optional timeouts
//! - [`dirs`] - Directory resolution for the user configuration file
//! - [`error`] - Semantic error types and exit-code mapping
//! - [`extraction`] - Archive extraction with path traversal protection
//! - [`fetch`] - Maven and HTTP artifact fetchers
//! - [`logging`] - `env_logger` initialisation from CLI verbosity
//! - [`manifest`] - Artifact manifest schema and loading
//! - [`mirror`] - Mirror base URL override
//! - [`normalize`] - Renaming unpacked trees to canonical names
//! - [`output`] - Progress and dry-run output formatting
//! - [`pipeline`] - Pipeline orchestration
//! - [`plan`] - Resolution of manifest entries into concrete fetch steps
//! - [`reset`] - Destination directory reset

pub mod cli;
pub mod command;
pub mod dirs;
pub mod error;
pub mod extraction;
pub mod fetch;
pub mod logging;
pub mod manifest;
pub mod mirror;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod plan;
pub mod reset;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
