//! CLI argument definitions for the third-party fetcher.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use crate::error::USAGE_EXIT_CODE;
use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};
use std::time::Duration;

/// Fetch, unpack, and normalize third-party artifacts.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "thirdparty-fetch")]
#[command(version, about)]
#[command(long_about = concat!(
    "Fetch, unpack, and normalize third-party artifacts.\n\n",
    "Downloads a Maven-hosted binary distribution and GitHub archive snapshots ",
    "into DEST_DIR, unpacks them under DEST_DIR/src, and renames the unpacked ",
    "trees to version-free names. Existing subdirectories of DEST_DIR are removed ",
    "first. If any download fails, DEST_DIR is deleted and the failing fetch's ",
    "exit status is returned.",
))]
#[command(after_help = concat!(
    "ENVIRONMENT:\n",
    "  THIRDPARTY_MIRROR   Base URL replacing https://github.com for archive downloads\n",
    "  RUST_LOG            Log filter, refining -v/-q\n\n",
    "EXAMPLES:\n",
    "  Fetch everything for release 0.10.0:\n",
    "    $ thirdparty-fetch ./thirdparty 0.10.0\n\n",
    "  Fetch through an internal mirror:\n",
    "    $ THIRDPARTY_MIRROR=http://mirror.local/github thirdparty-fetch ./thirdparty 0.10.0\n\n",
    "  Preview the fetch plan:\n",
    "    $ thirdparty-fetch --dry-run ./thirdparty 0.10.0",
))]
pub struct Cli {
    /// Destination directory for archives and unpacked trees.
    #[arg(value_name = "DEST_DIR")]
    pub dest_dir: Utf8PathBuf,

    /// Version of the Maven distribution to fetch.
    #[arg(value_name = "VERSION")]
    pub release: String,

    /// Load the artifact manifest from a TOML file.
    #[arg(short, long, value_name = "FILE")]
    pub manifest: Option<Utf8PathBuf>,

    /// Print the fetch plan and exit without touching the filesystem.
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (repeatable: -v, -vv, -vvv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,

    /// HTTP backend used for archive downloads.
    #[arg(long, value_enum, default_value_t = HttpClient::Native)]
    pub http_client: HttpClient,

    /// Abort a single fetch after this many seconds.
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,
}

/// HTTP backends for archive downloads.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HttpClient {
    /// Built-in HTTP client.
    #[default]
    Native,
    /// The `wget` program.
    Wget,
}

impl Cli {
    /// Returns the per-fetch timeout, if one was given.
    ///
    /// # Examples
    ///
    /// ```
    /// use clap::Parser;
    /// use std::time::Duration;
    /// use thirdparty_fetch::cli::Cli;
    ///
    /// let cli = Cli::parse_from(["thirdparty-fetch", "--timeout", "30", "/d", "1.0"]);
    /// assert_eq!(cli.timeout(), Some(Duration::from_secs(30)));
    /// ```
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}

/// Maps a clap parse failure to the process exit status.
///
/// `--help` and `--version` exit successfully; every other parse failure
/// is a usage error.
///
/// # Examples
///
/// ```
/// use clap::Parser;
/// use thirdparty_fetch::cli::{Cli, parse_exit_code};
///
/// let err = Cli::try_parse_from(["thirdparty-fetch", "/d"]).expect_err("missing version");
/// assert_eq!(parse_exit_code(&err), 255);
/// ```
#[must_use]
pub fn parse_exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => 0,
        _ => USAGE_EXIT_CODE,
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
