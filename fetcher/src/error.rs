//! Error types for the third-party fetcher.
//!
//! This module defines semantic error variants for each pipeline stage and
//! maps them onto the process exit status. Fetch failures propagate the
//! status of the failing fetch so that callers scripting around the binary
//! see the same codes the underlying tools produce.

use crate::extraction::ExtractionError;
use crate::fetch::http::DownloadError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Exit status for malformed invocations (`-1` normalized to a byte).
pub const USAGE_EXIT_CODE: i32 = 255;

/// Exit status for manifest and configuration errors.
pub const CONFIG_EXIT_CODE: i32 = 2;

/// Exit status for unpack, normalize, and other local failures.
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Exit status reported when an external command exceeds its timeout.
///
/// Matches the convention used by coreutils `timeout`.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Errors that can occur while fetching and unpacking artifacts.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The version argument cannot be used to build artifact names.
    #[error("invalid version \"{version}\": {reason}")]
    InvalidVersion {
        /// The rejected version string.
        version: String,
        /// Why the version was rejected.
        reason: &'static str,
    },

    /// The manifest file could not be read.
    #[error("failed to read manifest {path}")]
    ManifestRead {
        /// Path of the manifest file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest could not be parsed.
    #[error("invalid manifest {origin}: {reason}")]
    ManifestParse {
        /// Where the manifest came from (a path or "built-in").
        origin: String,
        /// Description of the parse error.
        reason: String,
    },

    /// The manifest parsed but describes an unusable artifact set.
    #[error("invalid manifest: {reason}")]
    InvalidManifest {
        /// Description of the violated constraint.
        reason: String,
    },

    /// An external fetch command exited unsuccessfully.
    #[error("fetching {artifact} failed with status {status}: {message}")]
    FetchFailed {
        /// Canonical name of the artifact being fetched.
        artifact: String,
        /// Exit status of the fetch command.
        status: i32,
        /// Trimmed stderr of the fetch command.
        message: String,
    },

    /// An external command did not finish within the configured timeout.
    #[error("{command} timed out after {seconds} seconds")]
    CommandTimeout {
        /// The program that was running.
        command: String,
        /// The timeout that elapsed.
        seconds: u64,
    },

    /// A native HTTP download failed.
    #[error("fetching {artifact} failed: {source}")]
    Download {
        /// Canonical name of the artifact being fetched.
        artifact: String,
        /// The underlying download error.
        #[source]
        source: DownloadError,
    },

    /// A fetched archive could not be found where the fetcher left it.
    #[error("fetched archive missing at {path}")]
    ArchiveMissing {
        /// Where the archive was expected.
        path: Utf8PathBuf,
    },

    /// An archive could not be unpacked.
    #[error("failed to unpack {archive}")]
    Extraction {
        /// Path of the archive being unpacked.
        archive: Utf8PathBuf,
        /// The underlying extraction error.
        #[source]
        source: ExtractionError,
    },

    /// An unpacked tree could not be moved to its canonical name.
    #[error("failed to normalize {artifact}: {reason}")]
    Normalize {
        /// Canonical name of the artifact.
        artifact: String,
        /// Description of the failure.
        reason: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Test stub received an unexpected or mismatched command invocation.
    #[cfg(any(test, feature = "test-support"))]
    #[error("stub mismatch: {message}")]
    StubMismatch {
        /// Description of what was expected versus what was received.
        message: String,
    },
}

impl FetchError {
    /// Returns the process exit status for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use thirdparty_fetch::error::FetchError;
    ///
    /// let err = FetchError::FetchFailed {
    ///     artifact: "googletest".to_owned(),
    ///     status: 8,
    ///     message: "server error".to_owned(),
    /// };
    /// assert_eq!(err.exit_code(), 8);
    /// ```
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidVersion { .. } => USAGE_EXIT_CODE,
            Self::ManifestRead { .. } | Self::ManifestParse { .. } | Self::InvalidManifest { .. } => {
                CONFIG_EXIT_CODE
            }
            Self::FetchFailed { status, .. } => *status,
            Self::CommandTimeout { .. } => TIMEOUT_EXIT_CODE,
            Self::Download { source, .. } => source.exit_status(),
            Self::ArchiveMissing { .. }
            | Self::Extraction { .. }
            | Self::Normalize { .. }
            | Self::Io(_) => FAILURE_EXIT_CODE,
            #[cfg(any(test, feature = "test-support"))]
            Self::StubMismatch { .. } => FAILURE_EXIT_CODE,
        }
    }
}

/// Result type alias using [`FetchError`].
pub type Result<T> = std::result::Result<T, FetchError>;
