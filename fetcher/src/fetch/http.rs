//! HTTP archive downloads.
//!
//! Provides a trait-based abstraction for downloading archive snapshots so
//! the pipeline can be tested without network access. Two backends exist:
//! a native `ureq` client and a `wget` subprocess. Both report failures with
//! wget-compatible exit statuses.

use crate::command::{CommandExecutor, exit_status_code, failure_message, spawn_failure_status};
use crate::error::{FetchError, TIMEOUT_EXIT_CODE};
use std::path::Path;
use std::time::Duration;

/// wget exit status for local file I/O errors.
pub const FILE_IO_EXIT_CODE: i32 = 3;

/// wget exit status for network failures.
pub const NETWORK_EXIT_CODE: i32 = 4;

/// wget exit status when the server issues an error response.
pub const SERVER_ERROR_EXIT_CODE: i32 = 8;

/// Trait for downloading a URL to a local file.
///
/// # Examples
///
/// ```
/// use thirdparty_fetch::fetch::http::UreqDownloader;
///
/// let downloader = UreqDownloader::new(None);
/// // Use downloader.download(url, dest) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait HttpDownloader {
    /// Download `url` and write the body to `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the server answers with an
    /// error status, or the file cannot be written.
    fn download(&self, url: &str, dest: &Path) -> Result<(), DownloadError>;
}

/// Errors arising from HTTP downloads.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// The server answered with an HTTP error status.
    #[error("server returned HTTP {code} for {url}")]
    Status {
        /// The URL that was requested.
        url: String,
        /// The HTTP status code.
        code: u16,
    },

    /// The request failed before a response was received, or while
    /// streaming the body.
    #[error("download failed for {url}: {reason}")]
    Network {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The download subprocess exited unsuccessfully.
    #[error("{program} exited with status {status}: {message}")]
    Command {
        /// The program that was run.
        program: &'static str,
        /// Its exit status.
        status: i32,
        /// Trimmed diagnostic output.
        message: String,
    },

    /// I/O error writing the downloaded file.
    #[error("I/O error writing download: {0}")]
    Io(#[from] std::io::Error),
}

impl DownloadError {
    /// Returns the exit status wget would report for this failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use thirdparty_fetch::fetch::http::DownloadError;
    ///
    /// let err = DownloadError::Status { url: "https://example.test".to_owned(), code: 503 };
    /// assert_eq!(err.exit_status(), 8);
    /// ```
    #[must_use]
    pub const fn exit_status(&self) -> i32 {
        match self {
            Self::Status { .. } => SERVER_ERROR_EXIT_CODE,
            Self::Network { .. } => NETWORK_EXIT_CODE,
            Self::Command { status, .. } => *status,
            Self::Io(_) => FILE_IO_EXIT_CODE,
        }
    }
}

/// Native HTTP downloader using `ureq`.
#[derive(Debug, Clone)]
pub struct UreqDownloader {
    agent: ureq::Agent,
}

impl UreqDownloader {
    /// Creates a downloader whose requests fail after `timeout`, if given.
    #[must_use]
    pub fn new(timeout: Option<Duration>) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(timeout)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }
}

impl HttpDownloader for UreqDownloader {
    fn download(&self, url: &str, dest: &Path) -> Result<(), DownloadError> {
        log::debug!("GET {url}");
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        let mut file = std::fs::File::create(dest)?;
        std::io::copy(&mut response.into_body().as_reader(), &mut file).map_err(|e| {
            DownloadError::Network {
                url: url.to_owned(),
                reason: e.to_string(),
            }
        })?;
        file.sync_all()?;
        Ok(())
    }
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(code) => DownloadError::Status {
            url: url.to_owned(),
            code: *code,
        },
        other => DownloadError::Network {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}

/// Downloads by running `wget`, propagating its exit status.
pub struct WgetDownloader<'a> {
    executor: &'a dyn CommandExecutor,
}

impl<'a> WgetDownloader<'a> {
    /// Program name of the wget binary.
    pub const PROGRAM: &'static str = "wget";

    /// Creates a downloader running `wget` through `executor`.
    #[must_use]
    pub fn new(executor: &'a dyn CommandExecutor) -> Self {
        Self { executor }
    }
}

impl HttpDownloader for WgetDownloader<'_> {
    fn download(&self, url: &str, dest: &Path) -> Result<(), DownloadError> {
        let dest_str = dest.to_string_lossy();
        let args = ["-q", "-O", &*dest_str, url];
        let output = match self.executor.run(Self::PROGRAM, &args) {
            Ok(output) => output,
            Err(FetchError::CommandTimeout { seconds, .. }) => {
                return Err(DownloadError::Command {
                    program: Self::PROGRAM,
                    status: TIMEOUT_EXIT_CODE,
                    message: format!("timed out after {seconds} seconds"),
                });
            }
            Err(FetchError::Io(err)) => {
                return Err(DownloadError::Command {
                    program: Self::PROGRAM,
                    status: spawn_failure_status(&err),
                    message: err.to_string(),
                });
            }
            Err(other) => {
                return Err(DownloadError::Command {
                    program: Self::PROGRAM,
                    status: other.exit_code(),
                    message: other.to_string(),
                });
            }
        };

        if output.status.success() {
            return Ok(());
        }
        Err(DownloadError::Command {
            program: Self::PROGRAM,
            status: exit_status_code(&output),
            message: failure_message(&output),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ExpectedCall, StubExecutor, failure_output_with_code, success_output};
    use rstest::rstest;

    #[test]
    fn map_ureq_error_maps_status_codes() {
        let err = ureq::Error::StatusCode(404);
        let mapped = map_ureq_error("https://example.test/a.tar.gz", &err);
        assert!(matches!(mapped, DownloadError::Status { code: 404, .. }));
        assert_eq!(mapped.exit_status(), SERVER_ERROR_EXIT_CODE);
    }

    #[test]
    fn map_ureq_error_maps_other_errors_to_network() {
        let err = ureq::Error::Io(std::io::Error::from(std::io::ErrorKind::ConnectionReset));
        let mapped = map_ureq_error("https://example.test/a.tar.gz", &err);
        assert!(matches!(mapped, DownloadError::Network { .. }));
        assert_eq!(mapped.exit_status(), NETWORK_EXIT_CODE);
    }

    #[test]
    fn ureq_downloader_reports_unreachable_host_as_network_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let temp = tempfile::tempdir().expect("temp dir");
        let dest = temp.path().join("out.tar.gz");
        let downloader = UreqDownloader::new(Some(Duration::from_secs(5)));
        let err = downloader
            .download("http://127.0.0.1:9/archive.tar.gz", &dest)
            .expect_err("closed port");
        assert_eq!(err.exit_status(), NETWORK_EXIT_CODE);
    }

    #[test]
    fn wget_downloader_runs_quiet_download() {
        let executor = StubExecutor::new(vec![ExpectedCall::new(
            "wget",
            ["-q", "-O", "/d/spark.tar.gz.part", "https://github.com/a/b.tar.gz"],
            Ok(success_output()),
        )]);
        WgetDownloader::new(&executor)
            .download("https://github.com/a/b.tar.gz", Path::new("/d/spark.tar.gz.part"))
            .expect("download succeeds");
        executor.assert_finished();
    }

    #[rstest]
    #[case::network(4)]
    #[case::server_error(8)]
    fn wget_downloader_propagates_exit_status(#[case] code: i32) {
        let executor = StubExecutor::new(vec![ExpectedCall::new(
            "wget",
            ["-q", "-O", "/d/x.part", "http://m/x"],
            Ok(failure_output_with_code(code, "ERROR 404: Not Found.")),
        )]);
        let err = WgetDownloader::new(&executor)
            .download("http://m/x", Path::new("/d/x.part"))
            .expect_err("download fails");
        assert_eq!(err.exit_status(), code);
        assert!(err.to_string().contains("ERROR 404"));
    }

    #[test]
    fn wget_downloader_maps_missing_binary_to_127() {
        let executor = StubExecutor::new(vec![ExpectedCall::new(
            "wget",
            ["-q", "-O", "/d/x.part", "http://m/x"],
            Err(FetchError::Io(std::io::Error::from(std::io::ErrorKind::NotFound))),
        )]);
        let err = WgetDownloader::new(&executor)
            .download("http://m/x", Path::new("/d/x.part"))
            .expect_err("wget missing");
        assert_eq!(err.exit_status(), 127);
    }
}
