//! Artifact fetchers.
//!
//! Maven artifacts are copied into the destination by the Maven client;
//! GitHub archives are downloaded over HTTP through an [`HttpDownloader`].
//! HTTP downloads are written to a `.part` file and renamed on success, so
//! an interrupted run never leaves a truncated archive behind under the
//! final name.

pub mod http;
pub mod maven;

use crate::command::CommandExecutor;
use crate::error::{FetchError, Result};
use crate::plan::{FetchPlan, FetchStep, PlannedArtifact};
use camino::{Utf8Path, Utf8PathBuf};
use self::http::{DownloadError, HttpDownloader};

/// Suffix of the temporary file an HTTP download streams into.
pub const PARTIAL_SUFFIX: &str = ".part";

/// What a fetch step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The archive was fetched.
    Downloaded,
    /// The archive already existed and was left untouched.
    Skipped,
}

/// Backends used to fetch artifacts.
#[derive(Clone, Copy)]
pub struct Fetchers<'a> {
    /// Runs the Maven client.
    pub executor: &'a dyn CommandExecutor,
    /// Downloads GitHub archives.
    pub downloader: &'a dyn HttpDownloader,
}

/// Fetches a single artifact into the plan's destination directory.
///
/// # Errors
///
/// Returns [`FetchError::FetchFailed`] or [`FetchError::CommandTimeout`] when
/// the Maven client fails, and [`FetchError::Download`] when an HTTP download
/// fails.
pub fn fetch_artifact(
    fetchers: Fetchers<'_>,
    plan: &FetchPlan,
    artifact: &PlannedArtifact,
) -> Result<FetchOutcome> {
    match &artifact.step {
        FetchStep::Maven { coordinate } => {
            maven::fetch_maven(fetchers.executor, plan, artifact, coordinate)?;
            Ok(FetchOutcome::Downloaded)
        }
        FetchStep::Http { url } => fetch_http(fetchers.downloader, url, &artifact.archive_path)
            .map_err(|source| FetchError::Download {
                artifact: artifact.name.clone(),
                source,
            }),
    }
}

/// Downloads `url` to `archive_path` unless the file already exists.
///
/// # Errors
///
/// Returns the downloader's error, or [`DownloadError::Io`] when the
/// partial file cannot be moved into place.
pub fn fetch_http(
    downloader: &dyn HttpDownloader,
    url: &str,
    archive_path: &Utf8Path,
) -> std::result::Result<FetchOutcome, DownloadError> {
    if archive_path.is_file() {
        log::info!("{archive_path} already exists, not downloading {url}");
        return Ok(FetchOutcome::Skipped);
    }

    let partial = partial_path(archive_path);
    log::debug!("downloading {url} to {partial}");
    if let Err(err) = downloader.download(url, partial.as_std_path()) {
        discard_partial(&partial);
        return Err(err);
    }
    if let Err(err) = std::fs::rename(&partial, archive_path) {
        discard_partial(&partial);
        return Err(DownloadError::Io(err));
    }
    Ok(FetchOutcome::Downloaded)
}

/// Returns the `.part` path used while downloading `archive_path`.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use thirdparty_fetch::fetch::partial_path;
///
/// let partial = partial_path(Utf8Path::new("/d/spark-v2.4.3.tar.gz"));
/// assert_eq!(partial.as_str(), "/d/spark-v2.4.3.tar.gz.part");
/// ```
#[must_use]
pub fn partial_path(archive_path: &Utf8Path) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{archive_path}{PARTIAL_SUFFIX}"))
}

fn discard_partial(partial: &Utf8Path) {
    match std::fs::remove_file(partial) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => log::warn!("failed to remove partial download {partial}: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::http::MockHttpDownloader;
    use mockall::predicate::eq;

    fn utf8_temp_dir() -> (tempfile::TempDir, Utf8PathBuf) {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("utf-8 temp dir");
        (temp, path)
    }

    #[test]
    fn fetch_http_renames_partial_file_on_success() {
        let (_temp, dir) = utf8_temp_dir();
        let archive = dir.join("spark-v2.4.3.tar.gz");
        let expected_partial = partial_path(&archive).into_std_path_buf();

        let mut downloader = MockHttpDownloader::new();
        downloader
            .expect_download()
            .with(eq("https://github.com/apache/spark/archive/v2.4.3.tar.gz"), eq(expected_partial))
            .times(1)
            .returning(|_, dest| {
                std::fs::write(dest, b"archive").map_err(DownloadError::Io)
            });

        let outcome = fetch_http(
            &downloader,
            "https://github.com/apache/spark/archive/v2.4.3.tar.gz",
            &archive,
        )
        .expect("download succeeds");

        assert_eq!(outcome, FetchOutcome::Downloaded);
        assert_eq!(std::fs::read(&archive).expect("read archive"), b"archive");
        assert!(!partial_path(&archive).exists());
    }

    #[test]
    fn fetch_http_skips_existing_archive() {
        let (_temp, dir) = utf8_temp_dir();
        let archive = dir.join("googletest-703bd9c.tar.gz");
        std::fs::write(&archive, b"cached").expect("write archive");

        let mut downloader = MockHttpDownloader::new();
        downloader.expect_download().times(0);

        let outcome = fetch_http(&downloader, "https://example.test/x.tar.gz", &archive)
            .expect("skip succeeds");

        assert_eq!(outcome, FetchOutcome::Skipped);
        assert_eq!(std::fs::read(&archive).expect("read archive"), b"cached");
    }

    #[test]
    fn fetch_http_removes_partial_file_on_failure() {
        let (_temp, dir) = utf8_temp_dir();
        let archive = dir.join("spark-v2.4.3.tar.gz");

        let mut downloader = MockHttpDownloader::new();
        downloader.expect_download().times(1).returning(|url, dest| {
            std::fs::write(dest, b"trunc").map_err(DownloadError::Io)?;
            Err(DownloadError::Network {
                url: url.to_owned(),
                reason: "connection reset".to_owned(),
            })
        });

        let err = fetch_http(&downloader, "https://example.test/x.tar.gz", &archive)
            .expect_err("download fails");

        assert_eq!(err.exit_status(), http::NETWORK_EXIT_CODE);
        assert!(!archive.exists());
        assert!(!partial_path(&archive).exists());
    }
}
