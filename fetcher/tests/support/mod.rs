//! Test support for end-to-end pipeline tests.
//!
//! Stands in for Maven and the GitHub archive host with backends that write
//! small archives shaped like the real ones, so the full pipeline runs
//! without network access.

use camino::{Utf8Path, Utf8PathBuf};
use std::cell::RefCell;
use std::path::Path;
use tempfile::TempDir;
use thirdparty_fetch::fetch::http::{DownloadError, HttpDownloader};
use thirdparty_fetch::fetch::maven::copy_args;
use thirdparty_fetch::manifest::Manifest;
use thirdparty_fetch::mirror::ArchiveHost;
use thirdparty_fetch::plan::{FetchPlan, FetchStep};
use thirdparty_fetch::test_utils::{
    ExpectedCall, failure_output_with_code, success_output, write_tar_gz, write_zip,
};

/// Commit the built-in manifest pins the test framework to.
pub const GOOGLETEST_SHA: &str = "703bd9caab50b139428cea1aaff9974ebee5742e";

/// A temporary root holding the destination directory.
pub struct Sandbox {
    _temp: TempDir,
    /// The destination directory passed to the pipeline.
    pub dest: Utf8PathBuf,
}

impl Sandbox {
    /// Creates a sandbox whose destination does not exist yet.
    pub fn new() -> Self {
        let temp = tempfile::tempdir().expect("temp dir");
        let root = Utf8Path::from_path(temp.path()).expect("utf-8 temp dir");
        let dest = root.join("thirdparty");
        Self { _temp: temp, dest }
    }

    /// Resolves the built-in manifest against this sandbox.
    pub fn plan(&self, host: ArchiveHost) -> FetchPlan {
        let manifest = Manifest::builtin().expect("built-in manifest");
        FetchPlan::resolve(&manifest, &self.dest, "0.10.0", host).expect("resolve plan")
    }
}

/// Expected Maven invocation that writes a distribution zip.
pub fn maven_success(plan: &FetchPlan) -> ExpectedCall {
    let archive = plan.artifacts[0].archive_path.clone();
    ExpectedCall::new("mvn", maven_args(plan), Ok(success_output())).with_effect(move || {
        write_zip(
            archive.as_std_path(),
            &[
                ("lib/analytics-zoo.jar", b"jar"),
                ("conf/spark-analytics-zoo.conf", b"spark.executor.cores 2"),
            ],
        )
    })
}

/// Expected Maven invocation that fails with `code`.
pub fn maven_failure(plan: &FetchPlan, code: i32) -> ExpectedCall {
    ExpectedCall::new(
        "mvn",
        maven_args(plan),
        Ok(failure_output_with_code(code, "[ERROR] Could not resolve artifact")),
    )
}

fn maven_args(plan: &FetchPlan) -> Vec<String> {
    let FetchStep::Maven { coordinate } = &plan.artifacts[0].step else {
        panic!("first artifact should come from Maven");
    };
    copy_args(plan, coordinate)
}

/// Serves GitHub-shaped tarballs and records every requested URL.
#[derive(Default)]
pub struct ArchiveHostStub {
    requests: RefCell<Vec<String>>,
    fail_on: Option<usize>,
}

impl ArchiveHostStub {
    /// Creates a host that serves every request.
    pub fn serving() -> Self {
        Self::default()
    }

    /// Creates a host that answers the `index`th request (zero-based) with
    /// HTTP 404.
    pub fn failing_on(index: usize) -> Self {
        Self {
            requests: RefCell::default(),
            fail_on: Some(index),
        }
    }

    /// Returns the URLs requested so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl HttpDownloader for ArchiveHostStub {
    fn download(&self, url: &str, dest: &Path) -> Result<(), DownloadError> {
        let index = {
            let mut requests = self.requests.borrow_mut();
            requests.push(url.to_owned());
            requests.len() - 1
        };
        if self.fail_on == Some(index) {
            return Err(DownloadError::Status {
                url: url.to_owned(),
                code: 404,
            });
        }

        if url.ends_with("/apache/spark/archive/v2.4.3.tar.gz") {
            write_tar_gz(
                dest,
                &[
                    ("spark-2.4.3/README.md", b"Apache Spark"),
                    ("spark-2.4.3/python/pyspark/__init__.py", b"# pyspark"),
                    ("spark-2.4.3/python/pyspark/sql/__init__.py", b"# sql"),
                ],
            )?;
        } else if url.ends_with(&format!("/google/googletest/archive/{GOOGLETEST_SHA}.tar.gz")) {
            let cmake = format!("googletest-{GOOGLETEST_SHA}/CMakeLists.txt");
            write_tar_gz(dest, &[(cmake.as_str(), b"project(googletest-distribution)")])?;
        } else {
            return Err(DownloadError::Status {
                url: url.to_owned(),
                code: 404,
            });
        }
        Ok(())
    }
}

/// Returns the sorted names of the subdirectories of `dir`.
pub fn subdirectories(dir: &Utf8Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| entry.expect("dir entry"))
        .filter(|entry| entry.file_type().expect("file type").is_dir())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
