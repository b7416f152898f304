//! Resolution of manifest entries into concrete fetch steps.
//!
//! A [`FetchPlan`] is the manifest with the version substituted, URLs built
//! against the selected [`ArchiveHost`], and every archive and container
//! name computed up front. The pipeline and the dry-run report both read
//! the plan, so what is printed is exactly what is executed.

use crate::error::{FetchError, Result};
use crate::manifest::{GithubSource, Layout, Manifest, MavenSource, Source, VERSION_PLACEHOLDER};
use crate::mirror::ArchiveHost;
use camino::{Utf8Path, Utf8PathBuf};

/// Everything the pipeline needs to run, resolved from the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPlan {
    /// Destination directory receiving the raw archives.
    pub dest_dir: Utf8PathBuf,
    /// Working directory receiving the unpacked trees.
    pub work_dir: Utf8PathBuf,
    /// Maven executable.
    pub maven_command: String,
    /// Extra Maven arguments placed before the goal.
    pub maven_args: Vec<String>,
    /// Host used for HTTP archive downloads.
    pub host: ArchiveHost,
    /// Artifacts in fetch order.
    pub artifacts: Vec<PlannedArtifact>,
}

/// A single artifact with all names and locations resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedArtifact {
    /// Canonical directory name of the unpacked tree.
    pub name: String,
    /// How the archive is fetched.
    pub step: FetchStep,
    /// Where the fetched archive lands.
    pub archive_path: Utf8PathBuf,
    /// How the unpacked tree is normalized.
    pub layout: PlannedLayout,
}

/// How an artifact is fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStep {
    /// Fetched with the Maven client.
    Maven {
        /// `group:artifact:version:packaging[:classifier]`.
        coordinate: String,
    },
    /// Fetched over HTTP, skipped when the archive already exists.
    Http {
        /// Download URL.
        url: String,
    },
}

/// Normalization with container names resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedLayout {
    /// Extract directly into the canonical directory.
    ExtractInto,
    /// Move `container/path` to the canonical directory, dropping the
    /// container.
    Hoist {
        /// Top-level directory of the unpacked archive.
        container: String,
        /// Kept subtree, relative to the container.
        path: Utf8PathBuf,
    },
    /// Rename the container to the canonical directory.
    Rename {
        /// Top-level directory of the unpacked archive.
        container: String,
    },
}

impl FetchPlan {
    /// Resolves `manifest` for `version`, placing archives in `dest_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidVersion`] if `version` cannot appear in
    /// file names and Maven coordinates.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use thirdparty_fetch::manifest::Manifest;
    /// use thirdparty_fetch::mirror::ArchiveHost;
    /// use thirdparty_fetch::plan::FetchPlan;
    ///
    /// let manifest = Manifest::builtin()?;
    /// let plan = FetchPlan::resolve(&manifest, Utf8Path::new("/opt/deps"), "0.9.0", ArchiveHost::Public)?;
    /// assert_eq!(plan.work_dir.as_str(), "/opt/deps/src");
    /// assert_eq!(plan.artifacts.len(), 3);
    /// # Ok::<(), thirdparty_fetch::error::FetchError>(())
    /// ```
    pub fn resolve(
        manifest: &Manifest,
        dest_dir: &Utf8Path,
        version: &str,
        host: ArchiveHost,
    ) -> Result<Self> {
        validate_version(version)?;

        let artifacts = manifest
            .artifacts
            .iter()
            .map(|spec| {
                let layout = spec.effective_layout();
                match &spec.source {
                    Source::Maven(maven) => plan_maven(&spec.name, maven, &layout, dest_dir, version),
                    Source::Github(github) => {
                        plan_github(&spec.name, github, &layout, dest_dir, version, &host)
                    }
                }
            })
            .collect();

        Ok(Self {
            dest_dir: dest_dir.to_owned(),
            work_dir: dest_dir.join(expand(&manifest.work_dir, version)),
            maven_command: manifest.maven_command.clone(),
            maven_args: manifest
                .maven_args
                .iter()
                .map(|arg| expand(arg, version))
                .collect(),
            host,
            artifacts,
        })
    }

    /// Returns the canonical path of an artifact's unpacked tree.
    #[must_use]
    pub fn canonical_path(&self, artifact: &PlannedArtifact) -> Utf8PathBuf {
        self.work_dir.join(&artifact.name)
    }
}

/// Rejects versions that cannot be embedded in file names or Maven
/// coordinates.
///
/// # Errors
///
/// Returns [`FetchError::InvalidVersion`] for blank versions and versions
/// containing whitespace, path separators, or colons.
///
/// # Examples
///
/// ```
/// use thirdparty_fetch::plan::validate_version;
///
/// assert!(validate_version("0.9.0-SNAPSHOT").is_ok());
/// assert!(validate_version("../0.9.0").is_err());
/// ```
pub fn validate_version(version: &str) -> Result<()> {
    let reason = if version.trim().is_empty() {
        Some("must not be empty")
    } else if version.chars().any(char::is_whitespace) {
        Some("must not contain whitespace")
    } else if version.contains(['/', '\\']) || version == "." || version == ".." {
        Some("must not contain path separators")
    } else if version.contains(':') {
        Some("must not contain ':'")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(FetchError::InvalidVersion {
            version: version.to_owned(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Returns the top-level directory GitHub uses inside archive snapshots.
///
/// GitHub drops a leading `v` from tags such as `v2.4.3`, so the archive of
/// `apache/spark@v2.4.3` unpacks to `spark-2.4.3`.
///
/// # Examples
///
/// ```
/// use thirdparty_fetch::plan::github_container_name;
///
/// assert_eq!(github_container_name("spark", "v2.4.3"), "spark-2.4.3");
/// assert_eq!(github_container_name("googletest", "703bd9c"), "googletest-703bd9c");
/// assert_eq!(github_container_name("tool", "vendor-fix"), "tool-vendor-fix");
/// ```
#[must_use]
pub fn github_container_name(repo: &str, reference: &str) -> String {
    let trimmed = match reference.strip_prefix('v') {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest,
        _ => reference,
    };
    format!("{repo}-{}", trimmed.replace('/', "-"))
}

fn expand(template: &str, version: &str) -> String {
    template.replace(VERSION_PLACEHOLDER, version)
}

fn plan_maven(
    name: &str,
    maven: &MavenSource,
    layout: &Layout,
    dest_dir: &Utf8Path,
    version: &str,
) -> PlannedArtifact {
    let artifact_version = expand(&maven.version, version);
    let classifier = maven.classifier.as_deref().map(|c| expand(c, version));
    let packaging = expand(&maven.packaging, version);

    let mut coordinate = format!(
        "{}:{}:{artifact_version}:{packaging}",
        expand(&maven.group, version),
        expand(&maven.artifact, version),
    );
    let mut file_name = format!("{}-{artifact_version}", expand(&maven.artifact, version));
    if let Some(classifier) = &classifier {
        coordinate.push(':');
        coordinate.push_str(classifier);
        file_name.push('-');
        file_name.push_str(classifier);
    }
    file_name.push('.');
    file_name.push_str(&packaging);

    PlannedArtifact {
        name: name.to_owned(),
        step: FetchStep::Maven { coordinate },
        archive_path: dest_dir.join(file_name),
        layout: plan_layout(layout, None, version),
    }
}

fn plan_github(
    name: &str,
    github: &GithubSource,
    layout: &Layout,
    dest_dir: &Utf8Path,
    version: &str,
    host: &ArchiveHost,
) -> PlannedArtifact {
    let owner = expand(&github.owner, version);
    let repo = expand(&github.repo, version);
    let reference = expand(&github.reference, version);
    let extension = github.format.extension();

    let url = host.url_for(&format!("{owner}/{repo}/archive/{reference}.{extension}"));
    let file_name = format!("{repo}-{}.{extension}", reference.replace('/', "-"));
    let default_container = github_container_name(&repo, &reference);

    PlannedArtifact {
        name: name.to_owned(),
        step: FetchStep::Http { url },
        archive_path: dest_dir.join(file_name),
        layout: plan_layout(layout, Some(default_container), version),
    }
}

/// Resolves container names; `default_container` is `None` for sources
/// without a predictable archive prefix, which manifest validation already
/// requires to name their container explicitly.
fn plan_layout(layout: &Layout, default_container: Option<String>, version: &str) -> PlannedLayout {
    let container_for = |explicit: &Option<String>| {
        explicit
            .as_deref()
            .map(|c| expand(c, version))
            .or_else(|| default_container.clone())
            .unwrap_or_default()
    };

    match layout {
        Layout::ExtractInto => PlannedLayout::ExtractInto,
        Layout::Hoist { path, container } => PlannedLayout::Hoist {
            container: container_for(container),
            path: Utf8PathBuf::from(expand(path, version)),
        },
        Layout::Rename { container } => PlannedLayout::Rename {
            container: container_for(container),
        },
    }
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;
