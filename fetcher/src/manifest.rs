//! Artifact manifest schema and loading.
//!
//! The manifest lists the artifacts to fetch, where each comes from, and how
//! its unpacked tree is renamed. A built-in manifest describes the default
//! artifact set; users may supply their own with `--manifest` or by placing
//! `manifest.toml` in the configuration directory.

use crate::dirs::{BaseDirs, user_manifest_path};
use crate::error::{FetchError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

/// The built-in manifest text.
pub const DEFAULT_MANIFEST: &str = include_str!("default_manifest.toml");

/// Placeholder substituted with the version argument.
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// Artifacts to fetch and global fetch settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Environment variable holding the mirror base URL.
    #[serde(default = "Manifest::default_mirror_env")]
    pub mirror_env: String,
    /// Working subdirectory under the destination for unpacked trees.
    #[serde(default = "Manifest::default_work_dir")]
    pub work_dir: String,
    /// Maven executable used for Maven-hosted artifacts.
    #[serde(default = "Manifest::default_maven_command")]
    pub maven_command: String,
    /// Extra arguments passed to Maven before the goal, such as `-s settings.xml`.
    #[serde(default)]
    pub maven_args: Vec<String>,
    /// Artifacts in fetch order.
    #[serde(rename = "artifact", default)]
    pub artifacts: Vec<ArtifactSpec>,
}

/// One artifact to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArtifactSpec {
    /// Canonical directory name of the unpacked tree.
    pub name: String,
    /// Where the artifact is fetched from.
    pub source: Source,
    /// How the unpacked tree is normalized. Defaults per source kind.
    #[serde(default)]
    pub layout: Option<Layout>,
}

/// Where an artifact is fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Source {
    /// A package in a Maven repository, fetched with the Maven client.
    Maven(MavenSource),
    /// A GitHub archive snapshot, fetched over HTTP.
    Github(GithubSource),
}

/// Maven coordinates of a packaged artifact.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MavenSource {
    /// Group identifier.
    pub group: String,
    /// Artifact identifier.
    pub artifact: String,
    /// Version, usually the `{version}` placeholder.
    #[serde(default = "MavenSource::default_version")]
    pub version: String,
    /// Packaging type and file extension.
    #[serde(default = "MavenSource::default_packaging")]
    pub packaging: String,
    /// Optional classifier such as `dist-all`.
    #[serde(default)]
    pub classifier: Option<String>,
}

impl MavenSource {
    fn default_version() -> String {
        VERSION_PLACEHOLDER.to_owned()
    }

    fn default_packaging() -> String {
        "zip".to_owned()
    }
}

/// A GitHub repository archive at a tag or commit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GithubSource {
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Tag or commit SHA to fetch.
    pub reference: String,
    /// Archive format served by GitHub.
    #[serde(default)]
    pub format: GithubFormat,
}

/// Archive formats GitHub serves for repository snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum GithubFormat {
    /// Gzip-compressed tarball.
    #[default]
    #[serde(rename = "tar.gz")]
    TarGz,
    /// Zip archive.
    #[serde(rename = "zip")]
    Zip,
}

impl GithubFormat {
    /// File extension, without the leading dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::TarGz => "tar.gz",
            Self::Zip => "zip",
        }
    }
}

impl fmt::Display for GithubFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// How an unpacked archive becomes its canonical tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Layout {
    /// Extract directly into `<work_dir>/<name>`.
    ExtractInto,
    /// Move `<container>/<path>` up to `<name>` and drop the container.
    Hoist {
        /// Path of the kept subtree inside the container.
        path: String,
        /// Container directory; defaults to the GitHub archive prefix.
        #[serde(default)]
        container: Option<String>,
    },
    /// Rename `<container>` to `<name>`.
    Rename {
        /// Container directory; defaults to the GitHub archive prefix.
        #[serde(default)]
        container: Option<String>,
    },
}

impl Manifest {
    fn default_mirror_env() -> String {
        "THIRDPARTY_MIRROR".to_owned()
    }

    fn default_work_dir() -> String {
        "src".to_owned()
    }

    fn default_maven_command() -> String {
        "mvn".to_owned()
    }

    /// Returns the built-in manifest.
    ///
    /// # Errors
    ///
    /// Returns an error only if the embedded manifest is malformed.
    ///
    /// # Examples
    ///
    /// ```
    /// use thirdparty_fetch::manifest::Manifest;
    ///
    /// let manifest = Manifest::builtin()?;
    /// assert_eq!(manifest.artifacts.len(), 3);
    /// # Ok::<(), thirdparty_fetch::error::FetchError>(())
    /// ```
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(DEFAULT_MANIFEST, "built-in")
    }

    /// Parses and validates manifest text. `origin` names the source in
    /// error messages.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ManifestParse`] for malformed TOML and
    /// [`FetchError::InvalidManifest`] for unusable contents.
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self> {
        let manifest: Self = toml::from_str(text).map_err(|e| FetchError::ManifestParse {
            origin: origin.to_owned(),
            reason: e.to_string(),
        })?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Reads, parses, and validates a manifest file.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ManifestRead`] if the file cannot be read, and
    /// the errors of [`Self::from_toml_str`] otherwise.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| FetchError::ManifestRead {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml_str(&text, path.as_str())
    }

    /// Checks the structural constraints the pipeline relies on.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidManifest`] describing the first
    /// violated constraint.
    pub fn validate(&self) -> Result<()> {
        require_non_blank("mirror_env", &self.mirror_env)?;
        require_non_blank("maven_command", &self.maven_command)?;
        require_single_component("work_dir", &self.work_dir)?;

        if self.artifacts.is_empty() {
            return Err(invalid("manifest lists no artifacts"));
        }

        let mut names = HashSet::new();
        for spec in &self.artifacts {
            require_single_component("artifact name", &spec.name)?;
            if !names.insert(spec.name.as_str()) {
                return Err(invalid(format!("duplicate artifact name \"{}\"", spec.name)));
            }
            spec.validate()?;
        }
        Ok(())
    }
}

impl ArtifactSpec {
    /// Returns the explicit layout or the default for the source kind:
    /// Maven distributions extract into their own directory, GitHub
    /// snapshots rename their container.
    #[must_use]
    pub fn effective_layout(&self) -> Layout {
        match (&self.layout, &self.source) {
            (Some(layout), _) => layout.clone(),
            (None, Source::Maven(_)) => Layout::ExtractInto,
            (None, Source::Github(_)) => Layout::Rename { container: None },
        }
    }

    fn validate(&self) -> Result<()> {
        match &self.source {
            Source::Maven(maven) => {
                require_non_blank("maven group", &maven.group)?;
                require_non_blank("maven artifact", &maven.artifact)?;
                require_non_blank("maven version", &maven.version)?;
                require_non_blank("maven packaging", &maven.packaging)?;
                let needs_container = matches!(
                    self.layout,
                    Some(Layout::Rename { container: None } | Layout::Hoist { container: None, .. })
                );
                if needs_container {
                    return Err(invalid(format!(
                        "artifact \"{}\" needs an explicit container for its layout",
                        self.name
                    )));
                }
            }
            Source::Github(github) => {
                require_non_blank("github owner", &github.owner)?;
                require_non_blank("github repo", &github.repo)?;
                require_non_blank("github reference", &github.reference)?;
            }
        }

        match self.effective_layout() {
            Layout::ExtractInto => Ok(()),
            Layout::Rename { container } => {
                container.map_or(Ok(()), |c| require_single_component("container", &c))
            }
            Layout::Hoist { path, container } => {
                require_relative_path("hoist path", &path)?;
                container.map_or(Ok(()), |c| require_single_component("container", &c))
            }
        }
    }
}

/// Where the manifest in use was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestOrigin {
    /// The embedded default.
    BuiltIn,
    /// A file given on the command line or found in the config directory.
    File(Utf8PathBuf),
}

impl fmt::Display for ManifestOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BuiltIn => f.write_str("built-in"),
            Self::File(path) => write!(f, "{path}"),
        }
    }
}

/// Resolves the manifest: an explicit path wins, then the user manifest in
/// the configuration directory if it exists, then the built-in default.
///
/// # Errors
///
/// Returns the errors of [`Manifest::load`] or [`Manifest::builtin`].
pub fn resolve_manifest(
    explicit: Option<&Utf8Path>,
    dirs: &dyn BaseDirs,
) -> Result<(Manifest, ManifestOrigin)> {
    if let Some(path) = explicit {
        log::debug!("loading manifest from {path}");
        return Ok((Manifest::load(path)?, ManifestOrigin::File(path.to_owned())));
    }

    if let Some(path) = user_manifest_path(dirs).filter(|p| p.is_file()) {
        log::debug!("loading user manifest from {path}");
        let manifest = Manifest::load(&path)?;
        return Ok((manifest, ManifestOrigin::File(path)));
    }

    log::debug!("using built-in manifest");
    Ok((Manifest::builtin()?, ManifestOrigin::BuiltIn))
}

fn invalid(reason: impl Into<String>) -> FetchError {
    FetchError::InvalidManifest {
        reason: reason.into(),
    }
}

fn require_non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(format!("{field} must not be empty")));
    }
    Ok(())
}

fn require_single_component(field: &str, value: &str) -> Result<()> {
    require_non_blank(field, value)?;
    if value.contains('/') || value.contains('\\') || value == "." || value == ".." {
        return Err(invalid(format!(
            "{field} \"{value}\" must be a single directory name"
        )));
    }
    Ok(())
}

fn require_relative_path(field: &str, value: &str) -> Result<()> {
    require_non_blank(field, value)?;
    let path = Utf8Path::new(value);
    let escapes = path.is_absolute()
        || path
            .components()
            .any(|c| matches!(c, camino::Utf8Component::ParentDir));
    if escapes {
        return Err(invalid(format!(
            "{field} \"{value}\" must be relative and stay inside the archive"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
