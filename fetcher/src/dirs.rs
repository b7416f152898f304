//! Directory resolution for user configuration.
//!
//! Wraps `directories-next` behind a trait so manifest lookup can be tested
//! against temporary directories.

use camino::Utf8PathBuf;
use directories_next::ProjectDirs;

/// File name of the user manifest inside the configuration directory.
pub const USER_MANIFEST_FILE: &str = "manifest.toml";

/// Source of platform-specific base directories.
pub trait BaseDirs {
    /// Returns the application configuration directory, if one can be
    /// determined and is valid UTF-8.
    fn config_dir(&self) -> Option<Utf8PathBuf>;
}

/// Resolves directories for the current user via `directories-next`.
///
/// On Linux this is `$XDG_CONFIG_HOME/thirdparty-fetch`, falling back to
/// `~/.config/thirdparty-fetch`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBaseDirs;

impl BaseDirs for SystemBaseDirs {
    fn config_dir(&self) -> Option<Utf8PathBuf> {
        let dirs = ProjectDirs::from("", "", "thirdparty-fetch")?;
        Utf8PathBuf::from_path_buf(dirs.config_dir().to_path_buf()).ok()
    }
}

/// Fixed directories, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct FixedBaseDirs {
    /// The configuration directory to report.
    pub config: Option<Utf8PathBuf>,
}

impl BaseDirs for FixedBaseDirs {
    fn config_dir(&self) -> Option<Utf8PathBuf> {
        self.config.clone()
    }
}

/// Returns the path of the user manifest, whether or not it exists.
///
/// # Examples
///
/// ```
/// use camino::Utf8PathBuf;
/// use thirdparty_fetch::dirs::{FixedBaseDirs, user_manifest_path};
///
/// let dirs = FixedBaseDirs { config: Some(Utf8PathBuf::from("/home/u/.config/thirdparty-fetch")) };
/// assert_eq!(
///     user_manifest_path(&dirs),
///     Some(Utf8PathBuf::from("/home/u/.config/thirdparty-fetch/manifest.toml")),
/// );
/// ```
#[must_use]
pub fn user_manifest_path(dirs: &dyn BaseDirs) -> Option<Utf8PathBuf> {
    dirs.config_dir().map(|dir| dir.join(USER_MANIFEST_FILE))
}
