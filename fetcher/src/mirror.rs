//! Mirror override for GitHub archive downloads.
//!
//! When the mirror environment variable holds a base URL, GitHub archive
//! URLs are rebuilt under that base instead of `https://github.com`. Maven
//! fetches are unaffected; Maven mirrors belong in `settings.xml`.

/// Public host serving GitHub archive snapshots.
pub const GITHUB_BASE_URL: &str = "https://github.com";

/// Base URL used for archive downloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveHost {
    /// The public GitHub host.
    Public,
    /// A mirror base URL, stored without trailing slashes.
    Mirror(String),
}

impl ArchiveHost {
    /// Reads the mirror override from the process environment.
    ///
    /// # Examples
    ///
    /// ```
    /// use thirdparty_fetch::mirror::ArchiveHost;
    ///
    /// let host = ArchiveHost::from_env("THIRDPARTY_FETCH_DOC_UNSET_VARIABLE");
    /// assert_eq!(host, ArchiveHost::Public);
    /// ```
    #[must_use]
    pub fn from_env(variable: &str) -> Self {
        Self::from_lookup(variable, |name| std::env::var(name).ok())
    }

    /// Resolves the host using `lookup` in place of the environment.
    ///
    /// Blank values are treated as unset.
    #[must_use]
    pub fn from_lookup<F>(variable: &str, lookup: F) -> Self
    where
        F: FnOnce(&str) -> Option<String>,
    {
        match lookup(variable) {
            Some(value) if !value.trim().is_empty() => {
                let base = value.trim().trim_end_matches('/').to_owned();
                log::debug!("using archive mirror {base} from {variable}");
                Self::Mirror(base)
            }
            _ => Self::Public,
        }
    }

    /// Returns the base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        match self {
            Self::Public => GITHUB_BASE_URL,
            Self::Mirror(base) => base,
        }
    }

    /// Joins `path` (without a leading slash) onto the base URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use thirdparty_fetch::mirror::ArchiveHost;
    ///
    /// let mirror = ArchiveHost::Mirror("http://mirror.local/github".to_owned());
    /// assert_eq!(
    ///     mirror.url_for("apache/spark/archive/v2.4.3.tar.gz"),
    ///     "http://mirror.local/github/apache/spark/archive/v2.4.3.tar.gz",
    /// );
    /// ```
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url(), path.trim_start_matches('/'))
    }

    /// Returns `true` when a mirror override is active.
    #[must_use]
    pub const fn is_mirror(&self) -> bool {
        matches!(self, Self::Mirror(_))
    }
}
