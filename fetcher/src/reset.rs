//! Destination directory reset and cleanup.
//!
//! Before fetching, every subdirectory of the destination is removed so
//! that unpacked trees from a previous run never mix with new ones. Regular
//! files are kept: they are previously fetched archives, and keeping them
//! lets the HTTP fetchers skip downloads that already completed.

use crate::error::Result;
use camino::Utf8Path;
use std::fs;

/// Creates `dest_dir` if needed and removes all of its subdirectories.
///
/// Symbolic links are removed as links; their targets are never touched.
/// Returns the number of entries removed.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or listed, or an
/// entry cannot be removed.
///
/// # Examples
///
/// ```
/// use camino::Utf8PathBuf;
/// use thirdparty_fetch::reset::reset_destination;
///
/// let temp = tempfile::tempdir()?;
/// let dest = Utf8PathBuf::try_from(temp.path().join("deps")).expect("utf-8 path");
/// std::fs::create_dir_all(dest.join("src/stale"))?;
/// std::fs::write(dest.join("kept.tar.gz"), b"archive")?;
///
/// assert_eq!(reset_destination(&dest)?, 1);
/// assert!(!dest.join("src").exists());
/// assert!(dest.join("kept.tar.gz").exists());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn reset_destination(dest_dir: &Utf8Path) -> Result<usize> {
    fs::create_dir_all(dest_dir)?;

    let mut removed = 0;
    for entry_result in fs::read_dir(dest_dir)? {
        let entry = entry_result?;
        let file_type = entry.file_type()?;
        let path = entry.path();

        if file_type.is_dir() {
            log::debug!("removing stale directory {}", path.display());
            fs::remove_dir_all(&path)?;
            removed += 1;
        } else if file_type.is_symlink() && path.is_dir() {
            log::debug!("removing directory link {}", path.display());
            remove_link(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Removes `dest_dir` entirely after a failed fetch.
///
/// Cleanup is best-effort: a failure is logged and otherwise ignored so the
/// caller can still report the error that triggered it.
pub fn discard_destination(dest_dir: &Utf8Path) {
    match fs::remove_dir_all(dest_dir) {
        Ok(()) => log::info!("removed {dest_dir} after failed fetch"),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => log::warn!("failed to remove {dest_dir}: {err}"),
    }
}

#[cfg(unix)]
fn remove_link(path: &std::path::Path) -> std::io::Result<()> {
    fs::remove_file(path)
}

// Directory symlinks on Windows are removed with `remove_dir`.
#[cfg(not(unix))]
fn remove_link(path: &std::path::Path) -> std::io::Result<()> {
    fs::remove_dir(path).or_else(|_| fs::remove_file(path))
}
