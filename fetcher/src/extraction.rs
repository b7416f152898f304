//! Archive extraction for fetched artifacts.
//!
//! Unpacks `.zip`, `.tar.gz`, and `.tar.zst` archives into a directory with
//! path traversal protection to prevent zip-slip attacks.

use std::fs::File;
use std::io::Read;
use std::path::{Component, Path};

/// Trait for extracting archives, enabling test mocking.
///
/// # Examples
///
/// ```
/// use thirdparty_fetch::extraction::StandardExtractor;
///
/// let extractor = StandardExtractor;
/// // Use extractor.extract(archive_path, dest_dir) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveExtractor {
    /// Extract the archive at `archive_path` into `dest_dir`.
    ///
    /// Returns the number of entries written.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::UnsupportedFormat`] when the file name has
    /// no recognised extension, [`ExtractionError::PathTraversal`] if any
    /// entry attempts to escape the destination directory,
    /// [`ExtractionError::EmptyArchive`] if nothing was extracted, and
    /// [`ExtractionError::Io`] or [`ExtractionError::Zip`] on read failures.
    fn extract(&self, archive_path: &Path, dest_dir: &Path) -> Result<usize, ExtractionError>;
}

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// I/O error during extraction.
    #[error("extraction I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The zip container could not be read.
    #[error("invalid zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A path in the archive attempts to traverse outside the destination.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending path from the archive entry.
        path: String,
    },

    /// The archive file name does not identify a supported format.
    #[error("unsupported archive format: {name}")]
    UnsupportedFormat {
        /// File name of the archive.
        name: String,
    },

    /// The archive contains no entries.
    #[error("archive contains no entries")]
    EmptyArchive,
}

/// Archive container and compression formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// Zip archive.
    Zip,
    /// Gzip-compressed tarball.
    TarGz,
    /// Zstandard-compressed tarball.
    TarZst,
}

impl ArchiveFormat {
    /// Detects the format from the archive's file name.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use thirdparty_fetch::extraction::ArchiveFormat;
    ///
    /// assert_eq!(ArchiveFormat::from_path(Path::new("/d/spark-v2.4.3.tar.gz")), Some(ArchiveFormat::TarGz));
    /// assert_eq!(ArchiveFormat::from_path(Path::new("dist.zip")), Some(ArchiveFormat::Zip));
    /// assert_eq!(ArchiveFormat::from_path(Path::new("notes.txt")), None);
    /// ```
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".zip") || name.ends_with(".jar") {
            Some(Self::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".tar.zst") || name.ends_with(".tzst") {
            Some(Self::TarZst)
        } else {
            None
        }
    }
}

/// Default extractor using the `zip`, `tar`, `flate2`, and `zstd` crates.
///
/// Validates each entry path before extraction to guard against path
/// traversal attacks (zip-slip).
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardExtractor;

impl ArchiveExtractor for StandardExtractor {
    fn extract(&self, archive_path: &Path, dest_dir: &Path) -> Result<usize, ExtractionError> {
        let format =
            ArchiveFormat::from_path(archive_path).ok_or_else(|| ExtractionError::UnsupportedFormat {
                name: archive_path.display().to_string(),
            })?;
        std::fs::create_dir_all(dest_dir)?;

        let file = File::open(archive_path)?;
        let count = match format {
            ArchiveFormat::Zip => extract_zip(file, dest_dir)?,
            ArchiveFormat::TarGz => extract_tar(flate2::read::GzDecoder::new(file), dest_dir)?,
            ArchiveFormat::TarZst => extract_tar(zstd::Decoder::new(file)?, dest_dir)?,
        };

        if count == 0 {
            return Err(ExtractionError::EmptyArchive);
        }
        log::debug!(
            "extracted {count} entries from {} into {}",
            archive_path.display(),
            dest_dir.display()
        );
        Ok(count)
    }
}

fn extract_tar<R: Read>(reader: R, dest_dir: &Path) -> Result<usize, ExtractionError> {
    let mut archive = tar::Archive::new(reader);
    let mut extracted = 0;

    for entry_result in archive.entries()? {
        let mut entry = entry_result?;
        // GitHub tarballs carry the commit id in a pax global header.
        if matches!(
            entry.header().entry_type(),
            tar::EntryType::XGlobalHeader | tar::EntryType::XHeader
        ) {
            continue;
        }

        let entry_path = entry.path()?.into_owned();
        validate_entry_path(&entry_path)?;
        if let Some(target) = entry.link_name()? {
            validate_link_target(&entry_path, entry.header().entry_type(), &target)?;
        }

        // `unpack_in` refuses to write through links that resolve outside `dest_dir`.
        if !entry.unpack_in(dest_dir)? {
            return Err(ExtractionError::PathTraversal {
                path: entry_path.display().to_string(),
            });
        }
        extracted += 1;
    }

    Ok(extracted)
}

fn extract_zip(file: File, dest_dir: &Path) -> Result<usize, ExtractionError> {
    let mut archive = zip::ZipArchive::new(file)?;
    let mut extracted = 0;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let Some(entry_path) = entry.enclosed_name() else {
            return Err(ExtractionError::PathTraversal {
                path: entry.name().to_owned(),
            });
        };
        validate_entry_path(&entry_path)?;

        let dest_path = dest_dir.join(&entry_path);
        if entry.is_dir() {
            std::fs::create_dir_all(&dest_path)?;
        } else {
            if let Some(parent) = dest_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut out = File::create(&dest_path)?;
            std::io::copy(&mut entry, &mut out)?;
            apply_unix_mode(&dest_path, entry.unix_mode())?;
        }
        extracted += 1;
    }

    Ok(extracted)
}

#[cfg(unix)]
fn apply_unix_mode(path: &Path, mode: Option<u32>) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    // Some writers record a zero mode; keep the default rather than lock the file.
    match mode.map(|m| m & 0o7777) {
        Some(bits) if bits != 0 => {
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(bits))
        }
        _ => Ok(()),
    }
}

#[cfg(not(unix))]
fn apply_unix_mode(_path: &Path, _mode: Option<u32>) -> std::io::Result<()> {
    Ok(())
}

/// Validate that an entry path does not escape the destination directory
/// via `..` components or absolute paths.
fn validate_entry_path(path: &Path) -> Result<(), ExtractionError> {
    if path.is_absolute() {
        return Err(ExtractionError::PathTraversal {
            path: path.display().to_string(),
        });
    }
    for component in path.components() {
        if matches!(component, Component::ParentDir) {
            return Err(ExtractionError::PathTraversal {
                path: path.display().to_string(),
            });
        }
    }
    Ok(())
}

/// Validate that a symlink or hard link entry points inside the archive.
///
/// Symlink targets resolve against the entry's parent directory, hard link
/// targets against the archive root.
fn validate_link_target(
    entry_path: &Path,
    kind: tar::EntryType,
    target: &Path,
) -> Result<(), ExtractionError> {
    let escape = || ExtractionError::PathTraversal {
        path: format!("{} -> {}", entry_path.display(), target.display()),
    };
    if target.is_absolute() {
        return Err(escape());
    }

    let mut depth = if kind == tar::EntryType::Symlink {
        entry_path
            .parent()
            .map_or(0, |parent| {
                parent
                    .components()
                    .filter(|c| matches!(c, Component::Normal(_)))
                    .count()
            })
    } else {
        0
    };
    for component in target.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir if depth > 0 => depth -= 1,
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(escape());
            }
        }
    }
    Ok(())
}
