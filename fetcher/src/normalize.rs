//! Unpacking fetched archives and moving them to canonical names.
//!
//! GitHub snapshots unpack to a single directory named after the repository
//! and reference (`spark-2.4.3`, `googletest-703bd9c…`). Downstream builds
//! expect version-free names, so each tree is renamed, or a subtree hoisted
//! out of it, according to the artifact's layout.

use crate::error::{FetchError, Result};
use crate::extraction::ArchiveExtractor;
use crate::plan::{PlannedArtifact, PlannedLayout};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Unpacks `artifact` under `work_dir` and returns its canonical path.
///
/// An existing tree at the canonical path is replaced.
///
/// # Errors
///
/// Returns [`FetchError::Extraction`] if the archive cannot be unpacked,
/// [`FetchError::Normalize`] if the expected container or subtree is not
/// present afterwards, and [`FetchError::Io`] if moving files fails.
pub fn unpack_artifact(
    extractor: &dyn ArchiveExtractor,
    work_dir: &Utf8Path,
    artifact: &PlannedArtifact,
) -> Result<Utf8PathBuf> {
    let target = work_dir.join(&artifact.name);

    match &artifact.layout {
        PlannedLayout::ExtractInto => {
            remove_existing(&target)?;
            extract(extractor, &artifact.archive_path, &target)?;
        }
        PlannedLayout::Rename { container } => {
            extract(extractor, &artifact.archive_path, work_dir)?;
            let source = existing_container(work_dir, container, artifact)?;
            if source != target {
                remove_existing(&target)?;
                fs::rename(&source, &target)?;
            }
        }
        PlannedLayout::Hoist { container, path } => {
            extract(extractor, &artifact.archive_path, work_dir)?;
            let root = existing_container(work_dir, container, artifact)?;
            hoist(&root, path, &target, artifact)?;
        }
    }

    log::info!("unpacked {} to {target}", artifact.name);
    Ok(target)
}

fn extract(extractor: &dyn ArchiveExtractor, archive: &Utf8Path, dest: &Utf8Path) -> Result<()> {
    if !archive.is_file() {
        return Err(FetchError::ArchiveMissing {
            path: archive.to_owned(),
        });
    }
    extractor
        .extract(archive.as_std_path(), dest.as_std_path())
        .map(|_| ())
        .map_err(|source| FetchError::Extraction {
            archive: archive.to_owned(),
            source,
        })
}

fn existing_container(
    work_dir: &Utf8Path,
    container: &str,
    artifact: &PlannedArtifact,
) -> Result<Utf8PathBuf> {
    let root = work_dir.join(container);
    if root.is_dir() {
        return Ok(root);
    }
    Err(FetchError::Normalize {
        artifact: artifact.name.clone(),
        reason: format!("{} did not unpack to {container}", artifact.archive_path),
    })
}

/// Moves `root/path` to `target` and removes what is left of `root`.
///
/// The subtree is parked beside `target` first, so hoisting works even when
/// `target` and `root` are the same directory.
fn hoist(
    root: &Utf8Path,
    path: &Utf8Path,
    target: &Utf8Path,
    artifact: &PlannedArtifact,
) -> Result<()> {
    let subtree = root.join(path);
    if !subtree.exists() {
        return Err(FetchError::Normalize {
            artifact: artifact.name.clone(),
            reason: format!("{path} not found in {root}"),
        });
    }

    let parked = parked_path(target, &artifact.name);
    remove_existing(&parked)?;
    fs::rename(&subtree, &parked)?;
    let placed = fs::remove_dir_all(root)
        .and_then(|()| remove_existing(target))
        .and_then(|()| fs::rename(&parked, target));
    if let Err(err) = placed {
        discard_parked(&parked);
        return Err(err.into());
    }
    Ok(())
}

fn discard_parked(parked: &Utf8Path) {
    if let Err(err) = remove_existing(parked) {
        log::warn!("failed to remove {parked}: {err}");
    }
}

fn parked_path(target: &Utf8Path, name: &str) -> Utf8PathBuf {
    target.with_file_name(format!(".{name}.hoist"))
}

fn remove_existing(path: &Utf8Path) -> std::io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}
