//! Fetch and unpack pipeline orchestration.
//!
//! Runs the steps in order: reset the destination, fetch every artifact,
//! then unpack and normalize each one. The first fetch failure removes the
//! whole destination and stops the run. Unpack failures stop the run but
//! keep the destination so the fetched archives can be inspected and reused.

use crate::error::Result;
use crate::extraction::ArchiveExtractor;
use crate::fetch::{FetchOutcome, Fetchers, fetch_artifact};
use crate::normalize::unpack_artifact;
use crate::output::{success_message, write_stderr_line};
use crate::plan::FetchPlan;
use crate::reset::{discard_destination, reset_destination};
use camino::Utf8PathBuf;
use std::io::Write;

/// Context for a pipeline run.
pub struct PipelineContext<'a> {
    /// Backends used to fetch artifacts.
    pub fetchers: Fetchers<'a>,
    /// Extractor used to unpack archives.
    pub extractor: &'a dyn ArchiveExtractor,
    /// Suppress progress output.
    pub quiet: bool,
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// Canonical paths of the unpacked trees, in manifest order.
    pub unpacked: Vec<Utf8PathBuf>,
    /// Names of artifacts whose archives were already present.
    pub skipped: Vec<String>,
}

/// Runs the whole pipeline for `plan`.
///
/// Prints progress to stderr if not in quiet mode.
///
/// # Errors
///
/// Returns the first fetch error after removing the destination directory,
/// or the first unpack error with the destination left in place.
pub fn run_pipeline(
    context: &PipelineContext<'_>,
    plan: &FetchPlan,
    stderr: &mut dyn Write,
) -> Result<PipelineReport> {
    let removed = reset_destination(&plan.dest_dir)?;
    log::info!("cleared {removed} directories under {}", plan.dest_dir);

    let skipped = match fetch_all(context, plan, stderr) {
        Ok(skipped) => skipped,
        Err(err) => {
            log::info!("fetch failed, removing {}", plan.dest_dir);
            discard_destination(&plan.dest_dir);
            return Err(err);
        }
    };

    let unpacked = unpack_all(context, plan, stderr)?;

    if !context.quiet {
        write_stderr_line(stderr, success_message(unpacked.len(), &plan.work_dir));
    }
    Ok(PipelineReport { unpacked, skipped })
}

/// Fetches every artifact in order, returning the names of skipped ones.
fn fetch_all(
    context: &PipelineContext<'_>,
    plan: &FetchPlan,
    stderr: &mut dyn Write,
) -> Result<Vec<String>> {
    let mut skipped = Vec::new();
    for artifact in &plan.artifacts {
        if !context.quiet {
            write_stderr_line(stderr, format!("Fetching {}...", artifact.name));
        }
        if fetch_artifact(context.fetchers, plan, artifact)? == FetchOutcome::Skipped {
            if !context.quiet {
                write_stderr_line(
                    stderr,
                    format!("  {} already present, skipping download", artifact.archive_path),
                );
            }
            skipped.push(artifact.name.clone());
        }
    }
    Ok(skipped)
}

fn unpack_all(
    context: &PipelineContext<'_>,
    plan: &FetchPlan,
    stderr: &mut dyn Write,
) -> Result<Vec<Utf8PathBuf>> {
    std::fs::create_dir_all(&plan.work_dir)?;
    if !context.quiet {
        write_stderr_line(stderr, format!("Unpacking into {}...", plan.work_dir));
    }
    plan.artifacts
        .iter()
        .map(|artifact| unpack_artifact(context.extractor, &plan.work_dir, artifact))
        .collect()
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
