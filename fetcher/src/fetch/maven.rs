//! Maven artifact fetching.
//!
//! Runs the Maven dependency plugin's `copy` goal, which resolves a
//! coordinate against the configured repositories and copies the artifact
//! into an output directory.

use crate::command::{CommandExecutor, exit_status_code, failure_message, spawn_failure_status};
use crate::error::{FetchError, Result};
use crate::plan::{FetchPlan, PlannedArtifact};

/// Maven goal that copies a single artifact into a directory.
pub const COPY_GOAL: &str = "dependency:copy";

/// Builds the Maven arguments for copying `coordinate` into the plan's
/// destination directory.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use thirdparty_fetch::fetch::maven::copy_args;
/// use thirdparty_fetch::manifest::Manifest;
/// use thirdparty_fetch::mirror::ArchiveHost;
/// use thirdparty_fetch::plan::FetchPlan;
///
/// let manifest = Manifest::builtin()?;
/// let plan = FetchPlan::resolve(&manifest, Utf8Path::new("/d"), "0.9.0", ArchiveHost::Public)?;
/// let args = copy_args(&plan, "org.example:dist:1.0:zip");
/// assert_eq!(args, ["-q", "dependency:copy", "-Dartifact=org.example:dist:1.0:zip", "-DoutputDirectory=/d"]);
/// # Ok::<(), thirdparty_fetch::error::FetchError>(())
/// ```
#[must_use]
pub fn copy_args(plan: &FetchPlan, coordinate: &str) -> Vec<String> {
    let mut args = plan.maven_args.clone();
    args.extend([
        "-q".to_owned(),
        COPY_GOAL.to_owned(),
        format!("-Dartifact={coordinate}"),
        format!("-DoutputDirectory={}", plan.dest_dir),
    ]);
    args
}

/// Fetches a Maven artifact and checks that it landed at its archive path.
///
/// # Errors
///
/// Returns [`FetchError::FetchFailed`] with Maven's exit status when the
/// command fails or cannot be started, [`FetchError::CommandTimeout`] when
/// it runs too long, and [`FetchError::ArchiveMissing`] when Maven succeeds
/// without producing the expected file.
pub fn fetch_maven(
    executor: &dyn CommandExecutor,
    plan: &FetchPlan,
    artifact: &PlannedArtifact,
    coordinate: &str,
) -> Result<()> {
    let args = copy_args(plan, coordinate);
    let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();

    let output = match executor.run(&plan.maven_command, &arg_refs) {
        Ok(output) => output,
        Err(FetchError::Io(err)) => {
            return Err(FetchError::FetchFailed {
                artifact: artifact.name.clone(),
                status: spawn_failure_status(&err),
                message: format!("could not run {}: {err}", plan.maven_command),
            });
        }
        Err(other) => return Err(other),
    };

    if !output.status.success() {
        return Err(FetchError::FetchFailed {
            artifact: artifact.name.clone(),
            status: exit_status_code(&output),
            message: failure_message(&output),
        });
    }

    if !artifact.archive_path.is_file() {
        return Err(FetchError::ArchiveMissing {
            path: artifact.archive_path.clone(),
        });
    }
    Ok(())
}
