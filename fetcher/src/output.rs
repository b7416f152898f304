//! Output formatting for the fetcher CLI.
//!
//! Progress lines, the success summary, and the dry-run report are all
//! written to stderr through an injected writer so tests can capture them.

use crate::fetch::maven::copy_args;
use crate::manifest::ManifestOrigin;
use crate::plan::{FetchPlan, FetchStep, PlannedLayout};
use camino::Utf8Path;
use std::io::Write;

/// Writes a line to `stderr`, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort progress output; ignore write failures.
    }
}

/// Format a success message after all artifacts are in place.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use thirdparty_fetch::output::success_message;
///
/// let msg = success_message(3, Utf8Path::new("/opt/deps/src"));
/// assert_eq!(msg, "Fetched 3 artifacts into /opt/deps/src");
/// ```
#[must_use]
pub fn success_message(count: usize, work_dir: &Utf8Path) -> String {
    let plural = if count == 1 { "artifact" } else { "artifacts" };
    format!("Fetched {count} {plural} into {work_dir}")
}

/// Information shown by `--dry-run`.
///
/// # Example
///
/// ```
/// use camino::Utf8Path;
/// use thirdparty_fetch::manifest::{Manifest, ManifestOrigin};
/// use thirdparty_fetch::mirror::ArchiveHost;
/// use thirdparty_fetch::output::DryRunInfo;
/// use thirdparty_fetch::plan::FetchPlan;
///
/// let manifest = Manifest::builtin()?;
/// let plan = FetchPlan::resolve(&manifest, Utf8Path::new("/opt/deps"), "0.9.0", ArchiveHost::Public)?;
/// let info = DryRunInfo { plan: &plan, origin: &ManifestOrigin::BuiltIn };
///
/// let text = info.display_text();
/// assert!(text.contains("Dry run"));
/// assert!(text.contains("https://github.com/apache/spark/archive/v2.4.3.tar.gz"));
/// # Ok::<(), thirdparty_fetch::error::FetchError>(())
/// ```
#[derive(Debug)]
pub struct DryRunInfo<'a> {
    /// The resolved plan.
    pub plan: &'a FetchPlan,
    /// Where the manifest was loaded from.
    pub origin: &'a ManifestOrigin,
}

impl DryRunInfo<'_> {
    /// Format the dry-run information for display.
    #[must_use]
    pub fn display_text(&self) -> String {
        let plan = self.plan;
        let host = if plan.host.is_mirror() {
            format!("{} (mirror)", plan.host.base_url())
        } else {
            plan.host.base_url().to_owned()
        };

        let mut lines = vec![
            "Dry run - no files will be modified".to_owned(),
            String::new(),
            format!("Manifest: {}", self.origin),
            format!("Destination: {}", plan.dest_dir),
            format!("Work directory: {}", plan.work_dir),
            format!("Archive host: {host}"),
            String::new(),
            "Artifacts:".to_owned(),
        ];

        for artifact in &plan.artifacts {
            lines.push(format!("  {}", artifact.name));
            match &artifact.step {
                FetchStep::Maven { coordinate } => lines.push(format!(
                    "    fetch:  {} {}",
                    plan.maven_command,
                    copy_args(plan, coordinate).join(" ")
                )),
                FetchStep::Http { url } => lines.push(format!("    fetch:  GET {url}")),
            }
            lines.push(format!("    save:   {}", artifact.archive_path));
            let target = plan.canonical_path(artifact);
            lines.push(match &artifact.layout {
                PlannedLayout::ExtractInto => format!("    unpack: into {target}"),
                PlannedLayout::Hoist { container, path } => {
                    format!("    unpack: {container}/{path} -> {target}")
                }
                PlannedLayout::Rename { container } => {
                    format!("    unpack: {container} -> {target}")
                }
            });
        }

        lines.join("\n")
    }
}
