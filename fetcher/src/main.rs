//! Third-party fetcher CLI entrypoint.
//!
//! This binary fetches the artifacts described by the manifest into the
//! destination directory, unpacks them, and renames the unpacked trees to
//! canonical names. Fetch failures exit with the failing fetch's status.

use clap::{CommandFactory, Parser};
use std::io::Write;
use thirdparty_fetch::cli::{Cli, HttpClient, parse_exit_code};
use thirdparty_fetch::command::SystemCommandExecutor;
use thirdparty_fetch::dirs::{BaseDirs, SystemBaseDirs};
use thirdparty_fetch::error::{Result, USAGE_EXIT_CODE};
use thirdparty_fetch::extraction::StandardExtractor;
use thirdparty_fetch::fetch::Fetchers;
use thirdparty_fetch::fetch::http::{HttpDownloader, UreqDownloader, WgetDownloader};
use thirdparty_fetch::logging;
use thirdparty_fetch::manifest::resolve_manifest;
use thirdparty_fetch::mirror::ArchiveHost;
use thirdparty_fetch::output::{DryRunInfo, write_stderr_line};
use thirdparty_fetch::pipeline::{PipelineContext, run_pipeline};
use thirdparty_fetch::plan::{FetchPlan, validate_version};

fn main() {
    let mut stderr = std::io::stderr();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let exit_code = parse_exit_code(&err);
            if err.print().is_err() {
                // Nothing left to report to.
            }
            std::process::exit(exit_code);
        }
    };

    logging::init(cli.verbosity, cli.quiet);
    let run_result = run(&cli, &SystemBaseDirs, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, dirs: &dyn BaseDirs, stderr: &mut dyn Write) -> Result<()> {
    // Reject a bad version before reading any configuration.
    validate_version(&cli.release)?;

    let (manifest, origin) = resolve_manifest(cli.manifest.as_deref(), dirs)?;
    let host = ArchiveHost::from_env(&manifest.mirror_env);
    let plan = FetchPlan::resolve(&manifest, &cli.dest_dir, &cli.release, host)?;

    if cli.dry_run {
        let info = DryRunInfo {
            plan: &plan,
            origin: &origin,
        };
        write_stderr_line(stderr, info.display_text());
        return Ok(());
    }

    let executor = SystemCommandExecutor::with_timeout(cli.timeout());
    let native;
    let wget;
    let downloader: &dyn HttpDownloader = match cli.http_client {
        HttpClient::Native => {
            native = UreqDownloader::new(cli.timeout());
            &native
        }
        HttpClient::Wget => {
            wget = WgetDownloader::new(&executor);
            &wget
        }
    };

    let context = PipelineContext {
        fetchers: Fetchers {
            executor: &executor,
            downloader,
        },
        extractor: &StandardExtractor,
        quiet: cli.quiet,
    };
    let report = run_pipeline(&context, &plan, stderr)?;
    log::debug!(
        "unpacked {} trees, reused {} archives",
        report.unpacked.len(),
        report.skipped.len()
    );
    Ok(())
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            let exit_code = err.exit_code();
            if exit_code == USAGE_EXIT_CODE {
                write_stderr_line(stderr, Cli::command().render_usage());
            }
            exit_code
        }
    }
}
