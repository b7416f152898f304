//! Tests for fetcher CLI parsing and usage errors.

use super::*;
use rstest::rstest;

#[test]
fn cli_parses_positionals_with_defaults() {
    let cli = Cli::parse_from(["thirdparty-fetch", "/opt/deps", "0.10.0"]);
    assert_eq!(cli.dest_dir, Utf8PathBuf::from("/opt/deps"));
    assert_eq!(cli.release, "0.10.0");
    assert!(cli.manifest.is_none());
    assert!(!cli.dry_run);
    assert_eq!(cli.verbosity, 0);
    assert!(!cli.quiet);
    assert_eq!(cli.http_client, HttpClient::Native);
    assert_eq!(cli.timeout(), None);
}

#[test]
fn cli_parses_all_options() {
    let cli = Cli::parse_from([
        "thirdparty-fetch",
        "-m",
        "/etc/manifest.toml",
        "--dry-run",
        "-vv",
        "--http-client",
        "wget",
        "--timeout",
        "90",
        "/opt/deps",
        "0.10.0",
    ]);
    assert_eq!(cli.manifest, Some(Utf8PathBuf::from("/etc/manifest.toml")));
    assert!(cli.dry_run);
    assert_eq!(cli.verbosity, 2);
    assert_eq!(cli.http_client, HttpClient::Wget);
    assert_eq!(cli.timeout(), Some(Duration::from_secs(90)));
}

#[rstest]
#[case::no_arguments(&["thirdparty-fetch"])]
#[case::missing_version(&["thirdparty-fetch", "/opt/deps"])]
#[case::extra_argument(&["thirdparty-fetch", "/opt/deps", "0.10.0", "extra"])]
#[case::quiet_and_verbose(&["thirdparty-fetch", "-q", "-v", "/opt/deps", "0.10.0"])]
#[case::zero_timeout(&["thirdparty-fetch", "--timeout", "0", "/opt/deps", "0.10.0"])]
#[case::unknown_client(&["thirdparty-fetch", "--http-client", "curl", "/opt/deps", "0.10.0"])]
fn invalid_invocations_are_usage_errors(#[case] args: &[&str]) {
    let err = Cli::try_parse_from(args).expect_err("invocation should be rejected");
    assert_eq!(parse_exit_code(&err), USAGE_EXIT_CODE);
}

#[rstest]
#[case::help("--help")]
#[case::version("--version")]
fn help_and_version_exit_successfully(#[case] flag: &str) {
    let err = Cli::try_parse_from(["thirdparty-fetch", flag]).expect_err("clap short-circuits");
    assert_eq!(parse_exit_code(&err), 0);
}

#[test]
fn cli_definition_is_consistent() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
}
