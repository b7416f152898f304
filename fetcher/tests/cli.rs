//! Process-level tests for the `thirdparty-fetch` binary.
//!
//! Only invocations that finish without network access are exercised here:
//! usage errors, help output, and dry runs.

use rstest::rstest;
use std::process::Command;

fn binary() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_thirdparty-fetch"));
    command
        .env_remove("THIRDPARTY_MIRROR")
        .env_remove("RUST_LOG")
        .env("XDG_CONFIG_HOME", "/nonexistent/thirdparty-fetch-test-config");
    command
}

#[rstest]
#[case::no_arguments(&[])]
#[case::destination_only(&["deps"])]
#[case::too_many(&["deps", "0.10.0", "extra"])]
#[case::blank_version(&["deps", " "])]
#[case::version_with_separator(&["deps", "0.10/../x"])]
fn usage_errors_exit_255_without_touching_disk(#[case] args: &[&str]) {
    let temp = tempfile::tempdir().expect("temp dir");

    let output = binary()
        .current_dir(temp.path())
        .args(args)
        .output()
        .expect("run binary");

    assert_eq!(output.status.code(), Some(255));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"), "stderr was: {stderr}");
    assert!(!temp.path().join("deps").exists());
}

#[test]
fn help_exits_successfully() {
    let output = binary().arg("--help").output().expect("run binary");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("THIRDPARTY_MIRROR"));
}

#[test]
fn dry_run_describes_plan_and_leaves_destination_absent() {
    let temp = tempfile::tempdir().expect("temp dir");
    let dest = temp.path().join("deps");

    let output = binary()
        .arg("--dry-run")
        .arg(&dest)
        .arg("0.10.0")
        .output()
        .expect("run binary");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("https://github.com/apache/spark/archive/v2.4.3.tar.gz"));
    assert!(!dest.exists());
}

#[test]
fn malformed_manifest_is_a_configuration_error() {
    let temp = tempfile::tempdir().expect("temp dir");
    let manifest = temp.path().join("manifest.toml");
    std::fs::write(&manifest, "work_dir = [").expect("write manifest");

    let output = binary()
        .arg("--manifest")
        .arg(&manifest)
        .arg(temp.path().join("deps"))
        .arg("0.10.0")
        .output()
        .expect("run binary");

    assert_eq!(output.status.code(), Some(2));
    assert!(!temp.path().join("deps").exists());
}
