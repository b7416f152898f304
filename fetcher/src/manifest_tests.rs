//! Tests for manifest parsing, validation, and resolution.

use super::*;
use crate::dirs::FixedBaseDirs;
use rstest::rstest;

const MINIMAL: &str = r#"
[[artifact]]
name = "googletest"
[artifact.source]
kind = "github"
owner = "google"
repo = "googletest"
reference = "release-1.10.0"
"#;

#[test]
fn builtin_manifest_describes_three_artifacts() {
    let manifest = Manifest::builtin().expect("built-in manifest parses");
    let names: Vec<&str> = manifest.artifacts.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["analytics-zoo", "pyspark", "googletest"]);
    assert_eq!(manifest.mirror_env, "THIRDPARTY_MIRROR");
    assert_eq!(manifest.work_dir, "src");

    let Source::Maven(maven) = &manifest.artifacts[0].source else {
        panic!("first artifact should be a Maven package");
    };
    assert_eq!(maven.version, VERSION_PLACEHOLDER);
    assert_eq!(maven.classifier.as_deref(), Some("dist-all"));
    assert!(matches!(
        manifest.artifacts[1].effective_layout(),
        Layout::Hoist { ref path, container: None } if path == "python/pyspark"
    ));
    assert_eq!(
        manifest.artifacts[2].effective_layout(),
        Layout::Rename { container: None }
    );
}

#[test]
fn minimal_manifest_fills_defaults() {
    let manifest = Manifest::from_toml_str(MINIMAL, "test").expect("parse");
    assert_eq!(manifest.maven_command, "mvn");
    assert!(manifest.maven_args.is_empty());
    let Source::Github(github) = &manifest.artifacts[0].source else {
        panic!("expected GitHub source");
    };
    assert_eq!(github.format, GithubFormat::TarGz);
    assert_eq!(
        manifest.artifacts[0].effective_layout(),
        Layout::Rename { container: None }
    );
}

#[test]
fn maven_layout_defaults_to_extract_into() {
    let text = r#"
[[artifact]]
name = "dist"
[artifact.source]
kind = "maven"
group = "org.example"
artifact = "dist"
"#;
    let manifest = Manifest::from_toml_str(text, "test").expect("parse");
    assert_eq!(manifest.artifacts[0].effective_layout(), Layout::ExtractInto);
    let Source::Maven(maven) = &manifest.artifacts[0].source else {
        panic!("expected Maven source");
    };
    assert_eq!(maven.packaging, "zip");
    assert_eq!(maven.version, "{version}");
}

#[test]
fn unknown_top_level_field_is_rejected() {
    let text = format!("colour = \"blue\"\n{MINIMAL}");
    let err = Manifest::from_toml_str(&text, "test").expect_err("unknown field");
    assert!(matches!(err, FetchError::ManifestParse { .. }));
    assert!(err.to_string().contains("test"));
}

#[test]
fn empty_manifest_is_rejected() {
    let err = Manifest::from_toml_str("", "test").expect_err("no artifacts");
    assert!(matches!(err, FetchError::InvalidManifest { .. }));
}

#[rstest]
#[case::nested_name("name = \"a/b\"", "single directory name")]
#[case::parent_name("name = \"..\"", "single directory name")]
#[case::blank_name("name = \"  \"", "must not be empty")]
fn invalid_artifact_names_are_rejected(#[case] name_line: &str, #[case] expected: &str) {
    let text = MINIMAL.replace("name = \"googletest\"", name_line);
    let err = Manifest::from_toml_str(&text, "test").expect_err("invalid name");
    assert!(
        err.to_string().contains(expected),
        "unexpected error: {err}"
    );
}

#[test]
fn duplicate_names_are_rejected() {
    let text = format!("{MINIMAL}\n{}", MINIMAL.trim_start());
    let err = Manifest::from_toml_str(&text, "test").expect_err("duplicate");
    assert!(err.to_string().contains("duplicate artifact name"));
}

#[test]
fn hoist_path_may_not_escape_the_container() {
    let text = format!("{MINIMAL}[artifact.layout]\nkind = \"hoist\"\npath = \"../outside\"\n");
    let err = Manifest::from_toml_str(&text, "test").expect_err("escaping hoist");
    assert!(err.to_string().contains("hoist path"));
}

#[test]
fn maven_rename_requires_explicit_container() {
    let text = r#"
[[artifact]]
name = "dist"
[artifact.source]
kind = "maven"
group = "org.example"
artifact = "dist"
[artifact.layout]
kind = "rename"
"#;
    let err = Manifest::from_toml_str(text, "test").expect_err("missing container");
    assert!(err.to_string().contains("explicit container"));
}

#[test]
fn load_reports_missing_file() {
    let err = Manifest::load(Utf8Path::new("/nonexistent/manifest.toml")).expect_err("missing");
    assert!(matches!(err, FetchError::ManifestRead { .. }));
}

#[test]
fn resolve_prefers_explicit_path() {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("UTF-8 temp dir");
    let explicit = root.join("custom.toml");
    std::fs::write(&explicit, MINIMAL).expect("write manifest");

    let dirs = FixedBaseDirs {
        config: Some(root.join("config")),
    };
    let (manifest, origin) = resolve_manifest(Some(&explicit), &dirs).expect("resolve");
    assert_eq!(origin, ManifestOrigin::File(explicit));
    assert_eq!(manifest.artifacts.len(), 1);
}

#[test]
fn resolve_uses_user_manifest_when_present() {
    let temp = tempfile::tempdir().expect("temp dir");
    let config = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("UTF-8 temp dir");
    let user_manifest = config.join("manifest.toml");
    std::fs::write(&user_manifest, MINIMAL).expect("write manifest");

    let dirs = FixedBaseDirs {
        config: Some(config),
    };
    let (_, origin) = resolve_manifest(None, &dirs).expect("resolve");
    assert_eq!(origin, ManifestOrigin::File(user_manifest));
}

#[test]
fn resolve_falls_back_to_builtin() {
    let temp = tempfile::tempdir().expect("temp dir");
    let config = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("UTF-8 temp dir");
    let dirs = FixedBaseDirs {
        config: Some(config),
    };
    let (manifest, origin) = resolve_manifest(None, &dirs).expect("resolve");
    assert_eq!(origin, ManifestOrigin::BuiltIn);
    assert_eq!(manifest.artifacts.len(), 3);
    assert_eq!(origin.to_string(), "built-in");
}
