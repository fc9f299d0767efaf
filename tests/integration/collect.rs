//! Integration tests for the `collect` command

use crate::common::{
    BUNDLE_MANIFEST, FRAGMENT_MANIFEST, PLAIN_JAR_MANIFEST, TestEnvironment, jars_in,
};
use predicates::prelude::*;

/// Basic run: two bundles at two levels, copied and listed in order
#[test]
fn test_collect_two_levels() {
    let env = TestEnvironment::new();
    env.install_bundle("com.example", "alpha", "1.0", BUNDLE_MANIFEST);
    env.install_bundle("com.example", "beta", "2.0", BUNDLE_MANIFEST);
    env.write_file(
        "bundles.xml",
        r#"<?xml version='1.0' encoding='utf-8'?>
<bundles>
  <level level="1">
    <bundle>com.example/alpha/1.0</bundle>
  </level>
  <level level="2">
    <bundle noStart="true">com.example/beta/2.0</bundle>
  </level>
</bundles>"#,
    );

    env.command()
        .args(["collect", "bundles.xml", "-o", "bundles"])
        .arg("--local-repository")
        .arg(&env.repo_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Collected 2 unique bundles"));

    assert_eq!(
        jars_in(&env.output_dir()),
        vec!["com.example-alpha-1.0.jar", "com.example-beta-2.0.jar"]
    );

    let manifest = env.manifest_content().expect("manifest written");
    assert!(manifest.contains("<level level=\"1\">"));
    assert!(manifest.contains("<bundle start=\"true\">com.example-alpha-1.0.jar</bundle>"));
    assert!(manifest.contains("<bundle start=\"false\">com.example-beta-2.0.jar</bundle>"));
}

/// Scenario A: the same artifact in two documents at levels 10 and 5 lands
/// once, at level 5, with the first-seen start flag
#[test]
fn test_collect_min_level_and_first_seen_start_across_documents() {
    let env = TestEnvironment::new();
    env.install_bundle("com.example", "dup", "1.0", BUNDLE_MANIFEST);
    env.write_file(
        "first.xml",
        r#"<bundles><level level="10"><bundle>com.example/dup/1.0</bundle></level></bundles>"#,
    );
    env.write_file(
        "second.xml",
        r#"<bundles><level level="5"><bundle noStart="true">com.example/dup/1.0</bundle></level></bundles>"#,
    );

    env.command()
        .args(["collect", "first.xml", "second.xml", "-o", "bundles"])
        .arg("--local-repository")
        .arg(&env.repo_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Collected 1 unique bundle "));

    assert_eq!(jars_in(&env.output_dir()), vec!["com.example-dup-1.0.jar"]);

    let manifest = env.manifest_content().unwrap();
    assert!(manifest.contains("<level level=\"5\">"));
    assert!(!manifest.contains("<level level=\"10\">"));
    // declared start=true first, so the relocated entry still starts
    assert!(manifest.contains("<bundle start=\"true\">com.example-dup-1.0.jar</bundle>"));
}

/// Scenario B: a fragment bundle is never started even when requested
#[test]
fn test_collect_fragment_never_starts() {
    let env = TestEnvironment::new();
    env.install_bundle("com.example", "fragment", "1.0", FRAGMENT_MANIFEST);
    env.write_file(
        "bundles.xml",
        r#"<bundles><level level="1"><bundle>com.example/fragment/1.0</bundle></level></bundles>"#,
    );

    env.command()
        .args(["collect", "bundles.xml", "-o", "bundles"])
        .arg("--local-repository")
        .arg(&env.repo_dir)
        .assert()
        .success();

    let manifest = env.manifest_content().unwrap();
    assert!(manifest.contains("<bundle start=\"false\">com.example-fragment-1.0.jar</bundle>"));
}

/// Scenario C: a jar without Bundle-ManifestVersion aborts the run and no
/// manifest is written
#[test]
fn test_collect_plain_jar_is_fatal() {
    let env = TestEnvironment::new();
    env.install_bundle("com.example", "plain", "1.0", PLAIN_JAR_MANIFEST);
    env.write_file(
        "bundles.xml",
        r#"<bundles><level level="1"><bundle>com.example/plain/1.0</bundle></level></bundles>"#,
    );

    env.command()
        .args(["collect", "bundles.xml", "-o", "bundles"])
        .arg("--local-repository")
        .arg(&env.repo_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not an OSGi bundle"));

    assert!(env.manifest_content().is_none(), "no partial manifest");
}

/// Scenario D: a malformed document aborts the run before any output
#[test]
fn test_collect_malformed_level_attribute() {
    let env = TestEnvironment::new();
    env.write_file(
        "bundles.xml",
        r#"<bundles><level level="high"><bundle>com.example/x/1.0</bundle></level></bundles>"#,
    );

    env.command()
        .args(["collect", "bundles.xml", "-o", "bundles"])
        .arg("--local-repository")
        .arg(&env.repo_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed document"));

    assert!(env.manifest_content().is_none());
}

/// An unresolvable artifact is fatal by default but only a warning under
/// --skip-missing
#[test]
fn test_collect_skip_missing() {
    let env = TestEnvironment::new();
    env.install_bundle("com.example", "present", "1.0", BUNDLE_MANIFEST);
    env.write_file(
        "bundles.xml",
        r#"<bundles><level level="1">
  <bundle>com.example/present/1.0</bundle>
  <bundle>com.example/absent/9.9</bundle>
</level></bundles>"#,
    );

    env.command()
        .args(["collect", "bundles.xml", "-o", "bundles"])
        .arg("--local-repository")
        .arg(&env.repo_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unable to resolve artifact"));

    env.command()
        .args(["collect", "bundles.xml", "-o", "bundles", "--skip-missing"])
        .arg("--local-repository")
        .arg(&env.repo_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Collected 1 unique bundle "));

    let manifest = env.manifest_content().unwrap();
    assert!(manifest.contains("com.example-present-1.0.jar"));
    assert!(!manifest.contains("absent"));
}

/// The -dependency- sentinel takes the version pinned in bundlepack.toml
#[test]
fn test_collect_dependency_sentinel() {
    let env = TestEnvironment::new();
    env.install_bundle("commons-io", "commons-io", "2.4", BUNDLE_MANIFEST);
    env.write_file(
        "bundlepack.toml",
        r#"
[[dependencies]]
group = "commons-io"
artifact = "commons-io"
version = "2.4"
"#,
    );
    env.write_file(
        "bundles.xml",
        r#"<bundles><level level="1"><bundle>commons-io/commons-io/-dependency-</bundle></level></bundles>"#,
    );

    env.command()
        .args(["collect", "bundles.xml", "-o", "bundles"])
        .arg("--local-repository")
        .arg(&env.repo_dir)
        .assert()
        .success();

    assert_eq!(jars_in(&env.output_dir()), vec!["commons-io-commons-io-2.4.jar"]);
}

/// The sentinel without a matching pin fails even under --skip-missing
#[test]
fn test_collect_unpinned_sentinel_is_fatal() {
    let env = TestEnvironment::new();
    env.write_file(
        "bundles.xml",
        r#"<bundles><level level="1"><bundle>commons-io/commons-io/-dependency-</bundle></level></bundles>"#,
    );

    env.command()
        .args(["collect", "bundles.xml", "-o", "bundles", "--skip-missing"])
        .arg("--local-repository")
        .arg(&env.repo_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("but it is not a dependency"));
}

/// Properties from the configuration interpolate into locators
#[test]
fn test_collect_interpolation() {
    let env = TestEnvironment::new();
    env.install_bundle("org.apache.camel", "camel-core", "2.16.1", BUNDLE_MANIFEST);
    env.write_file(
        "bundlepack.toml",
        r#"
[properties]
"camel.version" = "2.16.1"
"#,
    );
    env.write_file(
        "bundles.xml",
        r#"<bundles><level level="1"><bundle>org.apache.camel/camel-core/${camel.version}</bundle></level></bundles>"#,
    );

    env.command()
        .args(["collect", "bundles.xml", "-o", "bundles"])
        .arg("--local-repository")
        .arg(&env.repo_dir)
        .assert()
        .success();

    assert_eq!(
        jars_in(&env.output_dir()),
        vec!["org.apache.camel-camel-core-2.16.1.jar"]
    );
}

/// The legacy schema reads start="true" and defaults to not starting
#[test]
fn test_collect_legacy_format() {
    let env = TestEnvironment::new();
    env.install_bundle("com.example", "alpha", "1.0", BUNDLE_MANIFEST);
    env.install_bundle("com.example", "beta", "1.0", BUNDLE_MANIFEST);
    env.write_file(
        "bundles.xml",
        r#"<bundles><level level="1">
  <bundle start="true">com.example/alpha/1.0</bundle>
  <bundle>com.example/beta/1.0</bundle>
</level></bundles>"#,
    );

    env.command()
        .args(["collect", "bundles.xml", "-o", "bundles", "--format", "legacy"])
        .arg("--local-repository")
        .arg(&env.repo_dir)
        .assert()
        .success();

    let manifest = env.manifest_content().unwrap();
    assert!(manifest.contains("<bundle start=\"true\">com.example-alpha-1.0.jar</bundle>"));
    assert!(manifest.contains("<bundle start=\"false\">com.example-beta-1.0.jar</bundle>"));
}

/// Aggregating the same document twice changes nothing
#[test]
fn test_collect_idempotent_identity() {
    let env = TestEnvironment::new();
    env.install_bundle("com.example", "alpha", "1.0", BUNDLE_MANIFEST);
    let doc =
        r#"<bundles><level level="1"><bundle>com.example/alpha/1.0</bundle></level></bundles>"#;
    env.write_file("first.xml", doc);
    env.write_file("second.xml", doc);

    env.command()
        .args(["collect", "first.xml", "second.xml", "-o", "bundles"])
        .arg("--local-repository")
        .arg(&env.repo_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Collected 1 unique bundle "));

    let manifest = env.manifest_content().unwrap();
    assert_eq!(manifest.matches("com.example-alpha-1.0.jar").count(), 1);
}

/// A reactor entry wins over the local repository
#[test]
fn test_collect_reactor_first() {
    let env = TestEnvironment::new();
    // only the reactor has this artifact; the repository stays empty
    let reactor_jar = env.project_dir.join("built-here.jar");
    std::fs::write(&reactor_jar, crate::common::jar_bytes(Some(BUNDLE_MANIFEST))).unwrap();
    env.write_file(
        "bundlepack.toml",
        r#"
[[reactor]]
group = "com.example"
artifact = "built-here"
version = "1.0"
path = "built-here.jar"
"#,
    );
    env.write_file(
        "bundles.xml",
        r#"<bundles><level level="1"><bundle>com.example/built-here/1.0</bundle></level></bundles>"#,
    );

    env.command()
        .args(["collect", "bundles.xml", "-o", "bundles"])
        .arg("--local-repository")
        .arg(&env.repo_dir)
        .assert()
        .success();

    assert_eq!(jars_in(&env.output_dir()), vec!["com.example-built-here-1.0.jar"]);
}
