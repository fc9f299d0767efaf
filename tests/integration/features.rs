//! Integration tests for the `features` command

use crate::common::{BUNDLE_MANIFEST, TestEnvironment, jars_in};
use predicates::prelude::*;

const FEATURES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<features name="test" xmlns="http://karaf.apache.org/xmlns/features/v1.3.0">
  <feature name="core" version="1.0">
    <bundle start-level="30">mvn:com.example/alpha/1.0</bundle>
    <bundle start="false">mvn:com.example/beta/2.0</bundle>
  </feature>
  <feature name="extras">
    <bundle>mvn:com.example/gamma/3.0</bundle>
  </feature>
</features>"#;

fn environment() -> TestEnvironment {
    let env = TestEnvironment::new();
    env.install_bundle("com.example", "alpha", "1.0", BUNDLE_MANIFEST);
    env.install_bundle("com.example", "beta", "2.0", BUNDLE_MANIFEST);
    env.install_bundle("com.example", "gamma", "3.0", BUNDLE_MANIFEST);
    env.write_file("features.xml", FEATURES_XML);
    env
}

/// Full conversion: explicit levels kept, missing levels defaulted
#[test]
fn test_features_convert_all() {
    let env = environment();

    env.command()
        .args(["features", "features.xml", "-o", "bundles"])
        .arg("--local-repository")
        .arg(&env.repo_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Converted"));

    assert_eq!(
        jars_in(&env.output_dir()),
        vec![
            "com.example-alpha-1.0.jar",
            "com.example-beta-2.0.jar",
            "com.example-gamma-3.0.jar"
        ]
    );

    let manifest = env.manifest_content().unwrap();
    assert!(manifest.contains("<level level=\"30\">"));
    // gamma has no start-level and falls back to the default of 70
    assert!(manifest.contains("<level level=\"70\">"));
    assert!(manifest.contains("<bundle start=\"false\">com.example-beta-2.0.jar</bundle>"));
}

/// --feature selects exactly the named features
#[test]
fn test_features_exact_selection() {
    let env = environment();

    env.command()
        .args(["features", "features.xml", "-o", "bundles", "--feature", "extras"])
        .arg("--local-repository")
        .arg(&env.repo_dir)
        .assert()
        .success();

    assert_eq!(jars_in(&env.output_dir()), vec!["com.example-gamma-3.0.jar"]);
}

/// Asking for a feature no file provides is an error
#[test]
fn test_features_missing_feature_fails() {
    let env = environment();

    env.command()
        .args(["features", "features.xml", "-o", "bundles", "--feature", "nope"])
        .arg("--local-repository")
        .arg(&env.repo_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not all features were found"));
}

/// Bundle exclude patterns drop individual artifacts
#[test]
fn test_features_bundle_excludes() {
    let env = environment();

    env.command()
        .args([
            "features",
            "features.xml",
            "-o",
            "bundles",
            "--exclude-bundle",
            "com.example:beta",
        ])
        .arg("--local-repository")
        .arg(&env.repo_dir)
        .assert()
        .success();

    assert_eq!(
        jars_in(&env.output_dir()),
        vec!["com.example-alpha-1.0.jar", "com.example-gamma-3.0.jar"]
    );
}

/// The default start level is configurable
#[test]
fn test_features_custom_default_level() {
    let env = environment();

    env.command()
        .args([
            "features",
            "features.xml",
            "-o",
            "bundles",
            "--default-start-level",
            "55",
        ])
        .arg("--local-repository")
        .arg(&env.repo_dir)
        .assert()
        .success();

    let manifest = env.manifest_content().unwrap();
    assert!(manifest.contains("<level level=\"55\">"));
}
