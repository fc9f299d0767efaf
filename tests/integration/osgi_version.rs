//! Integration tests for the `osgi-version` command

use crate::common::TestEnvironment;
use predicates::prelude::*;

#[test]
fn test_release_version_passes_through() {
    let env = TestEnvironment::new();
    env.command()
        .args(["osgi-version", "1.2.3"])
        .assert()
        .success()
        .stdout("1.2.3\n");
}

#[test]
fn test_short_version_padded() {
    let env = TestEnvironment::new();
    env.command()
        .args(["osgi-version", "1.2"])
        .assert()
        .success()
        .stdout("1.2.0\n");
}

#[test]
fn test_snapshot_gets_timestamp() {
    let env = TestEnvironment::new();
    env.command()
        .args(["osgi-version", "1.2.3-SNAPSHOT"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^1\.2\.3\.v[0-9]{14}\n$").unwrap());
}

#[test]
fn test_cxx_convention() {
    let env = TestEnvironment::new();
    env.command()
        .args(["osgi-version", "7.10.1.c59.2"])
        .assert()
        .success()
        .stdout("7.10.1.c59_2\n");
}

#[test]
fn test_bad_version_fails() {
    let env = TestEnvironment::new();
    env.command()
        .args(["osgi-version", "not-a-version"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not match"));
}

#[test]
fn test_version_from_config() {
    let env = TestEnvironment::new();
    env.write_file(
        "bundlepack.toml",
        r#"
[project]
version = "4.5.6"
"#,
    );
    env.command()
        .arg("osgi-version")
        .assert()
        .success()
        .stdout("4.5.6\n");
}

#[test]
fn test_no_version_anywhere_fails() {
    let env = TestEnvironment::new();
    env.command()
        .arg("osgi-version")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no version argument"));
}
