//! Shared fixtures for integration tests
//!
//! Builds throwaway project directories with a Maven-layout local
//! repository, fabricated bundle jars, and input documents, then drives
//! the `bundlepack` binary against them.

use assert_cmd::Command;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Manifest content for an ordinary startable bundle
pub const BUNDLE_MANIFEST: &str =
    "Manifest-Version: 1.0\r\nBundle-ManifestVersion: 2\r\nBundle-SymbolicName: com.example.test\r\n\r\n";

/// Manifest content for a fragment bundle
pub const FRAGMENT_MANIFEST: &str =
    "Manifest-Version: 1.0\r\nBundle-ManifestVersion: 2\r\nFragment-Host: com.example.host\r\n\r\n";

/// Manifest content for a jar that is not an OSGi bundle
pub const PLAIN_JAR_MANIFEST: &str = "Manifest-Version: 1.0\r\n\r\n";

/// An isolated project directory plus local repository
pub struct TestEnvironment {
    _temp: TempDir,
    /// Working directory the binary runs in
    pub project_dir: PathBuf,
    /// Maven-layout repository the resolver probes
    pub repo_dir: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("create temp dir");
        let project_dir = temp.path().join("project");
        let repo_dir = temp.path().join("repository");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::create_dir_all(&repo_dir).unwrap();
        Self {
            _temp: temp,
            project_dir,
            repo_dir,
        }
    }

    /// A `bundlepack` command rooted in the project directory
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("bundlepack").expect("binary builds");
        cmd.current_dir(&self.project_dir);
        cmd
    }

    /// The default output directory commands are pointed at
    pub fn output_dir(&self) -> PathBuf {
        self.project_dir.join("bundles")
    }

    /// Write a file under the project directory
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.project_dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Install a jar with the given manifest into the local repository
    pub fn install_bundle(&self, group: &str, artifact: &str, version: &str, manifest: &str) {
        let dir = self
            .repo_dir
            .join(group.replace('.', "/"))
            .join(artifact)
            .join(version);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{artifact}-{version}.jar"));
        std::fs::write(&path, jar_bytes(Some(manifest))).unwrap();
    }

    /// Read the produced manifest, if any
    pub fn manifest_content(&self) -> Option<String> {
        std::fs::read_to_string(self.output_dir().join("bundles.xml")).ok()
    }
}

/// Build jar bytes in memory with an optional `META-INF/MANIFEST.MF`
pub fn jar_bytes(manifest: Option<&str>) -> Vec<u8> {
    let cursor = std::io::Cursor::new(Vec::new());
    let mut writer = zip::ZipWriter::new(cursor);
    let options = zip::write::SimpleFileOptions::default();
    if let Some(content) = manifest {
        writer.start_file("META-INF/MANIFEST.MF", options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.start_file("com/example/Placeholder.class", options).unwrap();
    writer.write_all(b"\xca\xfe\xba\xbe").unwrap();
    writer.finish().unwrap().into_inner()
}

/// List the jar files present in a directory, sorted by name
pub fn jars_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .filter(|name| name.ends_with(".jar"))
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
