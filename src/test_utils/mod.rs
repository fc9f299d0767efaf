//! Shared helpers for unit tests

use std::io::Write;
use std::path::{Path, PathBuf};

/// Write a jar at `dir/name` with the given manifest content
///
/// Pass `None` to produce a jar with no `META-INF/MANIFEST.MF` entry at
/// all.
pub fn write_jar(dir: &Path, name: &str, manifest: Option<&str>) -> PathBuf {
    let path = dir.join(name);
    let file = std::fs::File::create(&path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    if let Some(content) = manifest {
        writer.start_file("META-INF/MANIFEST.MF", options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.start_file("com/example/Placeholder.class", options).unwrap();
    writer.write_all(b"\xca\xfe\xba\xbe").unwrap();
    writer.finish().unwrap();
    path
}

/// Manifest content for an ordinary startable bundle
pub const BUNDLE_MANIFEST: &str =
    "Manifest-Version: 1.0\r\nBundle-ManifestVersion: 2\r\nBundle-SymbolicName: com.example.test\r\n\r\n";

/// Manifest content for a fragment bundle
pub const FRAGMENT_MANIFEST: &str =
    "Manifest-Version: 1.0\r\nBundle-ManifestVersion: 2\r\nFragment-Host: com.example.host\r\n\r\n";

/// Manifest content for a jar that is not an OSGi bundle
pub const PLAIN_JAR_MANIFEST: &str = "Manifest-Version: 1.0\r\n\r\n";
