//! Canonical output manifest serialization
//!
//! Writes the consolidated `bundles.xml` that describes the assembled
//! runtime directory: levels in ascending numeric order, one
//! `<bundle start="...">filename</bundle>` per entry, UTF-8 with an XML 1.0
//! declaration and two-space indentation (cosmetic only). The file is
//! written atomically so a failed run never leaves a partial manifest.

use crate::core::BundlepackError;
use crate::utils::fs::atomic_write;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::path::Path;

/// Conventional name of the output manifest inside the bundle directory
pub const MANIFEST_FILE_NAME: &str = "bundles.xml";

/// One serialized manifest line: output filename plus start flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Filename of the copied jar, relative to the bundle directory
    pub filename: String,
    /// Whether the container should start this bundle
    pub start: bool,
}

/// Serialize level groups to `path`
///
/// `levels` must already be in ascending level order with entries in their
/// final in-bucket order; this function is a pure formatting step over that
/// model.
pub fn write_manifest<'a, I>(path: &Path, levels: I) -> Result<(), BundlepackError>
where
    I: IntoIterator<Item = (u32, &'a [ManifestEntry])>,
{
    let mut buffer = Vec::new();
    let mut writer = Writer::new_with_indent(&mut buffer, b' ', 2);

    let fail = |e: &dyn std::fmt::Display| BundlepackError::OutputWrite {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(|e| fail(&e))?;
    writer
        .write_event(Event::Start(BytesStart::new("bundles")))
        .map_err(|e| fail(&e))?;

    for (level, entries) in levels {
        let mut level_elem = BytesStart::new("level");
        level_elem.push_attribute(("level", level.to_string().as_str()));
        writer.write_event(Event::Start(level_elem)).map_err(|e| fail(&e))?;

        for entry in entries {
            let mut bundle_elem = BytesStart::new("bundle");
            bundle_elem.push_attribute(("start", if entry.start { "true" } else { "false" }));
            writer.write_event(Event::Start(bundle_elem)).map_err(|e| fail(&e))?;
            writer
                .write_event(Event::Text(BytesText::new(&entry.filename)))
                .map_err(|e| fail(&e))?;
            writer
                .write_event(Event::End(BytesEnd::new("bundle")))
                .map_err(|e| fail(&e))?;
        }

        writer
            .write_event(Event::End(BytesEnd::new("level")))
            .map_err(|e| fail(&e))?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("bundles")))
        .map_err(|e| fail(&e))?;

    atomic_write(path, &buffer).map_err(|e| BundlepackError::OutputWrite {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(filename: &str, start: bool) -> ManifestEntry {
        ManifestEntry {
            filename: filename.to_string(),
            start,
        }
    }

    #[test]
    fn test_write_manifest_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE_NAME);

        let level1 = vec![entry("g-a-1.0.jar", true), entry("g-b-2.0.jar", false)];
        let level20 = vec![entry("g-c-3.0.jar", true)];
        write_manifest(
            &path,
            vec![(1_u32, level1.as_slice()), (20_u32, level20.as_slice())],
        )
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(content.contains("<level level=\"1\">"));
        assert!(content.contains("<level level=\"20\">"));
        assert!(content.contains("<bundle start=\"true\">g-a-1.0.jar</bundle>"));
        assert!(content.contains("<bundle start=\"false\">g-b-2.0.jar</bundle>"));
        // level 1 precedes level 20
        assert!(content.find("level=\"1\"").unwrap() < content.find("level=\"20\"").unwrap());
    }

    #[test]
    fn test_empty_levels_iterator() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE_NAME);
        write_manifest(&path, Vec::<(u32, &[ManifestEntry])>::new()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<bundles>"));
        assert!(content.contains("</bundles>"));
    }

    #[test]
    fn test_output_parses_back() {
        use crate::bundles::{BundlesDocument, ListFormat};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE_NAME);
        let level = vec![entry("com.example-thing-1.0.jar", true)];
        write_manifest(&path, vec![(10_u32, level.as_slice())]).unwrap();

        // the output format is itself a legacy-schema bundle list
        let doc = BundlesDocument::read(&path, ListFormat::Legacy).unwrap();
        assert_eq!(doc.levels.len(), 1);
        assert_eq!(doc.levels[0].level, 10);
        assert!(doc.levels[0].bundles[0].start);
        assert_eq!(doc.levels[0].bundles[0].locator, "com.example-thing-1.0.jar");
    }
}
