//! OSGi bundle manifest inspection
//!
//! Opens a resolved jar, reads the main attribute section of
//! `META-INF/MANIFEST.MF`, and classifies the bundle. Two rules matter
//! here:
//!
//! - `Bundle-ManifestVersion` must be exactly `"2"`. Version 1 is long
//!   obsolete and unsupported in current containers, and no version at all
//!   means the jar is not an OSGi bundle. Either way the run fails: the
//!   artifact was explicitly requested as a bundle.
//! - A bundle is a fragment iff `Fragment-Host` is present and non-empty.
//!   Fragments attach to their host's class space and must never be
//!   started.
//!
//! Manifest attribute names are case-insensitive per the jar manifest
//! format; keys are normalized to lower case once at parse time.

use crate::core::BundlepackError;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Path of the manifest entry inside a jar
const MANIFEST_ENTRY: &str = "META-INF/MANIFEST.MF";

/// The parsed main attribute section of a jar manifest
#[derive(Debug, Clone)]
pub struct BundleManifest {
    /// Main attributes, keys lower-cased
    attributes: HashMap<String, String>,
}

impl BundleManifest {
    /// Read and parse the manifest from a jar file
    pub fn from_jar(path: &Path) -> Result<Self, BundlepackError> {
        let file = std::fs::File::open(path)?;

        let mut archive = zip::ZipArchive::new(file).map_err(|e| match e {
            zip::result::ZipError::Io(io) => BundlepackError::Io(io),
            other => BundlepackError::NotAnOsgiBundle {
                path: path.display().to_string(),
                reason: format!("not a readable jar archive: {other}"),
            },
        })?;

        let mut raw = String::new();
        match archive.by_name(MANIFEST_ENTRY) {
            Ok(mut entry) => {
                let mut bytes = Vec::new();
                entry.read_to_end(&mut bytes)?;
                raw = String::from_utf8_lossy(&bytes).into_owned();
            }
            Err(zip::result::ZipError::FileNotFound) => {
                return Err(BundlepackError::NotAnOsgiBundle {
                    path: path.display().to_string(),
                    reason: "jar has no META-INF/MANIFEST.MF".to_string(),
                });
            }
            Err(zip::result::ZipError::Io(io)) => return Err(BundlepackError::Io(io)),
            Err(other) => {
                return Err(BundlepackError::NotAnOsgiBundle {
                    path: path.display().to_string(),
                    reason: format!("failed to read jar manifest: {other}"),
                });
            }
        }

        Ok(Self {
            attributes: parse_main_attributes(&raw),
        })
    }

    /// Case-insensitive attribute lookup
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

/// Parse the main attribute section: everything up to the first blank line,
/// with continuation lines (leading space) unfolded into their header
fn parse_main_attributes(raw: &str) -> HashMap<String, String> {
    let mut attributes: HashMap<String, String> = HashMap::new();
    let mut current_key: Option<String> = None;

    for line in raw.lines() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            // end of the main section
            break;
        }

        if let Some(continuation) = line.strip_prefix(' ') {
            if let Some(key) = &current_key {
                if let Some(value) = attributes.get_mut(key) {
                    value.push_str(continuation);
                }
            }
            continue;
        }

        if let Some((name, value)) = line.split_once(':') {
            let key = name.trim().to_ascii_lowercase();
            attributes.insert(key.clone(), value.trim_start().to_string());
            current_key = Some(key);
        }
    }

    attributes
}

/// Decide whether a copied jar is an OSGi fragment bundle
///
/// Fails with [`BundlepackError::NotAnOsgiBundle`] when the jar carries no
/// valid `Bundle-ManifestVersion`; this is never skippable.
pub fn is_fragment(path: &Path) -> Result<bool, BundlepackError> {
    let manifest = BundleManifest::from_jar(path)?;

    match manifest.attribute("Bundle-ManifestVersion").map(str::trim) {
        Some("2") => {}
        Some(other) => {
            return Err(BundlepackError::NotAnOsgiBundle {
                path: path.display().to_string(),
                reason: format!("Bundle-ManifestVersion is '{other}', not '2'"),
            });
        }
        None => {
            return Err(BundlepackError::NotAnOsgiBundle {
                path: path.display().to_string(),
                reason: "Bundle-ManifestVersion attribute is missing".to_string(),
            });
        }
    }

    Ok(manifest
        .attribute("Fragment-Host")
        .is_some_and(|host| !host.trim().is_empty()))
}
