//! Karaf features.xml conversion
//!
//! Turns Karaf feature files into the same flat bundle directory and
//! `bundles.xml` manifest the aggregation core produces. This exists to
//! allow a transition away from Karaf without leaping immediately into a
//! full bundle-list workflow: read the feature files, resolve each bundle,
//! and write out the level-organized manifest. It is completely ignorant
//! of the configuration-admin side of features; setting up any required
//! configuration is someone else's job.
//!
//! This pass is deliberately simpler than the aggregation core: bundles
//! deduplicate by output filename and the first sighting wins outright
//! (level and start flag alike), there is no fragment inspection, and a
//! missing start level falls back to a configurable default.

use crate::artifact::{ArtifactCoordinate, ArtifactFilter};
use crate::bundles::writer::{MANIFEST_FILE_NAME, ManifestEntry};
use crate::core::BundlepackError;
use crate::resolver::CoordinateResolver;
use crate::utils::fs::copy_file;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// One `<bundle>` element of a feature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureBundle {
    /// The location URI, normally `mvn:`
    pub location: String,
    /// Declared start level; 0 means unset
    pub start_level: u32,
    /// Whether the bundle should be started (Karaf default: true)
    pub start: bool,
}

/// One `<feature>` element with its bundles
///
/// Nested feature references, config, and configfile children are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    /// Feature name
    pub name: String,
    /// Bundles in declaration order
    pub bundles: Vec<FeatureBundle>,
}

/// The parsed content of one features.xml file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeaturesDocument {
    /// Features in declaration order
    pub features: Vec<Feature>,
}

impl FeaturesDocument {
    /// Read one features.xml file, ignoring namespaces
    pub fn read(path: &Path) -> Result<Self, BundlepackError> {
        let mut reader =
            Reader::from_file(path).map_err(|e| BundlepackError::MalformedDocument {
                file: path.display().to_string(),
                position: 0,
                reason: e.to_string(),
            })?;
        reader.config_mut().trim_text(true);

        let file = path.display().to_string();
        let mut buf = Vec::new();
        let mut features = Vec::new();
        let mut current: Option<Feature> = None;
        let mut saw_root = false;

        loop {
            buf.clear();
            let malformed = |reader: &Reader<_>, reason: String| BundlepackError::MalformedDocument {
                file: file.clone(),
                position: reader.buffer_position() as u64,
                reason,
            };
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|e| BundlepackError::MalformedDocument {
                    file: file.clone(),
                    position: reader.buffer_position() as u64,
                    reason: e.to_string(),
                })?
                .into_owned();

            match event {
                Event::Start(e) => {
                    let name = e.local_name();
                    match name.as_ref() {
                        b"features" if !saw_root => saw_root = true,
                        b"feature" if current.is_none() => {
                            let feature_name = attribute_value(&e, b"name").ok_or_else(|| {
                                malformed(&reader, "<feature> element lacks a 'name' attribute".to_string())
                            })?;
                            current = Some(Feature {
                                name: feature_name,
                                bundles: Vec::new(),
                            });
                        }
                        b"bundle" if current.is_some() => {
                            let bundle = read_bundle(&mut reader, &e, &file)?;
                            if let Some(feature) = &mut current {
                                feature.bundles.push(bundle);
                            }
                        }
                        _ => {
                            // repository, details, config, configfile,
                            // nested feature refs: skip the whole subtree
                            let end = e.to_end().into_owned();
                            let mut skip_buf = Vec::new();
                            reader.read_to_end_into(end.name(), &mut skip_buf).map_err(|e| {
                                BundlepackError::MalformedDocument {
                                    file: file.clone(),
                                    position: reader.buffer_position() as u64,
                                    reason: e.to_string(),
                                }
                            })?;
                        }
                    }
                    if !saw_root {
                        return Err(malformed(&reader, "expected <features> root element".to_string()));
                    }
                }
                Event::End(e) => {
                    if e.local_name().as_ref() == b"feature" {
                        if let Some(feature) = current.take() {
                            features.push(feature);
                        }
                    }
                }
                Event::Empty(e) => {
                    if e.local_name().as_ref() == b"bundle" && current.is_some() {
                        return Err(malformed(&reader, "<bundle> element has no location text".to_string()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !saw_root {
            return Err(BundlepackError::MalformedDocument {
                file,
                position: 0,
                reason: "expected <features> root element".to_string(),
            });
        }

        Ok(Self { features })
    }
}

/// Read one attribute off an element by local name
fn attribute_value(element: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    element
        .attributes()
        .filter_map(Result::ok)
        .find(|attr| attr.key.local_name().as_ref() == name)
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}

/// Read a `<bundle>` element's attributes and location text
fn read_bundle<R: std::io::BufRead>(
    reader: &mut Reader<R>,
    element: &BytesStart<'_>,
    file: &str,
) -> Result<FeatureBundle, BundlepackError> {
    let malformed = |reader: &Reader<R>, reason: String| BundlepackError::MalformedDocument {
        file: file.to_string(),
        position: reader.buffer_position() as u64,
        reason,
    };

    let start_level = match attribute_value(element, b"start-level") {
        Some(raw) => raw.parse::<u32>().map_err(|_| {
            malformed(
                reader,
                format!("'start-level' attribute is not an integer: '{raw}'"),
            )
        })?,
        None => 0,
    };
    let start = attribute_value(element, b"start")
        .is_none_or(|v| v.eq_ignore_ascii_case("true"));

    let mut buf = Vec::new();
    let mut location = String::new();
    loop {
        buf.clear();
        match reader.read_event_into(&mut buf).map_err(|e| {
            BundlepackError::MalformedDocument {
                file: file.to_string(),
                position: reader.buffer_position() as u64,
                reason: e.to_string(),
            }
        })? {
            Event::Text(t) => {
                location = t
                    .unescape()
                    .map_err(|e| BundlepackError::MalformedDocument {
                        file: file.to_string(),
                        position: reader.buffer_position() as u64,
                        reason: e.to_string(),
                    })?
                    .trim()
                    .to_string();
            }
            Event::End(e) if e.local_name().as_ref() == b"bundle" => break,
            Event::Eof => {
                return Err(malformed(reader, "unexpected end of document".to_string()));
            }
            _ => return Err(malformed(reader, "expected bundle location text".to_string())),
        }
    }

    if location.is_empty() {
        return Err(malformed(reader, "<bundle> element has no location text".to_string()));
    }

    Ok(FeatureBundle {
        location,
        start_level,
        start,
    })
}

/// Selection and filtering options for a conversion run
#[derive(Debug, Clone, Default)]
pub struct ConversionOptions {
    /// Exact feature set; every named feature must be found
    pub features: Vec<String>,
    /// Feature names to include (ignored when `features` is used)
    pub include_features: Vec<String>,
    /// Feature names to exclude (ignored when `features` is used)
    pub exclude_features: Vec<String>,
    /// Bundle include patterns (compact colon form with wildcards)
    pub include_bundles: Vec<String>,
    /// Bundle exclude patterns
    pub exclude_bundles: Vec<String>,
    /// Start level for bundles that declare none
    pub default_start_level: u32,
}

/// Converts feature files into a flat bundle directory
pub struct FeatureConverter<'a> {
    resolver: &'a CoordinateResolver<'a>,
    output_dir: PathBuf,
    bundle_filter: ArtifactFilter,
    /// `Some` when an exact feature set was requested; names are removed
    /// as they are seen
    wanted: Option<HashSet<String>>,
    include_features: Vec<String>,
    exclude_features: Vec<String>,
    default_start_level: u32,
    accumulated: BTreeMap<u32, Vec<ManifestEntry>>,
    processed: HashSet<String>,
}

impl<'a> FeatureConverter<'a> {
    /// Create a converter writing into `output_dir`
    #[must_use]
    pub fn new(
        resolver: &'a CoordinateResolver<'a>,
        output_dir: PathBuf,
        options: ConversionOptions,
    ) -> Self {
        let wanted = if options.features.is_empty() {
            None
        } else {
            Some(options.features.iter().cloned().collect())
        };
        Self {
            resolver,
            output_dir,
            bundle_filter: ArtifactFilter::new(&options.include_bundles, &options.exclude_bundles),
            wanted,
            include_features: options.include_features,
            exclude_features: options.exclude_features,
            default_start_level: options.default_start_level,
            accumulated: BTreeMap::new(),
            processed: HashSet::new(),
        }
    }

    /// Process every feature file, then write the manifest
    pub fn convert(mut self, feature_files: &[PathBuf]) -> Result<PathBuf, BundlepackError> {
        for file in feature_files {
            let document = FeaturesDocument::read(file)?;
            for feature in &document.features {
                if self.accept_feature(&feature.name) {
                    info!("Including feature {}", feature.name);
                    for bundle in &feature.bundles {
                        self.process_bundle(bundle)?;
                    }
                } else {
                    info!("Excluding feature {}", feature.name);
                }
            }
        }

        if let Some(wanted) = &self.wanted {
            if !wanted.is_empty() {
                for name in wanted {
                    error!("Feature not found: {name}");
                }
                let mut names: Vec<&str> = wanted.iter().map(String::as_str).collect();
                names.sort_unstable();
                return Err(BundlepackError::FeaturesNotFound {
                    names: names.join(", "),
                });
            }
        }

        let path = self.output_dir.join(MANIFEST_FILE_NAME);
        crate::bundles::writer::write_manifest(
            &path,
            self.accumulated
                .iter()
                .map(|(level, entries)| (*level, entries.as_slice())),
        )?;
        Ok(path)
    }

    /// Decide whether a feature participates; also notes which requested
    /// features have been seen
    fn accept_feature(&mut self, name: &str) -> bool {
        if let Some(wanted) = &mut self.wanted {
            return wanted.remove(name);
        }

        // include/exclude are not consulted when an exact set is requested
        if !self.include_features.is_empty()
            && !self.include_features.iter().any(|f| f == name)
        {
            return false;
        }
        if !self.exclude_features.is_empty() {
            return !self.exclude_features.iter().any(|f| f == name);
        }
        true
    }

    fn process_bundle(&mut self, bundle: &FeatureBundle) -> Result<(), BundlepackError> {
        if !bundle.location.starts_with("mvn:") {
            warn!("Non-mvn: bundle skipped: {}", bundle.location);
            return Ok(());
        }

        let coordinate = ArtifactCoordinate::parse_locator(&bundle.location)?;
        if !self.bundle_filter.is_selected(&coordinate) {
            debug!("Bundle {coordinate} excluded");
            return Ok(());
        }
        debug!("Bundle {coordinate} included");

        let filename = coordinate.output_filename();
        if self.processed.contains(&filename) {
            debug!("Bundle {coordinate} duplicated");
            return Ok(());
        }

        let resolved = self.resolver.resolve_coordinate(coordinate)?;
        let destination = self.output_dir.join(&filename);
        info!(
            "Copying {} to {}",
            resolved.file.display(),
            destination.display()
        );
        copy_file(&resolved.file, &destination)?;

        let level = if bundle.start_level == 0 {
            self.default_start_level
        } else {
            bundle.start_level
        };
        self.accumulated.entry(level).or_default().push(ManifestEntry {
            filename: filename.clone(),
            start: bundle.start,
        });
        self.processed.insert(filename);
        Ok(())
    }
}
