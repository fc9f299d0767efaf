//! Bundle aggregation and start-level conflict resolution
//!
//! This is the algorithmic core of the tool. A [`BundleAggregator`] owns
//! two indices for the duration of one aggregation run:
//!
//! - identity string → [`BundleSpec`], the canonical record per unique
//!   artifact
//! - level → ordered identity keys, the grouping the output manifest is
//!   written from
//!
//! Bundles arrive one at a time, already resolved and in document order.
//! The rules:
//!
//! - the dedup key is the coordinate identity
//!   `group:artifact:classifier:version`, not the raw locator
//! - an artifact's effective level is the minimum of every level it was
//!   declared at; a relocation moves the existing record (an index update,
//!   the spec itself is reused) to the end of the lower level's bucket
//! - the start flag is fixed at first sight and never changed by later
//!   duplicate sightings, whichever level wins
//! - each unique artifact's binary is copied to the output directory
//!   exactly once, on first sight, as `group-artifact-version.jar`
//! - a fragment bundle is never start-eligible, regardless of declared
//!   intent; classification happens once, on the copied binary
//! - re-declaration at a level that is not lower than the recorded one is
//!   a true no-op

use crate::bundles::writer::ManifestEntry;
use crate::core::BundlepackError;
use crate::osgi;
use crate::resolver::ResolvedArtifact;
use crate::utils::fs::copy_file;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::info;

/// The canonical record for one unique artifact in the output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleSpec {
    /// Dedup identity: `group:artifact:classifier:version`
    pub identity: String,
    /// Effective start level
    pub level: u32,
    /// Whether the container should start this bundle
    pub start: bool,
    /// Output filename of the copied binary
    pub filename: String,
}

/// Accumulates resolved bundles across all input documents of one run
///
/// Owns the identity and level indices exclusively; all mutation goes
/// through [`insert`](Self::insert). Create one per run and drop it after
/// serialization.
#[derive(Debug)]
pub struct BundleAggregator {
    output_dir: PathBuf,
    specs: HashMap<String, BundleSpec>,
    levels: BTreeMap<u32, Vec<String>>,
}

impl BundleAggregator {
    /// Create an aggregator that materializes binaries under `output_dir`
    #[must_use]
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            specs: HashMap::new(),
            levels: BTreeMap::new(),
        }
    }

    /// Number of unique artifacts seen so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether no bundle has been aggregated yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Feed one resolved bundle declared at `level` into the run
    ///
    /// On first sight of an identity this copies the binary and classifies
    /// it; duplicate sightings only ever update the level index.
    pub fn insert(
        &mut self,
        level: u32,
        declared_start: bool,
        artifact: &ResolvedArtifact,
    ) -> Result<(), BundlepackError> {
        let identity = artifact.coordinate.identity();

        if let Some(prior_level) = self.specs.get(&identity).map(|spec| spec.level) {
            let effective = prior_level.min(level);
            if effective != prior_level {
                info!("Multiple levels for {identity}; choosing {effective}");
                self.relocate(&identity, prior_level, effective);
            }
            return Ok(());
        }

        let filename = artifact.coordinate.output_filename();
        let destination = self.output_dir.join(&filename);
        info!(
            "Copying {} to {}",
            artifact.file.display(),
            destination.display()
        );
        copy_file(&artifact.file, &destination)?;

        let start = declared_start && !osgi::is_fragment(&destination)?;

        self.specs.insert(
            identity.clone(),
            BundleSpec {
                identity: identity.clone(),
                level,
                start,
                filename,
            },
        );
        self.levels.entry(level).or_default().push(identity);
        Ok(())
    }

    /// Move an identity from its old level bucket to the end of the new one
    fn relocate(&mut self, identity: &str, from: u32, to: u32) {
        if let Some(bucket) = self.levels.get_mut(&from) {
            bucket.retain(|key| key != identity);
            if bucket.is_empty() {
                self.levels.remove(&from);
            }
        }
        if let Some(spec) = self.specs.get_mut(identity) {
            spec.level = to;
        }
        self.levels.entry(to).or_default().push(identity.to_string());
    }

    /// Look up the current record for an identity
    #[must_use]
    pub fn spec(&self, identity: &str) -> Option<&BundleSpec> {
        self.specs.get(identity)
    }

    /// The finished level → entries view, levels ascending, in-bucket
    /// order preserved
    #[must_use]
    pub fn manifest_view(&self) -> Vec<(u32, Vec<ManifestEntry>)> {
        self.levels
            .iter()
            .map(|(level, identities)| {
                let entries = identities
                    .iter()
                    .filter_map(|identity| self.specs.get(identity))
                    .map(|spec| ManifestEntry {
                        filename: spec.filename.clone(),
                        start: spec.start,
                    })
                    .collect();
                (*level, entries)
            })
            .collect()
    }

    /// Write the consolidated manifest to `dir/bundles.xml`
    pub fn write_manifest(&self, dir: &Path) -> Result<PathBuf, BundlepackError> {
        let path = dir.join(crate::bundles::writer::MANIFEST_FILE_NAME);
        let view = self.manifest_view();
        crate::bundles::writer::write_manifest(
            &path,
            view.iter().map(|(level, entries)| (*level, entries.as_slice())),
        )?;
        Ok(path)
    }
}
