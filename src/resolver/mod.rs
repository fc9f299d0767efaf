//! Bundle reference resolution
//!
//! Turns the raw locator text of a declared bundle into a concrete binary
//! on disk, in four steps:
//!
//! 1. interpolate `${...}` property placeholders (build properties, then
//!    `project.version`, then the process environment; unresolved
//!    placeholders stay verbatim — not an error at this layer)
//! 2. parse the interpolated locator into an [`ArtifactCoordinate`]
//! 3. resolve the `-dependency-` version sentinel against the build's
//!    pinned dependency set
//! 4. find the binary: the in-progress build's own outputs (the reactor)
//!    are consulted first, then the [`ArtifactResolver`] collaborator
//!
//! Actual binary retrieval is behind the [`ArtifactResolver`] trait; the
//! shipped implementation, [`LocalRepositoryResolver`], probes a
//! Maven-layout repository on the local disk and never touches the network.

use crate::artifact::ArtifactCoordinate;
use crate::config::ProjectConfig;
use crate::core::BundlepackError;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

/// Version sentinel meaning "use the version pinned by this build's own
/// dependency set"
pub const DEPENDENCY_VERSION: &str = "-dependency-";

/// A coordinate paired with the local binary it resolved to
///
/// Only this module constructs these; downstream stages never invent one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    /// The fully-resolved coordinate
    pub coordinate: ArtifactCoordinate,
    /// The local binary
    pub file: PathBuf,
}

/// External collaborator that turns a coordinate into a local file
pub trait ArtifactResolver {
    /// Resolve a coordinate to a local binary path
    fn resolve(&self, coordinate: &ArtifactCoordinate) -> Result<PathBuf, BundlepackError>;
}

/// Resolver backed by a Maven-layout repository on local disk
///
/// Probes `{root}/{group with '.' → '/'}/{artifact}/{version}/
/// {artifact}-{version}[-{classifier}].jar` and fails when the file is
/// absent. Fetching from remote repositories is out of scope for this
/// tool; populate the local repository with the surrounding build instead.
#[derive(Debug, Clone)]
pub struct LocalRepositoryResolver {
    root: PathBuf,
}

impl LocalRepositoryResolver {
    /// Create a resolver over the given repository root
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// The repository path a coordinate maps to
    #[must_use]
    pub fn artifact_path(&self, coordinate: &ArtifactCoordinate) -> PathBuf {
        let mut filename = format!("{}-{}", coordinate.artifact, coordinate.version);
        if !coordinate.classifier.is_empty() {
            filename.push('-');
            filename.push_str(&coordinate.classifier);
        }
        filename.push('.');
        filename.push_str(if coordinate.packaging.is_empty() {
            "jar"
        } else {
            &coordinate.packaging
        });

        self.root
            .join(coordinate.group.replace('.', "/"))
            .join(&coordinate.artifact)
            .join(&coordinate.version)
            .join(filename)
    }
}

impl ArtifactResolver for LocalRepositoryResolver {
    fn resolve(&self, coordinate: &ArtifactCoordinate) -> Result<PathBuf, BundlepackError> {
        let path = self.artifact_path(coordinate);
        if path.is_file() {
            Ok(path)
        } else {
            Err(BundlepackError::ArtifactResolution {
                coordinate: coordinate.to_string(),
                reason: format!("not found in local repository {}", self.root.display()),
            })
        }
    }
}

/// The resolver adapter: interpolation, sentinel versions, reactor-first
/// lookup, and delegation to the [`ArtifactResolver`] collaborator
pub struct CoordinateResolver<'a> {
    config: &'a ProjectConfig,
    properties: BTreeMap<String, String>,
    resolver: &'a dyn ArtifactResolver,
}

impl<'a> CoordinateResolver<'a> {
    /// Build an adapter over the project configuration and a resolver
    #[must_use]
    pub fn new(config: &'a ProjectConfig, resolver: &'a dyn ArtifactResolver) -> Self {
        Self {
            config,
            properties: config.interpolation_properties(),
            resolver,
        }
    }

    /// Interpolate `${...}` placeholders in a locator
    ///
    /// Lookup order: build properties (including `project.version`), then
    /// the process environment. Placeholders that resolve nowhere are left
    /// verbatim.
    #[must_use]
    pub fn interpolate(&self, raw: &str) -> String {
        shellexpand::env_with_context_no_errors(raw, |name: &str| -> Option<String> {
            self.properties
                .get(name)
                .cloned()
                .or_else(|| std::env::var(name).ok())
        })
        .into_owned()
    }

    /// Resolve one declared bundle reference to a concrete binary
    pub fn resolve_reference(&self, locator: &str) -> Result<ResolvedArtifact, BundlepackError> {
        let interpolated = self.interpolate(locator);
        let coordinate = ArtifactCoordinate::parse_locator(&interpolated)?;
        self.resolve_coordinate(coordinate)
    }

    /// Resolve an already-parsed coordinate, applying the version sentinel
    /// and the reactor-first rule
    pub fn resolve_coordinate(
        &self,
        mut coordinate: ArtifactCoordinate,
    ) -> Result<ResolvedArtifact, BundlepackError> {
        if coordinate.version == DEPENDENCY_VERSION {
            let pinned = self
                .config
                .pinned_version(&coordinate.group, &coordinate.artifact)
                .ok_or_else(|| BundlepackError::UnresolvedDependencyVersion {
                    group: coordinate.group.clone(),
                    artifact: coordinate.artifact.clone(),
                })?;
            debug!(
                "found dependency {}:{}:{}",
                coordinate.group, coordinate.artifact, pinned
            );
            coordinate.version = pinned.to_string();
        }

        if let Some(file) = self.from_reactor(&coordinate) {
            debug!("resolved {coordinate} from reactor: {}", file.display());
            return Ok(ResolvedArtifact { coordinate, file });
        }

        let file = self.resolver.resolve(&coordinate)?;
        Ok(ResolvedArtifact { coordinate, file })
    }

    /// Check the in-progress build's own outputs for the coordinate
    ///
    /// Matches on (group, artifact, version, type, classifier) field
    /// equality and only accepts entries whose recorded file actually
    /// exists.
    fn from_reactor(&self, coordinate: &ArtifactCoordinate) -> Option<PathBuf> {
        self.config
            .reactor
            .iter()
            .find(|entry| entry.coordinate() == *coordinate && entry.path.is_file())
            .map(|entry| entry.path.clone())
    }
}
