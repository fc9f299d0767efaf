//! Project configuration (`bundlepack.toml`)
//!
//! The configuration file carries the build context that surrounds an
//! aggregation run: interpolation properties, the build's own pinned
//! dependency set, artifacts produced by the in-progress build (the
//! "reactor"), and the local repository location.
//!
//! # Format
//!
//! ```toml
//! [project]
//! version = "1.2.3"                # exposed as ${project.version}
//!
//! [properties]
//! "camel.version" = "2.16.1"
//!
//! [repository]
//! local = "~/.m2/repository"
//!
//! [[dependencies]]
//! group = "commons-io"
//! artifact = "commons-io"
//! version = "2.4"
//!
//! [[reactor]]
//! group = "com.example"
//! artifact = "example-bundle"
//! version = "1.2.3"
//! path = "target/example-bundle-1.2.3.jar"
//! ```
//!
//! Every section is optional; a missing file behaves like an empty one so
//! that simple runs need no configuration at all.

use crate::artifact::ArtifactCoordinate;
use crate::core::BundlepackError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "bundlepack.toml";

/// Top-level project configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Project identity, currently only the version
    #[serde(default)]
    pub project: ProjectSection,

    /// Free-form build properties available to `${...}` interpolation
    #[serde(default)]
    pub properties: BTreeMap<String, String>,

    /// Repository locations
    #[serde(default)]
    pub repository: RepositorySection,

    /// The build's own pinned dependency set, consulted for the
    /// `-dependency-` version sentinel
    #[serde(default)]
    pub dependencies: Vec<PinnedDependency>,

    /// Artifacts already produced by the in-progress build, consulted
    /// before the local repository
    #[serde(default)]
    pub reactor: Vec<ReactorArtifact>,
}

/// `[project]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectSection {
    /// Project version, exposed as `${project.version}`
    #[serde(default)]
    pub version: Option<String>,
}

/// `[repository]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepositorySection {
    /// Maven-layout local repository root; defaults to `~/.m2/repository`
    #[serde(default)]
    pub local: Option<String>,
}

/// One `[[dependencies]]` entry: a (group, artifact) pair pinned to a version
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PinnedDependency {
    /// Group id
    pub group: String,
    /// Artifact id
    pub artifact: String,
    /// Pinned version
    pub version: String,
}

/// One `[[reactor]]` entry: a coordinate plus the file the build produced
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReactorArtifact {
    /// Group id
    pub group: String,
    /// Artifact id
    pub artifact: String,
    /// Version
    pub version: String,
    /// Classifier, empty when none
    #[serde(default)]
    pub classifier: String,
    /// Packaging type
    #[serde(default = "default_packaging")]
    pub packaging: String,
    /// Path of the produced file, relative to the configuration file
    pub path: PathBuf,
}

fn default_packaging() -> String {
    "jar".to_string()
}

impl ReactorArtifact {
    /// The coordinate this reactor entry provides
    #[must_use]
    pub fn coordinate(&self) -> ArtifactCoordinate {
        ArtifactCoordinate {
            group: self.group.clone(),
            artifact: self.artifact.clone(),
            packaging: self.packaging.clone(),
            classifier: self.classifier.clone(),
            version: self.version.clone(),
        }
    }
}

impl ProjectConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("unable to read {}", path.display()))?;

        let mut config: Self = toml::from_str(&content)
            .map_err(|e| BundlepackError::Config {
                message: format!("invalid {}: {}", path.display(), e),
            })
            .with_context(|| format!("failed to parse configuration file {}", path.display()))?;

        // Anchor relative reactor paths at the configuration file's directory
        if let Some(dir) = path.parent() {
            for entry in &mut config.reactor {
                if entry.path.is_relative() {
                    entry.path = dir.join(&entry.path);
                }
            }
        }

        Ok(config)
    }

    /// Load `bundlepack.toml` from `dir` if present, else an empty config
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Look up the pinned version for a (group, artifact) pair
    #[must_use]
    pub fn pinned_version(&self, group: &str, artifact: &str) -> Option<&str> {
        self.dependencies
            .iter()
            .find(|d| d.group == group && d.artifact == artifact)
            .map(|d| d.version.as_str())
    }

    /// The local repository root, honoring `~` expansion
    ///
    /// Falls back to `~/.m2/repository` when unconfigured, matching the
    /// conventional Maven layout.
    #[must_use]
    pub fn local_repository(&self) -> PathBuf {
        match &self.repository.local {
            Some(raw) => PathBuf::from(shellexpand::tilde(raw).into_owned()),
            None => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".m2")
                .join("repository"),
        }
    }

    /// The interpolation property map: build properties plus
    /// `project.version`
    ///
    /// The process environment is consulted separately, after this map
    /// misses.
    #[must_use]
    pub fn interpolation_properties(&self) -> BTreeMap<String, String> {
        let mut props = self.properties.clone();
        if let Some(version) = &self.project.version {
            props.insert("project.version".to_string(), version.clone());
        }
        props
    }
}
