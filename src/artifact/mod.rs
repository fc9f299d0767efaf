//! Artifact coordinates, identity strings, and locator parsing
//!
//! Everything in the pipeline that names a binary goes through
//! [`ArtifactCoordinate`]: a (group, artifact, packaging, classifier,
//! version) tuple with every absent field normalized to the empty string,
//! never an `Option`. Coordinates come from three textual shapes:
//!
//! - slash GAV locators in bundle lists: `group/artifact/version` or
//!   `group/artifact/classifier/version`
//! - `mvn:` URIs in Karaf feature files:
//!   `mvn:group/artifact/version[/type[/classifier]]`
//! - compact colon identities with wildcard defaults, used only for
//!   include/exclude patterns: `group[:artifact[:type[:classifier[:version]]]]`
//!
//! The deduplication key for the whole aggregation run is
//! [`ArtifactCoordinate::identity`]: `group:artifact:classifier:version`,
//! with an empty classifier slot when there is none.

use crate::core::BundlepackError;
use std::fmt;

/// A fully-qualified artifact coordinate
///
/// Equality is field-wise. Absent fields are empty strings so that identity
/// and matching never have to reason about `None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactCoordinate {
    /// Group id, e.g. `com.google.guava`
    pub group: String,
    /// Artifact id, e.g. `guava`
    pub artifact: String,
    /// Packaging type; always `jar` for bundles
    pub packaging: String,
    /// Classifier, empty when none
    pub classifier: String,
    /// Exact version string
    pub version: String,
}

impl ArtifactCoordinate {
    /// Create a jar coordinate, the only packaging bundles use
    pub fn jar(
        group: impl Into<String>,
        artifact: impl Into<String>,
        classifier: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
            packaging: "jar".to_string(),
            classifier: classifier.into(),
            version: version.into(),
        }
    }

    /// The deduplication identity: `group:artifact:classifier:version`
    ///
    /// The classifier slot is present but empty when the artifact has no
    /// classifier, so identities always have exactly four fields.
    #[must_use]
    pub fn identity(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.group, self.artifact, self.classifier, self.version
        )
    }

    /// Deterministic output filename: `group-artifact-version.jar`
    #[must_use]
    pub fn output_filename(&self) -> String {
        format!("{}-{}-{}.jar", self.group, self.artifact, self.version)
    }

    /// Parse a bundle locator into a coordinate
    ///
    /// Accepts the slash GAV forms and `mvn:` URIs. The locator must already
    /// be interpolated; unresolved `${...}` placeholders will simply fail to
    /// resolve later.
    pub fn parse_locator(locator: &str) -> Result<Self, BundlepackError> {
        if let Some(rest) = locator.strip_prefix("mvn:") {
            Self::parse_mvn(locator, rest)
        } else {
            Self::parse_slash(locator)
        }
    }

    /// `group/artifact/version` or `group/artifact/classifier/version`
    fn parse_slash(locator: &str) -> Result<Self, BundlepackError> {
        let pieces: Vec<&str> = locator.split('/').collect();
        match pieces.as_slice() {
            [group, artifact, version] => Ok(Self::jar(*group, *artifact, "", *version)),
            [group, artifact, classifier, version] => {
                Ok(Self::jar(*group, *artifact, *classifier, *version))
            }
            _ => Err(BundlepackError::InvalidLocator {
                locator: locator.to_string(),
                reason: format!(
                    "expected 3 or 4 '/'-separated segments, found {}",
                    pieces.len()
                ),
            }),
        }
    }

    /// `mvn:group/artifact/version[/type[/classifier]]`
    ///
    /// Only `jar` is accepted as a type; features pointing at wars or
    /// wrapped artifacts are not bundles this tool can place.
    fn parse_mvn(locator: &str, rest: &str) -> Result<Self, BundlepackError> {
        let pieces: Vec<&str> = rest.split('/').collect();
        if pieces.len() < 3 {
            return Err(BundlepackError::InvalidLocator {
                locator: locator.to_string(),
                reason: "mvn: URI needs at least group/artifact/version".to_string(),
            });
        }
        if pieces.len() >= 4 && pieces[3] != "jar" {
            return Err(BundlepackError::InvalidLocator {
                locator: locator.to_string(),
                reason: format!("non-jar 'bundle' type {}", pieces[3]),
            });
        }
        let classifier = if pieces.len() >= 5 { pieces[4] } else { "" };
        Ok(Self::jar(pieces[0], pieces[1], classifier, pieces[2]))
    }
}

impl fmt::Display for ArtifactCoordinate {
    /// Maven-style id: `group:artifact:packaging[:classifier]:version`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.classifier.is_empty() {
            write!(
                f,
                "{}:{}:{}:{}",
                self.group, self.artifact, self.packaging, self.version
            )
        } else {
            write!(
                f,
                "{}:{}:{}:{}:{}",
                self.group, self.artifact, self.packaging, self.classifier, self.version
            )
        }
    }
}

/// A compact colon-delimited coordinate pattern with wildcard defaults
///
/// Used for bundle include/exclude filtering in features conversion. Absent
/// trailing segments default to `*`; a 3-token pattern reads as
/// `group:artifact:classifier` with the type left wild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPattern {
    group: String,
    artifact: String,
    packaging: String,
    classifier: String,
    version: String,
}

impl ArtifactPattern {
    /// Parse a compact pattern string
    #[must_use]
    pub fn parse(id: &str) -> Self {
        let tokens: Vec<&str> = if id.is_empty() {
            Vec::new()
        } else {
            id.split(':').collect()
        };
        let get = |i: usize, absent: &str| -> String {
            tokens.get(i).copied().unwrap_or(absent).to_string()
        };
        Self {
            group: get(0, ""),
            artifact: get(1, "*"),
            packaging: if tokens.len() > 3 { get(2, "*") } else { "*".to_string() },
            classifier: if tokens.len() > 3 {
                get(3, "*")
            } else {
                get(2, "*")
            },
            version: get(4, "*"),
        }
    }

    /// Field-wise wildcard match against a concrete coordinate
    #[must_use]
    pub fn matches(&self, coordinate: &ArtifactCoordinate) -> bool {
        segment_matches(&coordinate.group, &self.group)
            && segment_matches(&coordinate.artifact, &self.artifact)
            && segment_matches(&coordinate.packaging, &self.packaging)
            && segment_matches(&coordinate.classifier, &self.classifier)
            && segment_matches(&coordinate.version, &self.version)
    }
}

/// Glob match of one coordinate field; a malformed pattern falls back to
/// literal comparison
fn segment_matches(value: &str, pattern: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    glob::Pattern::new(pattern).map_or(value == pattern, |p| p.matches(value))
}

/// Include/exclude selection over coordinates
///
/// A coordinate is selected iff it matches at least one include pattern (or
/// the include list is empty) and matches no exclude pattern.
#[derive(Debug, Clone, Default)]
pub struct ArtifactFilter {
    includes: Vec<ArtifactPattern>,
    excludes: Vec<ArtifactPattern>,
}

impl ArtifactFilter {
    /// Build a filter from raw pattern strings
    #[must_use]
    pub fn new(includes: &[String], excludes: &[String]) -> Self {
        Self {
            includes: includes.iter().map(|s| ArtifactPattern::parse(s)).collect(),
            excludes: excludes.iter().map(|s| ArtifactPattern::parse(s)).collect(),
        }
    }

    /// Whether the coordinate passes the include/exclude rules
    #[must_use]
    pub fn is_selected(&self, coordinate: &ArtifactCoordinate) -> bool {
        let included = self.includes.is_empty()
            || self.includes.iter().any(|p| p.matches(coordinate));
        included && !self.excludes.iter().any(|p| p.matches(coordinate))
    }
}
