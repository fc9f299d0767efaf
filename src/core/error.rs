//! Error handling for bundlepack
//!
//! The error system is built around two types:
//! - [`BundlepackError`] - strongly-typed failure cases for every stage of an
//!   aggregation run, from input parsing through manifest output
//! - [`ErrorContext`] - a wrapper that adds user-friendly suggestions and
//!   details for CLI display
//!
//! Every failure carries enough context (offending locator, coordinate, or
//! file path) to diagnose the problem without re-running with extra
//! verbosity. Nothing is silently swallowed; the only tolerated failure is a
//! resolution miss under `--skip-missing`, which is reported as a warning at
//! the call site rather than surfacing here.
//!
//! # Examples
//!
//! ```rust,no_run
//! use bundlepack::core::{BundlepackError, user_friendly_error};
//!
//! fn classify() -> Result<(), BundlepackError> {
//!     Err(BundlepackError::NotAnOsgiBundle {
//!         path: "bundles/foo-1.0.jar".to_string(),
//!         reason: "Bundle-ManifestVersion attribute is missing".to_string(),
//!     })
//! }
//!
//! if let Err(e) = classify() {
//!     user_friendly_error(anyhow::Error::from(e)).display();
//! }
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for bundlepack operations
///
/// Each variant represents a specific failure mode with enough context to
/// diagnose it. Parsing and aggregation errors are always fatal; only
/// [`ArtifactResolution`](BundlepackError::ArtifactResolution) may be
/// downgraded to a warning when skip-missing mode is enabled.
#[derive(Error, Debug)]
pub enum BundlepackError {
    /// Structural violation in an input bundle-list or features document
    ///
    /// Raised when the root element is wrong, a level attribute is missing
    /// or non-numeric, a bundle element has no text content, or the element
    /// nesting is broken. The position is a byte offset into the document.
    #[error("malformed document {file} at byte {position}: {reason}")]
    MalformedDocument {
        /// Path of the offending document
        file: String,
        /// Byte offset where the violation was detected
        position: u64,
        /// What was wrong
        reason: String,
    },

    /// A bundle locator string could not be parsed into a coordinate
    #[error("invalid bundle locator '{locator}': {reason}")]
    InvalidLocator {
        /// The (already interpolated) locator text
        locator: String,
        /// Why it does not parse
        reason: String,
    },

    /// A `-dependency-` version reference has no matching pinned dependency
    ///
    /// The bundle list asked to use "whatever version this build depends
    /// on", but the project configuration pins no version for that
    /// (group, artifact) pair. Fatal even under skip-missing: the reference
    /// itself is broken, not merely unresolvable.
    #[error("request for {group}:{artifact} as a dependency, but it is not a dependency")]
    UnresolvedDependencyVersion {
        /// Group id of the unmatched reference
        group: String,
        /// Artifact id of the unmatched reference
        artifact: String,
    },

    /// The artifact resolver could not produce a binary for a coordinate
    ///
    /// Skippable: under `--skip-missing` the single bundle is dropped with a
    /// warning and processing continues.
    #[error("unable to resolve artifact {coordinate}: {reason}")]
    ArtifactResolution {
        /// The coordinate that failed to resolve
        coordinate: String,
        /// Resolver-supplied reason
        reason: String,
    },

    /// A resolved, copied binary is not a valid OSGi bundle
    ///
    /// `Bundle-ManifestVersion` must be exactly `"2"`. The artifact was
    /// explicitly requested as a bundle, so this is a configuration error
    /// and is never skippable.
    #[error("not an OSGi bundle {path}: {reason}")]
    NotAnOsgiBundle {
        /// Path of the copied jar that failed inspection
        path: String,
        /// Which manifest check failed
        reason: String,
    },

    /// A copy source is a directory, meaning the artifact was never packaged
    #[error("artifact {path} has not been packaged yet")]
    ArtifactNotPackaged {
        /// The directory that stood in for a jar
        path: String,
    },

    /// I/O failure while materializing a binary in the output directory
    #[error("error copying artifact from {from} to {to}")]
    FileCopy {
        /// Source path
        from: String,
        /// Destination path
        to: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// I/O or serialization failure while producing the final manifest
    #[error("failed to write metadata file {path}: {reason}")]
    OutputWrite {
        /// Path of the manifest being written
        path: String,
        /// What went wrong
        reason: String,
    },

    /// Named features remained unmatched after processing all feature files
    #[error("not all features were found: {names}")]
    FeaturesNotFound {
        /// Comma-separated list of the missing feature names
        names: String,
    },

    /// Project configuration problem (bundlepack.toml)
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// A version string matches none of the supported Maven version shapes
    #[error(
        "version {version} does not match either x.y.z, x.y.z.cXX.Y(<qualifier>), or x.y.z.<qualifier>"
    )]
    UnrecognizedVersion {
        /// The version string that failed to parse
        version: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A [`BundlepackError`] (or any error) enriched for terminal display
///
/// Wraps the underlying error with an optional actionable suggestion (shown
/// in green) and details (shown in yellow). Built by [`user_friendly_error`]
/// in `main` just before exit.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error chain
    pub error: anyhow::Error,
    /// Optional actionable suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details
    #[must_use]
    pub fn new(error: anyhow::Error) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add an actionable suggestion for resolving the error
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining why the error occurred
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error, details, and suggestion to stderr with colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), format_chain(&self.error));

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_chain(&self.error))?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

/// Render an error and its cause chain as a single message
fn format_chain(error: &anyhow::Error) -> String {
    let mut message = error.to_string();

    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    message
}

/// Convert any error into a user-friendly [`ErrorContext`]
///
/// Recognizes [`BundlepackError`] variants and attaches tailored suggestions;
/// everything else gets the full error chain with no extra decoration.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let (suggestion, details): (Option<&str>, Option<&str>) = match error
        .downcast_ref::<BundlepackError>()
    {
        Some(BundlepackError::MalformedDocument { .. }) => (
            Some("Check the document against the expected <bundles><level level=\"N\"><bundle>...</bundle></level></bundles> shape"),
            Some("Every <level> needs an integer 'level' attribute and every <bundle> needs text content"),
        ),
        Some(BundlepackError::InvalidLocator { .. }) => (
            Some("Locators are group/artifact/version, group/artifact/classifier/version, or mvn: URIs"),
            None,
        ),
        Some(BundlepackError::UnresolvedDependencyVersion { .. }) => (
            Some("Add a [[dependencies]] entry for this group/artifact to bundlepack.toml, or pin an explicit version in the bundle list"),
            None,
        ),
        Some(BundlepackError::ArtifactResolution { .. }) => (
            Some("Check the coordinate, the [[reactor]] entries, and the local repository path; --skip-missing drops unresolvable bundles instead of failing"),
            None,
        ),
        Some(BundlepackError::NotAnOsgiBundle { .. }) => (
            Some("The artifact was requested as a bundle but is a plain jar; remove it from the bundle list or use an OSGi-packaged variant"),
            Some("'2' is the only legitimate Bundle-ManifestVersion; no value at all means the jar is not an OSGi bundle"),
        ),
        Some(BundlepackError::ArtifactNotPackaged { .. }) => (
            Some("Build the producing module first so its jar exists before collecting bundles"),
            None,
        ),
        Some(BundlepackError::Config { .. }) => (
            Some("Check bundlepack.toml syntax and field names"),
            None,
        ),
        _ => (None, None),
    };

    let mut ctx = ErrorContext::new(error);
    if let Some(s) = suggestion {
        ctx = ctx.with_suggestion(s);
    }
    if let Some(d) = details {
        ctx = ctx.with_details(d);
    }
    ctx
}
