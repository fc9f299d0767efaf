//! Convert Karaf features.xml files into a flat bundle directory.
//!
//! Reads one or more feature files, selects features by name, filters
//! bundles by coordinate patterns, downloads nothing (resolution is local),
//! and writes the jars plus a `bundles.xml` organized by start level.
//!
//! ```bash
//! # Everything in the file
//! bundlepack features features.xml
//!
//! # Exactly these features; it is an error if one is missing
//! bundlepack features features.xml --feature core --feature http
//!
//! # Name and coordinate filtering
//! bundlepack features features.xml \
//!     --exclude-feature legacy \
//!     --exclude-bundle 'com.example:*-demo'
//! ```

use crate::config::ProjectConfig;
use crate::features::{ConversionOptions, FeatureConverter};
use crate::resolver::{CoordinateResolver, LocalRepositoryResolver};
use crate::utils::fs::ensure_dir;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

/// Command to convert Karaf feature files
#[derive(Args, Debug)]
pub struct FeaturesCommand {
    /// features.xml files, processed in order
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Directory receiving the copied jars and the bundles.xml manifest
    #[arg(short, long, default_value = "target/bundles")]
    output_dir: PathBuf,

    /// Project configuration file (defaults to ./bundlepack.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Select exactly this feature (repeatable); all named features must
    /// be found
    #[arg(long = "feature", value_name = "NAME")]
    features: Vec<String>,

    /// Include features by name (ignored when --feature is used)
    #[arg(long = "include-feature", value_name = "NAME")]
    include_features: Vec<String>,

    /// Exclude features by name (ignored when --feature is used)
    #[arg(long = "exclude-feature", value_name = "NAME")]
    exclude_features: Vec<String>,

    /// Include bundles by group:artifact:type:classifier:version patterns
    #[arg(long = "include-bundle", value_name = "PATTERN")]
    include_bundles: Vec<String>,

    /// Exclude bundles by group:artifact:type:classifier:version patterns
    #[arg(long = "exclude-bundle", value_name = "PATTERN")]
    exclude_bundles: Vec<String>,

    /// Start level for bundles that declare none
    #[arg(long, default_value_t = 70)]
    default_start_level: u32,

    /// Local repository root (overrides the configuration file)
    #[arg(long, value_name = "DIR")]
    local_repository: Option<PathBuf>,
}

impl FeaturesCommand {
    /// Run the conversion over all feature files
    pub fn execute(self) -> Result<()> {
        let config = match &self.config {
            Some(path) => ProjectConfig::load(path)?,
            None => ProjectConfig::load_or_default(&std::env::current_dir()?)?,
        };

        ensure_dir(&self.output_dir)?;

        let repository = match &self.local_repository {
            Some(root) => LocalRepositoryResolver::new(root.clone()),
            None => LocalRepositoryResolver::new(config.local_repository()),
        };
        let resolver = CoordinateResolver::new(&config, &repository);

        let converter = FeatureConverter::new(
            &resolver,
            self.output_dir.clone(),
            ConversionOptions {
                features: self.features,
                include_features: self.include_features,
                exclude_features: self.exclude_features,
                include_bundles: self.include_bundles,
                exclude_bundles: self.exclude_bundles,
                default_start_level: self.default_start_level,
            },
        );
        let manifest = converter.convert(&self.files)?;

        println!(
            "{} features into {}",
            "Converted".green().bold(),
            manifest.display()
        );
        Ok(())
    }
}
