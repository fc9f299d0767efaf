//! Collect bundles declared in XML bundle lists into a flat directory.
//!
//! This is the core command: read one or more bundle-list documents, resolve
//! every declared bundle to a concrete jar, deduplicate artifacts that
//! appear more than once (possibly at different start levels), copy each
//! unique jar into the output directory, and write a consolidated
//! `bundles.xml` describing the result.
//!
//! Input files look like:
//!
//! ```xml
//! <?xml version='1.0' encoding='utf-8'?>
//! <bundles>
//!   <level level="1">
//!     <bundle>commons-io/commons-io/-dependency-</bundle>
//!     <bundle>com.google.inject.extensions/guice-throwingproviders/4.0</bundle>
//!   </level>
//!   <level level="2">
//!     <bundle noStart="true">com.example/support/${project.version}</bundle>
//!   </level>
//! </bundles>
//! ```
//!
//! If a bundle is a fragment, the command notices and arranges *not* to
//! start it at runtime. To avoid starting some bundle that is not a
//! fragment, add `noStart='true'` to its `<bundle/>` element (or use the
//! legacy `start` attribute with `--format legacy`).

use crate::aggregate::BundleAggregator;
use crate::bundles::{BundlesDocument, ListFormat};
use crate::config::ProjectConfig;
use crate::core::BundlepackError;
use crate::resolver::{CoordinateResolver, LocalRepositoryResolver};
use crate::utils::fs::ensure_dir;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Command to collect bundles from bundle-list documents
#[derive(Args, Debug)]
pub struct CollectCommand {
    /// Bundle-list XML files, processed in order
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Directory receiving the copied jars and the bundles.xml manifest
    #[arg(short, long, default_value = "target/bundles")]
    output_dir: PathBuf,

    /// Project configuration file (defaults to ./bundlepack.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Which start-attribute schema the input documents use
    #[arg(long, value_enum, default_value_t = ListFormat::Current)]
    format: ListFormat,

    /// Drop bundles whose artifacts cannot be resolved instead of failing
    #[arg(long)]
    skip_missing: bool,

    /// Local repository root (overrides the configuration file)
    #[arg(long, value_name = "DIR")]
    local_repository: Option<PathBuf>,
}

impl CollectCommand {
    /// Run the aggregation pipeline over all input files
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
        let mut aggregator = BundleAggregator::new(self.output_dir.clone());

        for file in &self.files {
            let document = BundlesDocument::read(file, self.format)
                .with_context(|| format!("unable to read {}", file.display()))?;

            for level_bundles in &document.levels {
                for bundle in &level_bundles.bundles {
                    let resolved = match resolver.resolve_reference(&bundle.locator) {
                        Ok(resolved) => resolved,
                        Err(e @ BundlepackError::ArtifactResolution { .. }) if self.skip_missing => {
                            warn!("Skipping missing artifact: {e}");
                            continue;
                        }
                        Err(e) => {
                            return Err(anyhow::Error::from(e)).with_context(|| {
                                format!(
                                    "failed to resolve bundle '{}' from {}",
                                    bundle.locator,
                                    file.display()
                                )
                            });
                        }
                    };

                    debug!("Bundle {} included", resolved.coordinate);
                    aggregator
                        .insert(level_bundles.level, bundle.start, &resolved)
                        .with_context(|| {
                            format!(
                                "failed to aggregate bundle '{}' from {}",
                                bundle.locator,
                                file.display()
                            )
                        })?;
                }
            }
        }

        let unique = aggregator.len();
        aggregator.write_manifest(&self.output_dir)?;

        println!(
            "{} {} unique bundle{} into {}",
            "Collected".green().bold(),
            unique,
            if unique == 1 { "" } else { "s" },
            self.output_dir.display()
        );
        Ok(())
    }
}
