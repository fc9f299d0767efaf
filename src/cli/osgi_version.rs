//! Transform a Maven version into a valid OSGi version.
//!
//! Prints the transformed version on stdout, suitable for command
//! substitution in build scripts:
//!
//! ```bash
//! bundlepack osgi-version 1.2.3-SNAPSHOT
//! # 1.2.3.v20260808120000
//!
//! # Use the version from bundlepack.toml
//! bundlepack osgi-version
//! ```

use crate::config::ProjectConfig;
use crate::core::BundlepackError;
use crate::version::osgi_version;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

/// Command to compute an OSGi version string
#[derive(Args, Debug)]
pub struct OsgiVersionCommand {
    /// Maven version to transform; defaults to the [project] version from
    /// the configuration file
    #[arg(value_name = "VERSION")]
    version: Option<String>,

    /// Project configuration file (defaults to ./bundlepack.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Always attach a timestamp qualifier, not only for snapshots
    #[arg(long)]
    timestamp_qualifier: bool,
}

impl OsgiVersionCommand {
    /// Compute and print the OSGi version
    pub fn execute(self) -> Result<()> {
        let version = match self.version {
            Some(version) => version,
            None => {
                let config = match &self.config {
                    Some(path) => ProjectConfig::load(path)?,
                    None => ProjectConfig::load_or_default(&std::env::current_dir()?)?,
                };
                config
                    .project
                    .version
                    .ok_or_else(|| BundlepackError::Config {
                        message: "no version argument given and no [project] version configured"
                            .to_string(),
                    })?
            }
        };

        let transformed =
            osgi_version(&version, self.timestamp_qualifier).context("cannot transform version")?;
        println!("{transformed}");
        Ok(())
    }
}
