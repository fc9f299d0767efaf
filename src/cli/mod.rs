//! Command-line interface for bundlepack
//!
//! Each command is implemented as a separate module with its own argument
//! struct and execution logic:
//!
//! - `collect` - aggregate bundle-list XML files into a flat bundle
//!   directory plus a consolidated `bundles.xml` manifest
//! - `features` - convert Karaf `features.xml` files into the same layout
//! - `osgi-version` - transform a Maven version into a valid OSGi version
//!
//! # Usage
//!
//! ```bash
//! # Assemble a runtime directory from two bundle lists
//! bundlepack collect runtime-bundles.xml extra-bundles.xml -o target/bundles
//!
//! # Convert selected Karaf features
//! bundlepack features features.xml --feature core --feature http
//!
//! # Compute the OSGi version for the project version
//! bundlepack osgi-version 1.2.3-SNAPSHOT
//! ```
//!
//! All commands support `--verbose` for bundle-level detail and `--quiet`
//! to suppress everything but errors.

mod collect;
mod features;
mod osgi_version;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Main CLI structure for bundlepack
///
/// Global options apply to every subcommand; verbosity falls back to
/// `RUST_LOG` when neither flag is given.
#[derive(Parser)]
#[command(
    name = "bundlepack",
    about = "Assemble a flat OSGi runtime bundle directory from declarative bundle lists",
    version
)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable bundle-level debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Collect bundles declared in bundle-list XML files
    Collect(collect::CollectCommand),

    /// Convert Karaf features.xml files into a flat bundle directory
    Features(features::FeaturesCommand),

    /// Transform a Maven version into a valid OSGi version
    OsgiVersion(osgi_version::OsgiVersionCommand),
}

impl Cli {
    /// Execute the selected command
    pub fn execute(self) -> Result<()> {
        init_logging(self.verbose, self.quiet);

        match self.command {
            Commands::Collect(cmd) => cmd.execute(),
            Commands::Features(cmd) => cmd.execute(),
            Commands::OsgiVersion(cmd) => cmd.execute(),
        }
    }
}

/// Initialize tracing output on stderr from the verbosity flags
///
/// `RUST_LOG` still applies when neither flag is set.
fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // ignore double-init so tests can call execute() repeatedly
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
