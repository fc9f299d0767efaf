//! bundlepack CLI entry point
//!
//! Handles command-line argument parsing, error display, and command
//! execution. The commands:
//! - `collect` - aggregate bundle-list XML files into a flat bundle
//!   directory
//! - `features` - convert Karaf features.xml files into the same layout
//! - `osgi-version` - transform a Maven version into an OSGi version

use anyhow::Result;
use bundlepack::cli;
use bundlepack::core::user_friendly_error;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    match cli.execute() {
        Ok(()) => Ok(()),
        Err(e) => {
            // convert to a user-friendly error with context and suggestions
            user_friendly_error(e).display();
            std::process::exit(1);
        }
    }
}
