//! File system operations with atomic writes and safe copying
//!
//! Every helper keeps file handles scoped so they close on all exit paths,
//! including errors; an aggregation run over many input documents must not
//! leak descriptors.

use crate::core::BundlepackError;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Ensure a directory exists, creating parents as needed
///
/// Fails if the path exists but is not a directory.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    } else if !path.is_dir() {
        return Err(anyhow::anyhow!(
            "path exists but is not a directory: {}",
            path.display()
        ));
    }
    Ok(())
}

/// Copy an artifact binary to a destination path
///
/// Refuses directory sources: a directory in place of a jar means the
/// producing module has not been packaged yet.
pub fn copy_file(from: &Path, to: &Path) -> Result<(), BundlepackError> {
    if from.is_dir() {
        return Err(BundlepackError::ArtifactNotPackaged {
            path: from.display().to_string(),
        });
    }

    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|source| BundlepackError::FileCopy {
            from: from.display().to_string(),
            to: to.display().to_string(),
            source,
        })?;
    }

    fs::copy(from, to).map_err(|source| BundlepackError::FileCopy {
        from: from.display().to_string(),
        to: to.display().to_string(),
        source,
    })?;

    Ok(())
}

/// Atomically write bytes to a file using a write-then-rename strategy
///
/// The content lands in a `.tmp` sibling first and is renamed into place
/// only after a successful sync, so readers never observe a partially
/// written file and a failed run leaves no half-manifest behind.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let temp_path = path.with_extension("tmp");

    {
        let mut file = fs::File::create(&temp_path)
            .with_context(|| format!("failed to create temp file: {}", temp_path.display()))?;

        file.write_all(content)
            .with_context(|| format!("failed to write to temp file: {}", temp_path.display()))?;

        file.sync_all().context("failed to sync file to disk")?;
    }

    fs::rename(&temp_path, path)
        .with_context(|| format!("failed to rename temp file to: {}", path.display()))?;

    Ok(())
}
