//! Copying static assets into the output directory.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::builder::BuildError;

/// Copy `from` into `dest`.
///
/// Directories are copied recursively, keeping their layout; a single file is
/// copied into `dest` under its own name. A missing source copies nothing.
/// Returns the number of files copied.
pub fn copy_into(from: &Path, dest: &Path) -> Result<usize, BuildError> {
    if !from.exists() {
        tracing::warn!("Copy source not found: {}", from.display());
        return Ok(0);
    }

    if from.is_file() {
        let Some(name) = from.file_name() else {
            return Ok(0);
        };
        copy_file(from, &dest.join(name))?;
        return Ok(1);
    }

    let mut copied = 0;

    for entry in WalkDir::new(from).follow_links(true) {
        let entry = entry.map_err(|e| BuildError::ReadError(e.to_string()))?;

        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(from).unwrap_or(entry.path());
        copy_file(entry.path(), &dest.join(relative))?;
        copied += 1;
    }

    tracing::debug!("Copied {} files from {}", copied, from.display());

    Ok(copied)
}

fn copy_file(source: &Path, target: &Path) -> Result<(), BuildError> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
    }

    fs::copy(source, target)
        .map_err(|e| BuildError::WriteError(format!("{}: {}", target.display(), e)))?;

    Ok(())
}
