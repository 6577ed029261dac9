// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-then-rename file replacement

use crate::StorageError;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Replace `path` with `contents`, creating parent directories as needed
///
/// Each call stages into its own hidden sibling, so concurrent writers never
/// share a temp file and the last rename wins.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StorageError> {
    let write_err = |source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            std::fs::create_dir_all(parent).map_err(write_err)?;
            parent
        }
        None => Path::new("."),
    };
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut temp = staging_file(parent, &name).map_err(write_err)?;
    temp.write_all(contents).map_err(write_err)?;
    temp.as_file().sync_all().map_err(write_err)?;

    // Dropping the rejected temp file removes it
    temp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

fn staging_file(dir: &Path, name: &str) -> std::io::Result<NamedTempFile> {
    tempfile::Builder::new()
        .prefix(&format!(".{}.", name))
        .suffix(".tmp")
        .tempfile_in(dir)
}

#[cfg(test)]
#[path = "atomic_tests.rs"]
mod tests;
