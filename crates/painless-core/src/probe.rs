//! Filesystem probes.
//!
//! Existence checks decide create-vs-reuse and clone-vs-skip everywhere in
//! painless, so they report "absent" separately from "could not tell": a
//! permission error surfaces as [`CoreError::Io`] instead of reading as
//! "missing".

use std::io::ErrorKind;
use std::path::Path;

use crate::error::{CoreError, Result};

/// Check whether anything exists at `path`.
pub fn exists(path: &Path) -> Result<bool> {
    match std::fs::metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(CoreError::io(path, e)),
    }
}

/// Create `path` and any missing parents.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if exists(path)? {
        return Ok(());
    }
    std::fs::create_dir_all(path).map_err(|e| CoreError::io(path, e))
}

/// Remove a directory tree. Returns `false` if nothing was there.
pub fn remove_dir(path: &Path) -> Result<bool> {
    if !exists(path)? {
        return Ok(false);
    }
    std::fs::remove_dir_all(path).map_err(|e| CoreError::io(path, e))?;
    Ok(true)
}

/// Remove a single file. Returns `false` if nothing was there.
pub fn remove_file(path: &Path) -> Result<bool> {
    if !exists(path)? {
        return Ok(false);
    }
    std::fs::remove_file(path).map_err(|e| CoreError::io(path, e))?;
    Ok(true)
}

/// Read a text file, mapping a missing file to [`CoreError::NotFound`].
pub fn read_to_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            CoreError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            CoreError::io(path, e)
        }
    })
}

/// Write a text file, replacing any existing contents.
pub fn write(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|e| CoreError::io(path, e))
}
