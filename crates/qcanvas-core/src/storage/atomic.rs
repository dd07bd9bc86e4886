//! Crash-safe file replacement
//!
//! Contents are written to a sibling temp file (`<name><suffix>`), flushed to
//! disk, and then renamed over the target. The rename is the only step that
//! touches the target, so a reader or a crash can observe either the old
//! document or the new one, never a mix.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Default suffix for the temp sibling
pub const DEFAULT_TEMP_SUFFIX: &str = ".tmp";

/// Writes files through a temp sibling and an atomic rename
#[derive(Debug, Clone)]
pub struct AtomicWriter {
    temp_suffix: String,
}

impl Default for AtomicWriter {
    fn default() -> Self {
        Self::new(DEFAULT_TEMP_SUFFIX)
    }
}

impl AtomicWriter {
    pub fn new(temp_suffix: impl Into<String>) -> Self {
        Self {
            temp_suffix: temp_suffix.into(),
        }
    }

    /// Path of the temp sibling used for `path`
    pub fn temp_path(&self, path: &Path) -> Result<PathBuf> {
        let name = path
            .file_name()
            .ok_or_else(|| Error::invalid_target(path, "path has no file name"))?;

        let mut temp_name = OsString::from(name);
        temp_name.push(&self.temp_suffix);
        Ok(path.with_file_name(temp_name))
    }

    /// Write `contents` to the temp sibling of `path` without touching `path`
    pub fn stage(&self, path: &Path, contents: &str) -> Result<StagedWrite> {
        let temp = self.temp_path(path)?;

        if let Err(e) = write_synced(&temp, contents) {
            let _ = fs::remove_file(&temp);
            return Err(Error::persistence(path, e));
        }

        debug!(temp = %temp.display(), bytes = contents.len(), "Staged canvas write");

        Ok(StagedWrite {
            target: path.to_path_buf(),
            temp,
            committed: false,
        })
    }

    /// Stage and commit in one step
    pub fn save(&self, path: &Path, contents: &str) -> Result<()> {
        self.stage(path, contents)?.commit()
    }
}

/// A fully written temp file waiting to replace its target
///
/// Dropping it without calling [`StagedWrite::commit`] removes the temp file
/// and leaves the target as it was.
#[derive(Debug)]
pub struct StagedWrite {
    target: PathBuf,
    temp: PathBuf,
    committed: bool,
}

impl StagedWrite {
    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp
    }

    /// Atomically replace the target with the staged contents
    pub fn commit(mut self) -> Result<()> {
        fs::rename(&self.temp, &self.target).map_err(|e| Error::persistence(&self.target, e))?;
        self.committed = true;

        sync_parent_dir(&self.target);
        debug!(path = %self.target.display(), "Committed canvas write");
        Ok(())
    }
}

impl Drop for StagedWrite {
    fn drop(&mut self) {
        if !self.committed {
            if let Err(e) = fs::remove_file(&self.temp) {
                warn!(temp = %self.temp.display(), error = %e, "Failed to remove temp file");
            }
        }
    }
}

fn write_synced(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}

// Make the rename itself durable. Failure here does not undo the write.
#[cfg(unix)]
fn sync_parent_dir(path: &Path) {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if let Err(e) = File::open(parent).and_then(|dir| dir.sync_all()) {
        debug!(dir = %parent.display(), error = %e, "Directory sync skipped");
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) {}
