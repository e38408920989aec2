//! Handing finished exports to the user.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::export::ExportResult;

/// Somewhere a finished export can be delivered.
pub trait SaveTarget {
    /// Store `bytes` under `filename` and return where they ended up.
    fn save(&self, filename: &str, mime_type: &str, bytes: &[u8]) -> Result<PathBuf>;
}

/// Saves exports as files in a directory.
#[derive(Debug, Clone)]
pub struct DirectoryTarget {
    dir: PathBuf,
}

impl DirectoryTarget {
    /// Save into `dir`, creating it on first use.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SaveTarget for DirectoryTarget {
    fn save(&self, filename: &str, mime_type: &str, bytes: &[u8]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(filename);
        std::fs::write(&path, bytes)?;
        info!(path = %path.display(), mime_type, bytes = bytes.len(), "Saved export");
        Ok(path)
    }
}

/// Deliver an export to `target` under its suggested file name.
///
/// The payload is written as-is: text as UTF-8, binary data verbatim.
pub fn trigger_download(result: &ExportResult, target: &impl SaveTarget) -> Result<PathBuf> {
    target.save(&result.filename, result.mime_type, result.payload.as_bytes())
}
