use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use crate::error::Result;

/// Scratch directory owned by a single merge invocation.
///
/// Clones share the same directory. It is removed with everything in it
/// when the last clone is dropped, whichever way the merge ends.
#[derive(Clone, Debug)]
pub struct WorkArea {
    dir: Arc<TempDir>,
}

impl WorkArea {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("catmerge-").tempdir()?;
        tracing::trace!(path = %dir.path().display(), "created work area");
        Ok(Self { dir: Arc::new(dir) })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` to `name` inside the work area and return its path.
    pub fn stage_file(&self, name: &str, contents: &[u8]) -> Result<PathBuf> {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents)?;
        Ok(path)
    }
}
