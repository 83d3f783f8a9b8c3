//! Request-scoped document workspace
//!
//! A uniquely named temporary directory owned by a single request. Dropping
//! the workspace removes the directory recursively, which covers early
//! returns and panics inside engine calls; [`Workspace::close`] does the same
//! but reports removal errors.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Fallback stem for uploads without a usable filename
const UNNAMED_UPLOAD: &str = "upload.pdf";

pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a fresh directory under `root` named `<prefix><random>`.
    pub fn create(root: &Path, prefix: &str) -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix(prefix).tempdir_in(root)?;
        tracing::debug!(path = %dir.path().display(), "Created workspace");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Create (if needed) and return a subdirectory.
    pub fn subdir(&self, name: &str) -> io::Result<PathBuf> {
        let path = self.dir.path().join(name);
        fs::create_dir_all(&path)?;
        Ok(path)
    }

    /// Write an upload into `dir` under its base filename only.
    pub fn persist_in(&self, dir: &Path, file_name: &str, data: &[u8]) -> io::Result<PathBuf> {
        let path = dir.join(base_file_name(file_name));
        fs::write(&path, data)?;
        Ok(path)
    }

    /// Write an upload at the workspace root under its base filename only.
    pub fn persist(&self, file_name: &str, data: &[u8]) -> io::Result<PathBuf> {
        self.persist_in(self.dir.path(), file_name, data)
    }

    pub fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    /// Remove the directory now, surfacing any error.
    pub fn close(self) -> io::Result<()> {
        let path = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Removed workspace");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "Failed to remove workspace: {}", e);
                Err(e)
            }
        }
    }
}

/// Strip any directory components from a client-supplied filename.
pub fn base_file_name(file_name: &str) -> String {
    // Clients on Windows send backslash separated paths
    let normalized = file_name.replace('\\', "/");
    Path::new(&normalized)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| UNNAMED_UPLOAD.to_string())
}
