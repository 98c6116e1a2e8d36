use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Chrome user-data directory for a run.
///
/// An ephemeral profile gives the shop a cold session each poll and is
/// removed on drop. A persistent profile keeps the site's cookies between
/// polls, so subsequent runs start with a warm session.
pub struct ProfileDir {
    path: PathBuf,
    ephemeral: bool,
}

impl ProfileDir {
    /// Create an ephemeral profile that is deleted on drop
    pub fn temporary() -> Result<Self> {
        let temp_dir = tempfile::tempdir().map_err(|e| Error::Io(e.into()))?;

        Ok(Self {
            path: temp_dir.keep(),
            ephemeral: true,
        })
    }

    /// Create or reuse a persistent profile at the given path
    pub fn persistent(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            std::fs::create_dir_all(&path).map_err(Error::Io)?;
        }

        Ok(Self {
            path,
            ephemeral: false,
        })
    }

    /// Get the profile directory path
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }
}

impl Drop for ProfileDir {
    fn drop(&mut self) {
        if self.ephemeral && self.path.exists() {
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }
}
