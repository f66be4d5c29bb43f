//! rmapi binary availability checking.
//!
//! The locator only looks at the filesystem. It never verifies versions or
//! contents; whatever sits at the install path is trusted once it looks like
//! a complete executable. Installs always land via rename, so a half-written
//! file can never appear at that path.

use std::path::{Path, PathBuf};

use rmbridge_core::InvocationError;
use tracing::debug;

/// Resolves the managed executable at a fixed, configured location.
#[derive(Debug, Clone)]
pub struct BinaryLocator {
    path: PathBuf,
}

impl BinaryLocator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The location checked, whether or not anything is there.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Some(path)` if a usable executable is present. Absence is not an error.
    pub fn locate(&self) -> Option<PathBuf> {
        match self.check() {
            Ok(path) => Some(path),
            Err(e) => {
                debug!("rmapi not usable: {e}");
                None
            }
        }
    }

    /// Like [`Self::locate`] but explains why the binary is unusable.
    pub fn check(&self) -> Result<PathBuf, InvocationError> {
        let metadata = match std::fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                return Err(InvocationError::NotExecutable {
                    path: self.path.clone(),
                });
            }
            Err(_) => {
                return Err(InvocationError::BinaryNotFound {
                    path: self.path.clone(),
                });
            }
        };

        // A directory or an empty file is a leftover, not an install.
        if !metadata.is_file() || metadata.len() == 0 {
            return Err(InvocationError::BinaryNotFound {
                path: self.path.clone(),
            });
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // Any execute bit (owner, group, or other) will do
            if metadata.permissions().mode() & 0o111 == 0 {
                return Err(InvocationError::NotExecutable {
                    path: self.path.clone(),
                });
            }
        }

        Ok(self.path.clone())
    }
}
