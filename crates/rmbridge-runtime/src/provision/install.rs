//! Atomic installation of the managed executable.
//!
//! The binary is written to a temp file in the install directory and renamed
//! over the final path. Readers see either the previous file or the complete
//! new one.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rmbridge_core::paths::install_record_path;
use rmbridge_core::{BinaryDescriptor, ProvisionError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Metadata persisted next to the binary after a successful install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallRecord {
    #[serde(flatten)]
    pub descriptor: BinaryDescriptor,
    pub installed_at: DateTime<Utc>,
}

impl InstallRecord {
    pub fn now(descriptor: BinaryDescriptor) -> Self {
        Self {
            descriptor,
            installed_at: Utc::now(),
        }
    }
}

/// Write `bytes` to `install_path` atomically and mark it executable.
pub fn install_binary(bytes: &[u8], install_path: &Path) -> Result<PathBuf, ProvisionError> {
    let dir = install_dir(install_path);
    fs::create_dir_all(dir).map_err(|e| ProvisionError::not_writable(dir, e))?;

    let mut staged = tempfile::Builder::new()
        .prefix(".rmapi-install-")
        .tempfile_in(dir)
        .map_err(|e| ProvisionError::not_writable(dir, e))?;

    staged
        .write_all(bytes)
        .map_err(|e| ProvisionError::not_writable(staged.path(), e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(staged.path(), fs::Permissions::from_mode(0o755))
            .map_err(|e| ProvisionError::not_writable(staged.path(), e))?;
    }

    staged
        .as_file()
        .sync_all()
        .map_err(|e| ProvisionError::not_writable(staged.path(), e))?;

    staged
        .persist(install_path)
        .map_err(|e| ProvisionError::not_writable(install_path, e.error))?;

    debug!(path = %install_path.display(), bytes = bytes.len(), "Installed rmapi");
    Ok(install_path.to_path_buf())
}

/// Persist the install record next to `binary_path`.
pub fn write_install_record(
    binary_path: &Path,
    record: &InstallRecord,
) -> Result<(), ProvisionError> {
    let path = install_record_path(binary_path);
    let dir = install_dir(&path);
    let json = serde_json::to_vec_pretty(record).map_err(|e| ProvisionError::not_writable(&path, e))?;

    let mut staged = tempfile::Builder::new()
        .prefix(".install-")
        .tempfile_in(dir)
        .map_err(|e| ProvisionError::not_writable(dir, e))?;
    staged
        .write_all(&json)
        .map_err(|e| ProvisionError::not_writable(staged.path(), e))?;
    staged
        .persist(&path)
        .map_err(|e| ProvisionError::not_writable(&path, e.error))?;
    Ok(())
}

/// Read the install record next to `binary_path`.
///
/// Returns `None` when the record is absent or unreadable; the binary itself
/// is the authoritative install state.
pub fn read_install_record(binary_path: &Path) -> Option<InstallRecord> {
    let path = install_record_path(binary_path);
    let raw = fs::read(&path).ok()?;
    match serde_json::from_slice(&raw) {
        Ok(record) => Some(record),
        Err(e) => {
            debug!(path = %path.display(), "Ignoring unreadable install record: {e}");
            None
        }
    }
}

fn install_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}
