//! Binary provisioning port.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::ProvisionError;

/// Makes the execution backend's prerequisites available.
///
/// For the subprocess backend this means an installed `rmapi` executable.
/// A native protocol backend would use a provisioner that has nothing to do.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Path of an already present, usable binary. Never touches the network.
    fn locate(&self) -> Option<PathBuf>;

    /// Install the binary if needed and return its path.
    ///
    /// Must be idempotent: once [`Provisioner::locate`] reports a binary,
    /// this returns it without any network access.
    async fn ensure_installed(&self) -> Result<PathBuf, ProvisionError>;
}
