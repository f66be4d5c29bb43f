//! Remarkable client - the public facade.
//!
//! Composes a [`Provisioner`] and an [`ExecutionBackend`] into the
//! operations callers use. Every mutating operation exists twice: a
//! boolean form that collapses failures to `false`, and a `*_detailed` form
//! that keeps the error and any captured diagnostics.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use crate::config::ClientConfig;
use crate::domain::{
    Intent, OperationOutcome, RemoteEntry, RemotePath, parse_listing, validate_local_file,
};
use crate::error::{BridgeError, BuildError, ProvisionError};
use crate::ports::{ExecutionBackend, Provisioner};

/// Lifecycle of a client instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// `setup` has not completed yet.
    Uninitialized,
    /// The backend's binary is known to be installed.
    BinaryReady,
}

/// Client for the remote document tree.
///
/// Safe to share across tasks (`Arc<RemarkableClient>`); operations are not
/// serialized against each other.
pub struct RemarkableClient {
    config: ClientConfig,
    provisioner: Arc<dyn Provisioner>,
    backend: Arc<dyn ExecutionBackend>,
    binary: OnceCell<PathBuf>,
}

impl RemarkableClient {
    /// Create a client from its configuration and adapters.
    pub fn new(
        config: ClientConfig,
        provisioner: Arc<dyn Provisioner>,
        backend: Arc<dyn ExecutionBackend>,
    ) -> Self {
        Self {
            config,
            provisioner,
            backend,
            binary: OnceCell::new(),
        }
    }

    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn state(&self) -> ClientState {
        if self.binary.initialized() {
            ClientState::BinaryReady
        } else {
            ClientState::Uninitialized
        }
    }

    /// Path of the binary resolved by `setup`, if it has run.
    pub fn binary_path(&self) -> Option<&Path> {
        self.binary.get().map(PathBuf::as_path)
    }

    /// Make sure the executable is installed.
    ///
    /// Idempotent: after the first success this returns the same path without
    /// consulting the provisioner again. Concurrent first calls on one client
    /// share a single provisioning attempt.
    pub async fn setup(&self) -> Result<PathBuf, ProvisionError> {
        let path = self
            .binary
            .get_or_try_init(|| async {
                let path = self.provisioner.ensure_installed().await?;
                info!(path = %path.display(), backend = self.backend.name(), "rmapi ready");
                Ok::<_, ProvisionError>(path)
            })
            .await?;
        Ok(path.clone())
    }

    /// Ensure `/papers/<classification>` exists. `true` on success.
    pub async fn ensure_directory(&self, classification: &str) -> bool {
        collapse("ensure_directory", self.ensure_directory_detailed(classification).await)
    }

    /// Detailed form of [`Self::ensure_directory`].
    pub async fn ensure_directory_detailed(
        &self,
        classification: &str,
    ) -> Result<OperationOutcome, BridgeError> {
        let path = RemotePath::papers(classification)?;
        self.run(Intent::EnsureDirectory { path }).await
    }

    /// Upload `file_path` into an existing `remote_directory`. `true` on success.
    ///
    /// The remote directory is not created implicitly; call
    /// [`Self::ensure_directory`] first.
    pub async fn upload(
        &self,
        file_path: impl AsRef<Path>,
        remote_directory: &str,
        remote_file_name: Option<&str>,
    ) -> bool {
        collapse(
            "upload",
            self.upload_detailed(file_path, remote_directory, remote_file_name)
                .await,
        )
    }

    /// Detailed form of [`Self::upload`].
    pub async fn upload_detailed(
        &self,
        file_path: impl AsRef<Path>,
        remote_directory: &str,
        remote_file_name: Option<&str>,
    ) -> Result<OperationOutcome, BridgeError> {
        let local_path = file_path.as_ref();

        // Nothing is provisioned or executed for a bad local source.
        validate_local_file(local_path)?;
        let remote_directory = RemotePath::managed(remote_directory)?;
        if let Some(name) = remote_file_name {
            validate_remote_name(name)?;
        }

        self.run(Intent::Upload {
            local_path: local_path.to_path_buf(),
            remote_directory,
            remote_name: remote_file_name.map(str::to_string),
        })
        .await
    }

    /// Move or rename a managed entry. `true` on success.
    pub async fn move_entry(&self, from: &str, to: &str) -> bool {
        collapse("move_entry", self.move_entry_detailed(from, to).await)
    }

    /// Detailed form of [`Self::move_entry`].
    pub async fn move_entry_detailed(
        &self,
        from: &str,
        to: &str,
    ) -> Result<OperationOutcome, BridgeError> {
        let from = RemotePath::managed(from)?;
        let to = RemotePath::managed(to)?;
        self.run(Intent::Move { from, to }).await
    }

    /// List a remote directory. Listing is read-only and not scoped to `/papers`.
    pub async fn list(&self, path: &str) -> Result<Vec<RemoteEntry>, BridgeError> {
        let path = RemotePath::parse(path)?;
        let outcome = self.run(Intent::List { path }).await?;
        Ok(parse_listing(&outcome.stdout))
    }

    async fn run(&self, intent: Intent) -> Result<OperationOutcome, BridgeError> {
        self.setup().await?;
        debug!(backend = self.backend.name(), "{intent}");
        self.backend.execute(&intent).await
    }
}

fn validate_remote_name(name: &str) -> Result<(), BuildError> {
    if name.trim().is_empty() || name.contains('/') {
        return Err(BuildError::InvalidRemoteName(name.to_string()));
    }
    Ok(())
}

fn collapse(operation: &str, result: Result<OperationOutcome, BridgeError>) -> bool {
    match result {
        Ok(_) => true,
        Err(e) => {
            error!(operation, "{e}");
            false
        }
    }
}
