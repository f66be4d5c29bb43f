//! Binary provisioning: locate, download, verify and install `rmapi`.
//!
//! # Design Rules
//!
//! - An executable already at the install path short-circuits everything;
//!   no network access happens in that case
//! - Nothing is written to the install path until the archive has been
//!   fully decoded
//! - The install itself is a rename, so a crash leaves either nothing or a
//!   complete binary behind

mod archive;
mod download;
mod install;
mod platform;
mod release;

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rmbridge_core::config::DEFAULT_DOWNLOAD_TIMEOUT;
use rmbridge_core::{BinaryDescriptor, ClientConfig, ProvisionError, Provisioner};
use tracing::{info, warn};

use crate::locator::BinaryLocator;

pub use archive::extract_binary;
pub use download::{ProgressCallback, download_archive};
pub use install::{InstallRecord, install_binary, read_install_record, write_install_record};
pub use platform::{ArchiveFormat, PlatformTarget};
pub use release::{Release, ReleaseAsset, fetch_latest_release, find_platform_asset};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Provisions the `rmapi` executable from the published releases.
pub struct BinaryProvisioner {
    locator: BinaryLocator,
    release_index_url: String,
    http: Client,
    download_timeout: Duration,
    progress: Option<ProgressCallback>,
}

impl BinaryProvisioner {
    /// Provisioner for `install_path` backed by `release_index_url`.
    ///
    /// Fails only if the HTTP client cannot be built (no usable TLS backend).
    pub fn new(
        install_path: impl Into<PathBuf>,
        release_index_url: impl Into<String>,
    ) -> Result<Self, ProvisionError> {
        let release_index_url = release_index_url.into();
        // GitHub rejects API requests without a User-Agent
        let http = Client::builder()
            .user_agent(concat!("rmbridge/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ProvisionError::NetworkUnreachable {
                url: release_index_url.clone(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            locator: BinaryLocator::new(install_path),
            release_index_url,
            http,
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
            progress: None,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ProvisionError> {
        Ok(Self::new(&config.binary_path, &config.release_index_url)?
            .with_download_timeout(config.download_timeout))
    }

    /// Deadline for each release index or archive request.
    #[must_use]
    pub const fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    /// Report download progress through `callback`.
    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    async fn install(&self) -> Result<PathBuf, ProvisionError> {
        let target = PlatformTarget::current()?;
        let install_path = self.locator.path().to_path_buf();

        info!(url = %self.release_index_url, "Fetching rmapi release index");
        let release =
            fetch_latest_release(&self.http, &self.release_index_url, self.download_timeout)
                .await?;
        let asset = find_platform_asset(&release, &target)?;

        let descriptor = BinaryDescriptor {
            version: release.tag_name.clone(),
            platform_tag: target.tag.to_string(),
            download_url: asset.browser_download_url.clone(),
            install_path: install_path.clone(),
        };

        info!(
            version = %descriptor.version,
            asset = %asset.name,
            "Downloading rmapi"
        );

        let dir = install_path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        std::fs::create_dir_all(&dir).map_err(|e| ProvisionError::not_writable(&dir, e))?;

        let archive = download_archive(
            &self.http,
            &descriptor.download_url,
            &dir,
            self.download_timeout,
            self.progress.as_ref(),
        )
        .await?;

        // Decoding and writing are blocking filesystem work
        let format = target.format;
        let path = install_path.clone();
        let installed = tokio::task::spawn_blocking(move || {
            let file = archive
                .reopen()
                .map_err(|e| ProvisionError::not_writable(archive.path(), e))?;
            let bytes = extract_binary(file, format)?;
            install_binary(&bytes, &path)
        })
        .await
        .map_err(|e| ProvisionError::not_writable(&install_path, e))??;

        if let Err(e) = write_install_record(&installed, &InstallRecord::now(descriptor)) {
            warn!("Installed rmapi but could not write install record: {e}");
        }

        info!(path = %installed.display(), "rmapi installed");
        Ok(installed)
    }
}

#[async_trait]
impl Provisioner for BinaryProvisioner {
    fn locate(&self) -> Option<PathBuf> {
        self.locator.locate()
    }

    async fn ensure_installed(&self) -> Result<PathBuf, ProvisionError> {
        if let Some(path) = self.locator.locate() {
            return Ok(path);
        }
        self.install().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[cfg(unix)]
    #[tokio::test]
    async fn test_existing_binary_skips_network() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("rmapi");
        std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        // Port 9 on localhost is never queried when the binary is present
        let provisioner = BinaryProvisioner::new(&path, "http://127.0.0.1:9/unreachable").unwrap();
        assert_eq!(provisioner.ensure_installed().await.unwrap(), path);
    }

    #[tokio::test]
    async fn test_unreachable_index_is_network_error() {
        let dir = tempdir().unwrap();
        let provisioner =
            BinaryProvisioner::new(dir.path().join("bin").join("rmapi"), "http://127.0.0.1:9/")
                .unwrap();

        let result = provisioner.ensure_installed().await;
        assert!(
            matches!(
                result,
                Err(ProvisionError::NetworkUnreachable { .. }
                    | ProvisionError::UnsupportedPlatform { .. })
            ),
            "unexpected result: {result:?}"
        );
        assert_eq!(provisioner.locate(), None);
    }
}
