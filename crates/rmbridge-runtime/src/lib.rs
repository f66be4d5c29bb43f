//! OS-level adapters for rmbridge.
//!
//! Implements the `rmbridge-core` ports on top of the `rmapi` command line
//! tool: [`BinaryProvisioner`] installs it, [`SubprocessBackend`] runs it.
//! [`connect`] wires both into a ready-to-use client.

#![deny(unsafe_code)]

mod backend;
pub mod command;
pub mod locator;
pub mod process;
pub mod provision;
mod status;

use std::sync::Arc;

use rmbridge_core::{ClientConfig, ProvisionError, RemarkableClient};

pub use backend::SubprocessBackend;
pub use command::{CommandBuilder, UploadPlan};
pub use locator::BinaryLocator;
pub use process::ProcessInvoker;
pub use provision::{BinaryProvisioner, InstallRecord, ProgressCallback};
pub use status::InstallStatus;

/// Build a client that provisions and runs `rmapi` according to `config`.
///
/// Nothing is downloaded or executed here; that happens on first use.
pub fn connect(config: ClientConfig) -> Result<RemarkableClient, ProvisionError> {
    let provisioner = BinaryProvisioner::from_config(&config)?;
    Ok(build_client(config, provisioner))
}

/// Like [`connect`], reporting download progress through `progress`.
pub fn connect_with_progress(
    config: ClientConfig,
    progress: ProgressCallback,
) -> Result<RemarkableClient, ProvisionError> {
    let provisioner = BinaryProvisioner::from_config(&config)?.with_progress(progress);
    Ok(build_client(config, provisioner))
}

fn build_client(config: ClientConfig, provisioner: BinaryProvisioner) -> RemarkableClient {
    let backend = SubprocessBackend::from_config(&config);
    RemarkableClient::new(config, Arc::new(provisioner), Arc::new(backend))
}
