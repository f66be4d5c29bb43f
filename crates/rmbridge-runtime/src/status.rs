//! Local install status report.

use std::path::PathBuf;

use rmbridge_core::ClientConfig;

use crate::locator::BinaryLocator;
use crate::provision::{InstallRecord, read_install_record};

/// Snapshot of the managed binary and configuration on this machine.
#[derive(Debug, Clone)]
pub struct InstallStatus {
    pub binary_path: PathBuf,
    pub config_path: PathBuf,
    /// Why the binary is unusable; `None` when it is ready.
    pub problem: Option<String>,
    /// Release recorded at install time. Informative only.
    pub record: Option<InstallRecord>,
    pub config_exists: bool,
}

impl InstallStatus {
    /// Inspect the filesystem for `config`. Never touches the network.
    pub fn probe(config: &ClientConfig) -> Self {
        let locator = BinaryLocator::new(&config.binary_path);
        let problem = locator.check().err().map(|e| e.to_string());

        Self {
            binary_path: config.binary_path.clone(),
            config_path: config.config_path.clone(),
            problem,
            record: read_install_record(&config.binary_path),
            config_exists: config.config_path.is_file(),
        }
    }

    pub const fn is_installed(&self) -> bool {
        self.problem.is_none()
    }
}
