//! Paths command handler.
//!
//! Displays all resolved paths for diagnostics and debugging.

use anyhow::{Context, Result};

use rmbridge_core::ClientConfig;
use rmbridge_core::paths::{data_root, install_record_path};

/// Print resolved paths in `key = value` format.
pub fn execute(config: &ClientConfig) -> Result<()> {
    let data_root = data_root().context("Failed to resolve the rmbridge data directory")?;
    let working_dir =
        std::env::current_dir().context("Failed to read the current working directory")?;

    println!("data_root      = {}", data_root.display());
    println!("binary         = {}", config.binary_path.display());
    println!(
        "install_record = {}",
        install_record_path(&config.binary_path).display()
    );
    println!("rmapi_config   = {}", config.config_path.display());
    println!("working_dir    = {}", working_dir.display());
    println!("release_index  = {}", config.release_index_url);
    Ok(())
}
