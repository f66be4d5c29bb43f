//! Configuration and client wiring for the CLI.
//!
//! This is the only place command-line flags meet the environment.

use std::time::Duration;

use rmbridge_core::{ClientConfig, RemarkableClient};

use crate::error::CliError;
use crate::parser::Cli;
use crate::progress::DownloadProgress;

/// Resolve the client configuration: environment first, flags on top.
pub fn build_config(
    cli: &Cli,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ClientConfig, CliError> {
    let mut config = ClientConfig::from_lookup(lookup)?;

    if let Some(raw) = cli.config.as_deref() {
        config = config.with_config_path(raw)?;
    }
    if let Some(secs) = cli.timeout {
        if secs == 0 {
            return Err(CliError::Config("--timeout must be at least 1 second".into()));
        }
        config = config.with_timeout(Duration::from_secs(secs));
    }
    if cli.trace {
        config = config.with_trace(true);
    }
    if cli.hidden {
        config = config.with_hidden(true);
    }

    Ok(config)
}

/// Client whose implicit setup draws a progress bar on stderr.
pub fn client(
    config: ClientConfig,
    progress: &DownloadProgress,
) -> Result<RemarkableClient, CliError> {
    Ok(rmbridge_runtime::connect_with_progress(
        config,
        progress.callback(),
    )?)
}
