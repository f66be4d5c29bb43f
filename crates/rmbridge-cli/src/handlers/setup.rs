//! Setup command handler.

use rmbridge_core::ClientConfig;

use crate::bootstrap;
use crate::error::CliError;
use crate::progress::DownloadProgress;

/// Install rmapi if needed and print where it lives.
pub async fn execute(config: ClientConfig) -> Result<(), CliError> {
    let progress = DownloadProgress::new();
    let client = bootstrap::client(config, &progress)?;

    let result = client.setup().await;
    progress.finish();

    let path = result?;
    println!("rmapi ready at {}", path.display());
    Ok(())
}
