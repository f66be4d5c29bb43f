//! Release artifact download.
//!
//! Archives are streamed into a temporary file inside the install directory.
//! The file is deleted when dropped, so an interrupted download leaves
//! nothing behind that the locator could mistake for an install.

use std::io::{Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use rmbridge_core::ProvisionError;
use tempfile::NamedTempFile;
use tracing::warn;

use super::release::transport_error;

/// Progress callback: (`downloaded_bytes`, `total_bytes`). Total is 0 when unknown.
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Total attempts for one artifact, first try included.
const MAX_ATTEMPTS: u32 = 2;

/// Outcome of one attempt; `retryable` marks transient failures.
struct AttemptError {
    error: ProvisionError,
    retryable: bool,
}

/// Download `url` into a fresh temp file under `dir`, retrying once on
/// transient failures. Each attempt, body included, must finish within
/// `deadline`. The returned file is rewound to the start.
pub async fn download_archive(
    client: &Client,
    url: &str,
    dir: &Path,
    deadline: Duration,
    progress: Option<&ProgressCallback>,
) -> Result<NamedTempFile, ProvisionError> {
    let mut attempt = 1;
    loop {
        match download_once(client, url, dir, deadline, progress).await {
            Ok(file) => return Ok(file),
            Err(AttemptError { error, retryable }) => {
                if !retryable || attempt >= MAX_ATTEMPTS {
                    return Err(error);
                }
                warn!(attempt, "Download of {url} failed, retrying: {error}");
                attempt += 1;
            }
        }
    }
}

async fn download_once(
    client: &Client,
    url: &str,
    dir: &Path,
    deadline: Duration,
    progress: Option<&ProgressCallback>,
) -> Result<NamedTempFile, AttemptError> {
    let transient = |error| AttemptError {
        error,
        retryable: true,
    };
    let fatal = |error| AttemptError {
        error,
        retryable: false,
    };

    let response = client
        .get(url)
        .timeout(deadline)
        .send()
        .await
        .map_err(|e| transient(transport_error(url, &e)))?;

    let status = response.status();
    if !status.is_success() {
        let error = ProvisionError::NetworkUnreachable {
            url: url.to_string(),
            reason: format!("HTTP {status}"),
        };
        return Err(if status.is_server_error() {
            transient(error)
        } else {
            fatal(error)
        });
    }

    let total_size = response.content_length().unwrap_or(0);

    let mut file = tempfile::Builder::new()
        .prefix(".rmapi-download-")
        .tempfile_in(dir)
        .map_err(|e| fatal(ProvisionError::not_writable(dir, e)))?;

    let mut downloaded: u64 = 0;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| transient(transport_error(url, &e)))?;
        file.write_all(&chunk)
            .map_err(|e| fatal(ProvisionError::not_writable(file.path(), e)))?;
        downloaded += chunk.len() as u64;
        if let Some(cb) = progress {
            cb(downloaded, total_size);
        }
    }

    if total_size > 0 && downloaded != total_size {
        return Err(transient(ProvisionError::corrupt(format!(
            "download truncated: received {downloaded} of {total_size} bytes"
        ))));
    }

    file.flush()
        .and_then(|()| file.as_file_mut().seek(SeekFrom::Start(0)).map(drop))
        .map_err(|e| fatal(ProvisionError::not_writable(file.path(), e)))?;

    Ok(file)
}
