//! Release index lookup.

use std::time::Duration;

use reqwest::Client;
use rmbridge_core::ProvisionError;
use serde::Deserialize;

use super::platform::PlatformTarget;

/// GitHub API response for a release
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub tag_name: String,
    pub assets: Vec<ReleaseAsset>,
}

/// GitHub API response for a release asset
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
}

/// Map a transport-level failure to the provisioning taxonomy.
pub(super) fn transport_error(url: &str, err: &reqwest::Error) -> ProvisionError {
    ProvisionError::NetworkUnreachable {
        url: url.to_string(),
        reason: err.to_string(),
    }
}

/// Fetch the latest release from the index, giving up after `deadline`.
pub async fn fetch_latest_release(
    client: &Client,
    url: &str,
    deadline: Duration,
) -> Result<Release, ProvisionError> {
    let response = client
        .get(url)
        .header("Accept", "application/vnd.github.v3+json")
        .timeout(deadline)
        .send()
        .await
        .map_err(|e| transport_error(url, &e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProvisionError::ReleaseIndex(format!(
            "HTTP {status}: {}",
            body.trim()
        )));
    }

    response.json::<Release>().await.map_err(|e| {
        if e.is_decode() {
            ProvisionError::ReleaseIndex(format!("malformed release JSON: {e}"))
        } else {
            transport_error(url, &e)
        }
    })
}

/// Find the matching asset for a platform in a release.
pub fn find_platform_asset<'a>(
    release: &'a Release,
    target: &PlatformTarget,
) -> Result<&'a ReleaseAsset, ProvisionError> {
    release
        .assets
        .iter()
        .find(|asset| target.matches_asset(&asset.name))
        .ok_or_else(|| ProvisionError::AssetNotFound {
            version: release.tag_name.clone(),
            platform_tag: target.tag.to_string(),
        })
}
