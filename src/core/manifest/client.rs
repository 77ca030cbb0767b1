// ─── Manifest Client ───
// Fetches the remote file manifest and launch profile. Never retries on its
// own: retry policy belongs to the caller.

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, info};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::parse_url;
use crate::core::rules::Platform;

use super::model::FileManifest;
use super::profile::LaunchProfile;

/// Anything that can produce the file manifest for a sync cycle.
#[async_trait]
pub trait ManifestSource: Send + Sync {
    async fn fetch_manifest(
        &self,
        client_id: &str,
        version: &str,
        platform: Platform,
    ) -> LauncherResult<FileManifest>;
}

/// HTTP manifest endpoint. Requests are
/// `GET <manifest_url>?client=<id>&version=<v>&os=<platform>`.
pub struct ManifestClient {
    client: Client,
    manifest_url: Url,
}

impl ManifestClient {
    pub fn new(client: Client, manifest_url: &str) -> LauncherResult<Self> {
        Ok(Self {
            client,
            manifest_url: parse_url(manifest_url)?,
        })
    }

    pub fn manifest_request_url(
        &self,
        client_id: &str,
        version: &str,
        platform: Platform,
    ) -> Url {
        let mut url = self.manifest_url.clone();
        url.query_pairs_mut()
            .append_pair("client", client_id)
            .append_pair("version", version)
            .append_pair("os", platform.as_str());
        url
    }

    async fn get_text(&self, url: Url) -> LauncherResult<String> {
        debug!("GET {}", url);
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }

    /// Fetch a launch profile document published next to the manifest.
    pub async fn fetch_launch_profile(&self, url: &str) -> LauncherResult<LaunchProfile> {
        let raw = self.get_text(parse_url(url)?).await?;
        LaunchProfile::from_json_str(&raw)
    }
}

#[async_trait]
impl ManifestSource for ManifestClient {
    async fn fetch_manifest(
        &self,
        client_id: &str,
        version: &str,
        platform: Platform,
    ) -> LauncherResult<FileManifest> {
        info!(
            "Fetching file manifest for {} {} ({})",
            client_id, version, platform
        );

        let url = self.manifest_request_url(client_id, version, platform);
        let raw = self.get_text(url).await?;
        let manifest = FileManifest::from_json_str(&raw)?;

        info!(
            "Loaded {} manifest entries ({} bytes total)",
            manifest.len(),
            manifest.total_bytes()
        );
        Ok(manifest)
    }
}
