use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::{BoxStream, StreamExt};
use reqwest::{Client, Url};
use tracing::debug;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::{join_path, parse_url};
use crate::core::manifest::ManifestEntry;

/// Body of one remote file, yielded chunk by chunk.
pub type ChunkStream = BoxStream<'static, LauncherResult<Bytes>>;

/// Where file contents come from.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn open(&self, entry: &ManifestEntry) -> LauncherResult<ChunkStream>;
}

/// Whole-file HTTP downloads: `<base_url>/<entry.path>`.
pub struct HttpSource {
    client: Client,
    base_url: Url,
}

impl HttpSource {
    pub fn new(client: Client, base_url: &str) -> LauncherResult<Self> {
        Ok(Self {
            client,
            base_url: parse_url(base_url)?,
        })
    }

    pub fn url_for(&self, entry: &ManifestEntry) -> LauncherResult<Url> {
        join_path(&self.base_url, &entry.path)
    }
}

#[async_trait]
impl ContentSource for HttpSource {
    async fn open(&self, entry: &ManifestEntry) -> LauncherResult<ChunkStream> {
        let url = self.url_for(entry)?;
        debug!("GET {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(LauncherError::from))
            .boxed())
    }
}
