use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::error::{ExperienceError, Result};
use crate::loader::cache::DocumentCache;

/// Which tier of the resolution order satisfied a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Bundled,
    Cached,
    Downloaded,
}

/// Source of experience documents, resolved by URL.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<(Vec<u8>, FetchOutcome)>;
}

/// Production document source: bundled file, then cache, then network.
///
/// The three tiers are mutually exclusive per fetch; a hit in an earlier
/// tier means the later ones are never consulted.
#[derive(Clone, Debug)]
pub struct DocumentFetcher {
    bundle_dir: Option<PathBuf>,
    cache: DocumentCache,
    http_client: reqwest::Client,
}

impl DocumentFetcher {
    pub fn new(bundle_dir: Option<PathBuf>, cache: DocumentCache) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");
        Self { bundle_dir, cache, http_client }
    }

    /// Last path segment of the document URL; every local lookup shares
    /// this key.
    pub fn logical_name(url: &Url) -> Result<String> {
        url.path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| {
                ExperienceError::ResourceUnavailable(format!(
                    "no document filename in {url}"
                ))
            })
    }

    async fn download(&self, url: &Url) -> Result<Vec<u8>> {
        debug!(%url, "downloading document");
        let response = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| {
                ExperienceError::ResourceUnavailable(format!("{url}: {err}"))
            })?;
        if !response.status().is_success() {
            return Err(ExperienceError::ResourceUnavailable(format!(
                "{url}: HTTP {}",
                response.status()
            )));
        }
        let bytes = response.bytes().await.map_err(|err| {
            ExperienceError::ResourceUnavailable(format!("{url}: {err}"))
        })?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl DocumentSource for DocumentFetcher {
    async fn fetch(&self, url: &Url) -> Result<(Vec<u8>, FetchOutcome)> {
        let name = Self::logical_name(url)?;

        if let Some(bundle_dir) = &self.bundle_dir {
            let path = bundle_dir.join(&name);
            match tokio::fs::read(&path).await {
                Ok(bytes) => {
                    debug!(name, "document resolved from bundle");
                    return Ok((bytes, FetchOutcome::Bundled));
                }
                Err(err)
                    if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }

        if let Some(bytes) = self.cache.read(&name).await? {
            debug!(name, "document resolved from cache");
            return Ok((bytes, FetchOutcome::Cached));
        }

        let bytes = self.download(url).await?;
        self.cache.store_if_missing(&name, &bytes).await?;
        Ok((bytes, FetchOutcome::Downloaded))
    }
}
