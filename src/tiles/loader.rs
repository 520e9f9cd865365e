use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::{
    core::geo::PixelKey,
    runtime::AsyncSpawner,
    traits::{TileDecoder, TileFetcher},
    MapError, TileError,
};

/// Result of one fetch, sent from the spawned task back to the owning cache
#[derive(Debug)]
pub struct FetchCompletion {
    pub key: PixelKey,
    pub generation: u64,
    pub result: Result<Vec<u8>, TileError>,
}

/// The capabilities a tile layer needs to load tiles.
///
/// Created by whoever owns the view and handed to every tile source it adds;
/// there is no process-wide client.
#[derive(Clone)]
pub struct TileServices {
    pub fetcher: Arc<dyn TileFetcher>,
    pub decoder: Arc<dyn TileDecoder>,
    pub spawner: Arc<dyn AsyncSpawner>,
}

impl TileServices {
    pub fn new(
        fetcher: Arc<dyn TileFetcher>,
        decoder: Arc<dyn TileDecoder>,
        spawner: Arc<dyn AsyncSpawner>,
    ) -> Self {
        Self {
            fetcher,
            decoder,
            spawner,
        }
    }

    /// HTTP fetching, `image` decoding, tasks on the given Tokio runtime
    #[cfg(all(feature = "render", feature = "tokio-runtime"))]
    pub fn http(handle: tokio::runtime::Handle) -> crate::Result<Self> {
        Ok(Self::new(
            Arc::new(HttpFetcher::new()?),
            Arc::new(crate::tiles::decode::ImageDecoder),
            Arc::new(crate::runtime::TokioSpawner::new(handle)),
        ))
    }
}

impl std::fmt::Debug for TileServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileServices").finish_non_exhaustive()
    }
}

/// Fetches tiles over HTTP(S) with `reqwest`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Client with a maplet User-Agent so that public tile servers
    /// (e.g. OpenStreetMap) don't reject the request.
    pub fn new() -> crate::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("maplet/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(16)
            .build()
            .map_err(|e| MapError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TileFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, TileError> {
        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(TileError::Fetch(format!("HTTP {} for {}", resp.status(), url)));
        }
        let bytes = resp.bytes().await?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_fetcher_builds() {
        assert!(HttpFetcher::new().is_ok());
    }

    #[cfg(feature = "tokio-runtime")]
    #[tokio::test]
    async fn test_http_fetcher_reports_unreachable_host() {
        let fetcher = HttpFetcher::new().unwrap();
        let result = fetcher.fetch("http://127.0.0.1:9/tile/0/0/0.png").await;
        assert!(matches!(result, Err(TileError::Http(_))));
    }
}
