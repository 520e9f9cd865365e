//! In-memory fetcher and decoder.
//!
//! Useful for headless runs and for tests: no network, no image codec.
//! [`RawDecoder`] reads the payload as one row of RGBA8 pixels.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fxhash::{FxHashMap, FxHashSet};

use crate::{
    tiles::decode::TileImage,
    traits::{TileDecoder, TileFetcher},
    TileError,
};

/// Body served for every URL without an explicit fixture, when enabled
pub const DEFAULT_BODY: [u8; 4] = [0x20, 0x40, 0x60, 0xff];

/// Serves canned bodies keyed by URL and records every request
#[derive(Debug, Clone, Default)]
pub struct FixtureFetcher {
    bodies: FxHashMap<String, Vec<u8>>,
    failing: FxHashSet<String>,
    fallback: Option<Vec<u8>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FixtureFetcher {
    /// Fetcher that fails every URL it has no fixture for
    pub fn empty() -> Self {
        Self::default()
    }

    /// Fetcher that answers every URL with [`DEFAULT_BODY`]
    pub fn serving_all() -> Self {
        Self {
            fallback: Some(DEFAULT_BODY.to_vec()),
            ..Self::default()
        }
    }

    pub fn with_body(mut self, url: impl Into<String>, body: Vec<u8>) -> Self {
        self.bodies.insert(url.into(), body);
        self
    }

    pub fn failing(mut self, url: impl Into<String>) -> Self {
        self.failing.insert(url.into());
        self
    }

    /// URLs requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl TileFetcher for FixtureFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, TileError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }
        if self.failing.contains(url) {
            return Err(TileError::Fetch(format!("fixture failure for {}", url)));
        }
        self.bodies
            .get(url)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| TileError::Fetch(format!("no fixture for {}", url)))
    }
}

/// Interprets the payload as a single row of RGBA8 pixels
#[derive(Debug, Default, Clone, Copy)]
pub struct RawDecoder;

impl TileDecoder for RawDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<TileImage, TileError> {
        if bytes.is_empty() || bytes.len() % 4 != 0 {
            return Err(TileError::Decode(format!(
                "{} bytes is not a whole number of RGBA pixels",
                bytes.len()
            )));
        }
        Ok(TileImage::new((bytes.len() / 4) as u32, 1, bytes.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_fetcher() {
        let fetcher = FixtureFetcher::empty()
            .with_body("a", vec![1, 2, 3, 4])
            .failing("b");
        let a = futures::executor::block_on(fetcher.fetch("a"));
        assert_eq!(a.unwrap(), vec![1, 2, 3, 4]);
        assert!(futures::executor::block_on(fetcher.fetch("b")).is_err());
        assert!(futures::executor::block_on(fetcher.fetch("c")).is_err());
        assert_eq!(fetcher.requests(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_raw_decoder() {
        let image = RawDecoder.decode(&[0; 8]).unwrap();
        assert_eq!((image.width, image.height), (2, 1));
        assert!(RawDecoder.decode(b"bad").is_err());
        assert!(RawDecoder.decode(&[]).is_err());
    }
}
