//! Tile fetch backends

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use crate::core::error::Error;
use crate::core::types::Result;

/// Raw bytes of one tile, or why they could not be read
pub type FetchFuture = Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + 'static>>;

/// Maps a tile URL to its raw (still encoded) image data
pub trait TileFetcher: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> FetchFuture;
}

impl<F, Fut> TileFetcher for F
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<u8>>> + Send + 'static,
{
    fn fetch(&self, url: &str) -> FetchFuture {
        Box::pin(self(url.to_string()))
    }
}

/// Reads tiles from a local directory, URLs being relative paths
#[derive(Clone, Debug)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TileFetcher for FsFetcher {
    fn fetch(&self, url: &str) -> FetchFuture {
        let path = self.root.join(url.trim_start_matches('/'));
        let url = url.to_string();
        Box::pin(async move {
            tokio::fs::read(&path).await.map_err(|e| Error::Fetch {
                url,
                reason: e.to_string(),
            })
        })
    }
}
