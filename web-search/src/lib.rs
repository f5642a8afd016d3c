//! Web search backends used for topic research and slide imagery.
//!
//! Every backend sits behind a narrow trait so callers can swap in fakes.

use async_trait::async_trait;
use deckgen_common::SearchHit;
use serde::{Deserialize, Serialize};
use std::time::Duration;

mod duckduckgo;
mod error;
mod fetch;
mod google;

pub use duckduckgo::DuckDuckGo;
pub use error::SearchError;
pub use fetch::HttpFetcher;
pub use google::{GoogleImageSearch, GoogleSearch};

/// A candidate image returned by an image search backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageHit {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub mime_type: Option<String>,
}

impl ImageHit {
    /// Lowercased file extension of the URL path, if any.
    pub fn url_extension(&self) -> Option<String> {
        let path = self.url.split(['?', '#']).next().unwrap_or_default();
        let file = path.rsplit('/').next()?;
        let (_, ext) = file.rsplit_once('.')?;
        Some(ext.to_ascii_lowercase())
    }
}

#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Short identifier used in logs and in [`SearchHit::backend`].
    fn name(&self) -> &'static str;

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError>;
}

#[async_trait]
pub trait ImageSearch: Send + Sync {
    async fn search_images(&self, query: &str) -> Result<Vec<ImageHit>, SearchError>;
}

#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, SearchError>;
}

/// Shared HTTP client with the per-request timeout applied.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, SearchError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .build()
        .map_err(|source| SearchError::Request {
            backend: "http",
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(url: &str) -> ImageHit {
        ImageHit {
            url: url.to_string(),
            width: 800,
            height: 600,
            mime_type: None,
        }
    }

    #[test]
    fn test_url_extension() {
        assert_eq!(hit("https://a.com/x/photo.JPG").url_extension().as_deref(), Some("jpg"));
        assert_eq!(hit("https://a.com/p.png?w=200#top").url_extension().as_deref(), Some("png"));
        assert_eq!(hit("https://a.com/image").url_extension(), None);
    }
}
