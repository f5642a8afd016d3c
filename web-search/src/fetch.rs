use async_trait::async_trait;
use futures_util::{Stream, StreamExt};

use crate::{Fetch, SearchError};

const BACKEND: &str = "fetch";
const USER_AGENT: &str = "Mozilla/5.0 (compatible; deckgen)";
const DEFAULT_MAX_BYTES: usize = 10 * 1024 * 1024;

/// Plain HTTP GET downloader with a response size cap.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, SearchError> {
        tracing::debug!("fetching {url}");
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|source| SearchError::Request {
                backend: BACKEND,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                backend: BACKEND,
                status: status.as_u16(),
            });
        }

        if let Some(len) = response.content_length() {
            let len = usize::try_from(len).unwrap_or(usize::MAX);
            if len > self.max_bytes {
                return Err(SearchError::TooLarge {
                    backend: BACKEND,
                    size: len,
                    limit: self.max_bytes,
                });
            }
        }

        let chunks = response.bytes_stream().map(|chunk| {
            chunk.map_err(|source| SearchError::Request {
                backend: BACKEND,
                source,
            })
        });
        read_capped(chunks, self.max_bytes).await
    }
}

/// Collect a body chunk by chunk, failing as soon as it grows past `limit`.
async fn read_capped<S, B>(chunks: S, limit: usize) -> Result<Vec<u8>, SearchError>
where
    S: Stream<Item = Result<B, SearchError>>,
    B: AsRef<[u8]>,
{
    futures_util::pin_mut!(chunks);
    let mut body = Vec::new();
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        let chunk = chunk.as_ref();
        let size = body.len() + chunk.len();
        if size > limit {
            return Err(SearchError::TooLarge {
                backend: BACKEND,
                size,
                limit,
            });
        }
        body.extend_from_slice(chunk);
    }
    Ok(body)
}
