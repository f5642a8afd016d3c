use async_trait::async_trait;
use deckgen_common::SearchHit;
use serde::Deserialize;

use crate::{ImageHit, ImageSearch, SearchBackend, SearchError};

const BACKEND: &str = "google";
const ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";
/// The Custom Search API returns at most ten items per request.
const MAX_NUM: usize = 10;

#[derive(Deserialize)]
struct CseResponse {
    #[serde(default)]
    items: Vec<CseItem>,
}

#[derive(Deserialize)]
struct CseItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
    mime: Option<String>,
    image: Option<CseImage>,
}

#[derive(Deserialize)]
struct CseImage {
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
}

#[derive(Clone)]
struct CseClient {
    client: reqwest::Client,
    api_key: String,
    engine_id: String,
}

impl CseClient {
    async fn query(&self, params: &[(&str, &str)]) -> Result<String, SearchError> {
        let response = self
            .client
            .get(ENDPOINT)
            .query(&[("key", self.api_key.as_str()), ("cx", self.engine_id.as_str())])
            .query(params)
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

        response
            .text()
            .await
            .map_err(|source| SearchError::Request {
                backend: BACKEND,
                source,
            })
    }
}

/// Credentialed web search through the Google Custom Search JSON API.
#[derive(Clone)]
pub struct GoogleSearch {
    inner: CseClient,
}

impl GoogleSearch {
    pub fn new(client: reqwest::Client, api_key: &str, engine_id: &str) -> Self {
        Self {
            inner: CseClient {
                client,
                api_key: api_key.to_string(),
                engine_id: engine_id.to_string(),
            },
        }
    }
}

#[async_trait]
impl SearchBackend for GoogleSearch {
    fn name(&self) -> &'static str {
        BACKEND
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError> {
        tracing::debug!("google web query: {query}");
        let num = max_results.clamp(1, MAX_NUM).to_string();
        let body = self.inner.query(&[("q", query), ("num", &num)]).await?;
        let mut hits = parse_web_results(&body)?;
        hits.truncate(max_results);
        Ok(hits)
    }
}

/// Image search through the Google Custom Search JSON API (`searchType=image`).
#[derive(Clone)]
pub struct GoogleImageSearch {
    inner: CseClient,
    num: usize,
}

impl GoogleImageSearch {
    pub fn new(client: reqwest::Client, api_key: &str, engine_id: &str) -> Self {
        Self {
            inner: CseClient {
                client,
                api_key: api_key.to_string(),
                engine_id: engine_id.to_string(),
            },
            num: 5,
        }
    }

    /// Number of candidates requested per query.
    pub fn with_num(mut self, num: usize) -> Self {
        self.num = num.clamp(1, MAX_NUM);
        self
    }
}

#[async_trait]
impl ImageSearch for GoogleImageSearch {
    async fn search_images(&self, query: &str) -> Result<Vec<ImageHit>, SearchError> {
        tracing::debug!("google image query: {query}");
        let num = self.num.to_string();
        let body = self
            .inner
            .query(&[
                ("q", query),
                ("searchType", "image"),
                ("safe", "active"),
                ("num", &num),
            ])
            .await?;
        parse_image_results(&body)
    }
}

fn parse_response(body: &str) -> Result<CseResponse, SearchError> {
    serde_json::from_str(body).map_err(|e| SearchError::Parse {
        backend: BACKEND,
        reason: e.to_string(),
    })
}

pub(crate) fn parse_web_results(body: &str) -> Result<Vec<SearchHit>, SearchError> {
    Ok(parse_response(body)?
        .items
        .into_iter()
        .filter(|item| !item.snippet.trim().is_empty())
        .map(|item| SearchHit {
            title: item.title,
            snippet: item.snippet.split_whitespace().collect::<Vec<_>>().join(" "),
            url: item.link,
            backend: BACKEND.to_string(),
        })
        .collect())
}

pub(crate) fn parse_image_results(body: &str) -> Result<Vec<ImageHit>, SearchError> {
    Ok(parse_response(body)?
        .items
        .into_iter()
        .filter(|item| !item.link.is_empty())
        .map(|item| {
            let (width, height) = item
                .image
                .map(|img| (img.width, img.height))
                .unwrap_or((0, 0));
            ImageHit {
                url: item.link,
                width,
                height,
                mime_type: item.mime,
            }
        })
        .collect())
}
