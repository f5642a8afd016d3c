use async_trait::async_trait;
use deckgen_common::SearchHit;
use scraper::{ElementRef, Html, Selector};

use crate::{SearchBackend, SearchError};

const BACKEND: &str = "duckduckgo";
const ENDPOINT: &str = "https://html.duckduckgo.com/html/";
const USER_AGENT: &str = "Mozilla/5.0";

/// Credential-free web search against DuckDuckGo's HTML endpoint.
///
/// Best effort: the endpoint is rate limited and its markup can change without notice.
#[derive(Clone)]
pub struct DuckDuckGo {
    client: reqwest::Client,
}

impl DuckDuckGo {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGo {
    fn name(&self) -> &'static str {
        BACKEND
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError> {
        tracing::debug!("duckduckgo query: {query}");
        let response = self
            .client
            .get(ENDPOINT)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&[("q", query)])
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

        let html = response
            .text()
            .await
            .map_err(|source| SearchError::Request {
                backend: BACKEND,
                source,
            })?;
        parse_results(&html, max_results)
    }
}

fn selector(css: &str) -> Result<Selector, SearchError> {
    Selector::parse(css).map_err(|e| SearchError::Parse {
        backend: BACKEND,
        reason: format!("bad selector {css}: {e:?}"),
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extract result hits from a DuckDuckGo HTML results page.
pub(crate) fn parse_results(html: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError> {
    let document = Html::parse_document(html);
    let result_sel = selector("div.result")?;
    let title_sel = selector("a.result__a")?;
    let snippet_sel = selector(".result__snippet")?;

    let mut hits = Vec::new();
    for result in document.select(&result_sel) {
        if hits.len() >= max_results {
            break;
        }
        let Some(snippet) = result.select(&snippet_sel).next().map(element_text) else {
            continue;
        };
        if snippet.is_empty() {
            continue;
        }
        let anchor = result.select(&title_sel).next();
        let title = anchor.map(element_text).unwrap_or_default();
        let url = anchor
            .and_then(|a| a.value().attr("href"))
            .map(resolve_redirect)
            .unwrap_or_default();
        hits.push(SearchHit {
            title,
            snippet,
            url,
            backend: BACKEND.to_string(),
        });
    }

    // Older markup has snippets without the surrounding result container.
    if hits.is_empty() {
        hits = document
            .select(&snippet_sel)
            .map(element_text)
            .filter(|s| !s.is_empty())
            .take(max_results)
            .map(|snippet| SearchHit {
                title: String::new(),
                snippet,
                url: String::new(),
                backend: BACKEND.to_string(),
            })
            .collect();
    }

    Ok(hits)
}

/// Result links point at a `/l/?uddg=<target>` redirect; unwrap it to the target URL.
fn resolve_redirect(href: &str) -> String {
    let Some((_, rest)) = href.split_once("uddg=") else {
        return href.to_string();
    };
    let encoded = rest.split('&').next().unwrap_or_default();
    urlencoding::decode(encoded)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| href.to_string())
}
