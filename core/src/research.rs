use async_trait::async_trait;
use deckgen_common::{ResearchContext, SearchHit, Topic};
use deckgen_web_search::{SearchBackend, SearchError};
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::ResearchError;
use crate::retry::{call_with_retry, CallError, RetryPolicy};

/// Research stage: topic in, bounded text context out.
#[async_trait]
pub trait Research: Send + Sync {
    async fn research(&self, topic: &Topic) -> Result<ResearchContext, ResearchError>;
}

/// Queries an open backend and a credentialed backend concurrently and merges their snippets.
pub struct WebResearcher {
    open: Option<Arc<dyn SearchBackend>>,
    credentialed: Option<Arc<dyn SearchBackend>>,
    max_results: usize,
    char_budget: usize,
    retry: RetryPolicy,
}

impl WebResearcher {
    pub fn new(
        open: Option<Arc<dyn SearchBackend>>,
        credentialed: Option<Arc<dyn SearchBackend>>,
    ) -> Self {
        Self {
            open,
            credentialed,
            max_results: 5,
            char_budget: 2000,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_limits(mut self, max_results: usize, char_budget: usize) -> Self {
        self.max_results = max_results;
        self.char_budget = char_budget;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn query(
        &self,
        backend: &Option<Arc<dyn SearchBackend>>,
        query: &str,
    ) -> Option<Result<Vec<SearchHit>, CallError<SearchError>>> {
        let backend = backend.as_ref()?;
        let label = format!("{} search", backend.name());
        Some(
            call_with_retry(self.retry, &label, || {
                backend.search(query, self.max_results)
            })
            .await,
        )
    }
}

#[async_trait]
impl Research for WebResearcher {
    async fn research(&self, topic: &Topic) -> Result<ResearchContext, ResearchError> {
        if self.open.is_none() && self.credentialed.is_none() {
            tracing::warn!("No search backend configured, continuing without web context");
            return Ok(ResearchContext::empty());
        }

        let query = topic.as_str();
        let (open, credentialed) = tokio::join!(
            self.query(&self.open, query),
            self.query(&self.credentialed, query)
        );

        let mut failures = Vec::new();
        let mut succeeded = false;
        let mut take = |name: Option<&'static str>,
                        result: Option<Result<Vec<SearchHit>, CallError<SearchError>>>| {
            match (name, result) {
                (Some(name), Some(Ok(hits))) => {
                    tracing::info!("{name} returned {} results", hits.len());
                    succeeded = true;
                    hits
                }
                (Some(name), Some(Err(e))) => {
                    tracing::warn!("{name} search degraded: {e}");
                    failures.push(format!("{name}: {e}"));
                    Vec::new()
                }
                _ => Vec::new(),
            }
        };
        let credentialed_hits = take(self.credentialed.as_ref().map(|b| b.name()), credentialed);
        let open_hits = take(self.open.as_ref().map(|b| b.name()), open);

        if !succeeded {
            return Err(ResearchError::Unavailable { failures });
        }

        let context = merge_hits(credentialed_hits, open_hits, self.char_budget);
        tracing::info!(
            "Research context: {} chars from {} sources",
            context.text.chars().count(),
            context.sources.len()
        );
        Ok(context)
    }
}

/// Merge hits, higher-fidelity ones first, dropping near-identical snippets and capping the
/// combined text at `char_budget` characters.
pub fn merge_hits(
    preferred: Vec<SearchHit>,
    rest: Vec<SearchHit>,
    char_budget: usize,
) -> ResearchContext {
    let mut seen = HashSet::new();
    let mut text = String::new();
    let mut used = 0usize;
    let mut sources = Vec::new();

    for hit in preferred.into_iter().chain(rest) {
        let snippet = if hit.snippet.trim().is_empty() {
            hit.title.trim()
        } else {
            hit.snippet.trim()
        };
        let key = normalize(snippet);
        if key.is_empty() || !seen.insert(key) {
            continue;
        }

        let sep = usize::from(!text.is_empty());
        if used + sep >= char_budget {
            break;
        }
        let room = char_budget - used - sep;
        if sep == 1 {
            text.push(' ');
        }
        let piece: String = snippet.chars().take(room).collect();
        used += sep + piece.chars().count();
        text.push_str(&piece);
        sources.push(hit);
    }

    ResearchContext { text, sources }
}

/// Lowercase, alphanumerics only, single spaces.
fn normalize(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().next().unwrap_or(c)
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
