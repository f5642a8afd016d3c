use async_trait::async_trait;
use deckgen_common::{ResearchContext, SlideContent, SlideDescriptor, SlideKind, Topic};
use deckgen_genai::TextGenerator;
use serde_json::Value;
use std::sync::Arc;

use crate::error::ContentGenerationError;
use crate::retry::{call_with_retry, CallError, RetryPolicy};

/// Upper bound on bullets kept per slide.
pub const MAX_BULLETS: usize = 6;

const NO_CONTEXT: &str = "No specific web context found.";

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "by", "for", "from", "how", "in", "into", "is", "it",
    "its", "of", "on", "or", "the", "their", "this", "to", "vs", "what", "why", "with",
];

/// Content generation stage, one call per slide descriptor.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate_content(
        &self,
        descriptor: &SlideDescriptor,
        topic: &Topic,
        context: &ResearchContext,
    ) -> Result<SlideContent, ContentGenerationError>;
}

/// Generates slide content with a generative text backend.
pub struct LlmContentGenerator {
    backend: Arc<dyn TextGenerator>,
    retry: RetryPolicy,
    excerpt_chars: usize,
}

impl LlmContentGenerator {
    pub fn new(backend: Arc<dyn TextGenerator>) -> Self {
        Self {
            backend,
            retry: RetryPolicy::default(),
            excerpt_chars: 1500,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_excerpt_chars(mut self, excerpt_chars: usize) -> Self {
        self.excerpt_chars = excerpt_chars;
        self
    }
}

#[async_trait]
impl ContentGenerator for LlmContentGenerator {
    async fn generate_content(
        &self,
        descriptor: &SlideDescriptor,
        topic: &Topic,
        context: &ResearchContext,
    ) -> Result<SlideContent, ContentGenerationError> {
        let position = descriptor.position;
        let prompt = build_prompt(descriptor, topic, context, self.excerpt_chars);
        let label = format!("{} content for slide {position}", self.backend.name());

        let raw = call_with_retry(self.retry, &label, || self.backend.generate(&prompt))
            .await
            .map_err(|e| match e {
                CallError::Failed(source) => ContentGenerationError::Backend { position, source },
                CallError::TimedOut(timeout) => {
                    ContentGenerationError::Timeout { position, timeout }
                }
            })?;

        tracing::debug!("slide {position} raw response: {raw}");
        parse_slide_content(&raw, descriptor, topic)
    }
}

/// Generate content for one slide, substituting the placeholder on failure.
pub async fn generate_or_placeholder(
    generator: &dyn ContentGenerator,
    descriptor: &SlideDescriptor,
    topic: &Topic,
    context: &ResearchContext,
) -> (SlideContent, Option<ContentGenerationError>) {
    match generator.generate_content(descriptor, topic, context).await {
        Ok(content) => (content, None),
        Err(e) => {
            tracing::warn!("Using placeholder content: {e}");
            (SlideContent::placeholder(descriptor), Some(e))
        }
    }
}

pub fn build_prompt(
    descriptor: &SlideDescriptor,
    topic: &Topic,
    context: &ResearchContext,
    excerpt_chars: usize,
) -> String {
    let excerpt = if context.is_empty() {
        NO_CONTEXT
    } else {
        context.excerpt(excerpt_chars)
    };

    let points_rule = match descriptor.kind {
        SlideKind::Title => "Leave \"points\" as an empty list.",
        _ => "Generate only 4 or 5 points. Each point must be a short but explanatory sentence, not just a heading.",
    };
    let image_rule = if descriptor.kind.wants_image() {
        "Set \"image_query\" to a simple, one or two-word search term for a stock photo that fits this slide."
    } else {
        "Set \"image_query\" to null."
    };

    format!(
        r#"Act as an expert presentation content writer.
Topic: "{topic}"
Slide {position} of type "{kind}". Purpose: {purpose}

Use the following web research as grounding:
{excerpt}

Write a "title" and a list of "points" for this slide.
{points_rule}
{image_rule}

Return a single, raw JSON object with exactly these keys and nothing else:
{{"title": "...", "points": ["..."], "image_query": "..." or null}}"#,
        position = descriptor.position,
        kind = descriptor.kind,
        purpose = descriptor.purpose,
    )
}

/// Validate a model response against the slide schema.
pub fn parse_slide_content(
    raw: &str,
    descriptor: &SlideDescriptor,
    topic: &Topic,
) -> Result<SlideContent, ContentGenerationError> {
    let position = descriptor.position;
    let invalid = |reason: String| ContentGenerationError::InvalidResponse { position, reason };

    let json = extract_json(raw).ok_or_else(|| invalid("no JSON object in response".to_string()))?;
    let value: Value =
        serde_json::from_str(json).map_err(|e| invalid(format!("malformed JSON: {e}")))?;
    let obj = value
        .as_object()
        .ok_or_else(|| invalid("response is not a JSON object".to_string()))?;

    let title = obj
        .get("title")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| invalid("missing title".to_string()))?
        .to_string();

    let bullets = match obj.get("points").or_else(|| obj.get("bullets")) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => {
            let mut bullets = Vec::with_capacity(items.len());
            for item in items {
                let text = item
                    .as_str()
                    .ok_or_else(|| invalid("points must be strings".to_string()))?
                    .trim();
                if !text.is_empty() {
                    bullets.push(text.to_string());
                }
            }
            bullets.truncate(MAX_BULLETS);
            bullets
        }
        Some(_) => return Err(invalid("points is not a list".to_string())),
    };

    if descriptor.kind.is_body() && bullets.is_empty() {
        return Err(invalid(format!("no points for {}", descriptor.kind)));
    }
    let bullets = if descriptor.kind.is_body() { bullets } else { Vec::new() };

    let image_query = if descriptor.kind.wants_image() {
        let query = obj
            .get("image_query")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string);
        Some(query.unwrap_or_else(|| derive_image_query(&title, topic)))
    } else {
        None
    };

    Ok(SlideContent {
        position,
        title,
        bullets,
        image_query,
    })
}

/// Strip Markdown code fences and return the outermost `{...}` span.
fn extract_json(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start < end).then(|| &raw[start..=end])
}

/// Two leading non-stopword words of the title, or the topic when there are none.
pub fn derive_image_query(title: &str, topic: &Topic) -> String {
    let words: Vec<&str> = title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 1)
        .filter(|w| !STOPWORDS.contains(&w.to_lowercase().as_str()))
        .take(2)
        .collect();
    if words.is_empty() {
        topic.as_str().to_string()
    } else {
        words.join(" ").to_lowercase()
    }
}
