use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ConfigError;

/// Number of slides in every generated deck.
pub const PLAN_LEN: usize = 7;

/// The subject of a deck. Always non-empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Topic(String);

impl Topic {
    pub fn new(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyTopic);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single result returned by a web search backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
    pub url: String,
    pub backend: String,
}

/// Compact text summary of the web findings for a topic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchContext {
    pub text: String,
    pub sources: Vec<SearchHit>,
}

impl ResearchContext {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Leading excerpt of the context, cut on a character boundary.
    pub fn excerpt(&self, max_chars: usize) -> &str {
        match self.text.char_indices().nth(max_chars) {
            Some((idx, _)) => &self.text[..idx],
            None => &self.text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideKind {
    Title,
    Overview,
    KeyPoint,
    Conclusion,
}

impl SlideKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlideKind::Title => "title_slide",
            SlideKind::Overview => "overview_slide",
            SlideKind::KeyPoint => "key_point_slide",
            SlideKind::Conclusion => "conclusion_slide",
        }
    }

    /// Body slides carry a bullet list; the title slide does not.
    pub fn is_body(&self) -> bool {
        !matches!(self, SlideKind::Title)
    }

    pub fn wants_image(&self) -> bool {
        matches!(self, SlideKind::KeyPoint)
    }
}

impl fmt::Display for SlideKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A planned slide before any content exists for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideDescriptor {
    /// 1-based, defines final ordering.
    pub position: usize,
    pub kind: SlideKind,
    pub purpose: String,
}

/// The fixed, ordered list of slide descriptors for a deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationPlan {
    pub slides: Vec<SlideDescriptor>,
}

impl PresentationPlan {
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&SlideDescriptor> {
        self.slides.iter().find(|d| d.position == position)
    }

    pub fn kinds(&self) -> Vec<SlideKind> {
        self.slides.iter().map(|d| d.kind).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideContent {
    pub position: usize,
    pub title: String,
    pub bullets: Vec<String>,
    pub image_query: Option<String>,
}

impl SlideContent {
    /// Deterministic stand-in used when generation for a slide fails.
    pub fn placeholder(descriptor: &SlideDescriptor) -> Self {
        Self {
            position: descriptor.position,
            title: title_from_purpose(&descriptor.purpose, descriptor.position),
            bullets: Vec::new(),
            image_query: None,
        }
    }

    /// The image query, if present and not blank.
    pub fn image_query(&self) -> Option<&str> {
        self.image_query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }
}

const MAX_TITLE_CHARS: usize = 80;

fn title_from_purpose(purpose: &str, position: usize) -> String {
    let title: String = purpose
        .trim()
        .trim_end_matches(['.', '!', '?', ':', ';'])
        .chars()
        .take(MAX_TITLE_CHARS)
        .collect();
    let title = title.trim().to_string();
    if title.is_empty() {
        format!("Slide {position}")
    } else {
        title
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Absent,
}

impl ImageFormat {
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            ImageFormat::Jpeg => Some("jpeg"),
            ImageFormat::Png => Some("png"),
            ImageFormat::Absent => None,
        }
    }

    pub fn mime_type(&self) -> Option<&'static str> {
        match self {
            ImageFormat::Jpeg => Some("image/jpeg"),
            ImageFormat::Png => Some("image/png"),
            ImageFormat::Absent => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    pub position: usize,
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    /// Pixel width and height of the decoded image.
    pub dimensions: Option<(u32, u32)>,
}

impl ResolvedImage {
    pub fn absent(position: usize) -> Self {
        Self {
            position,
            bytes: Vec::new(),
            format: ImageFormat::Absent,
            dimensions: None,
        }
    }

    pub fn is_absent(&self) -> bool {
        self.format == ImageFormat::Absent || self.bytes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckSlide {
    pub kind: SlideKind,
    pub content: SlideContent,
    pub image: ResolvedImage,
}

impl DeckSlide {
    pub fn position(&self) -> usize {
        self.content.position
    }
}

/// Ordered slides ready to be rendered, positions 1..=N.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    pub topic: Topic,
    pub slides: Vec<DeckSlide>,
}

impl Deck {
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_trims_and_rejects_blank() {
        assert_eq!(Topic::new("  Solar Energy ").unwrap().as_str(), "Solar Energy");
        assert!(matches!(Topic::new("   \t"), Err(ConfigError::EmptyTopic)));
        assert!(matches!(Topic::new(""), Err(ConfigError::EmptyTopic)));
    }

    #[test]
    fn test_placeholder_title_from_purpose() {
        let descriptor = SlideDescriptor {
            position: 3,
            kind: SlideKind::KeyPoint,
            purpose: "The first key point or trend about Tides.".to_string(),
        };
        let placeholder = SlideContent::placeholder(&descriptor);
        assert_eq!(placeholder.position, 3);
        assert_eq!(placeholder.title, "The first key point or trend about Tides");
        assert!(placeholder.bullets.is_empty());
        assert!(placeholder.image_query.is_none());
    }

    #[test]
    fn test_placeholder_title_never_empty() {
        let descriptor = SlideDescriptor {
            position: 5,
            kind: SlideKind::KeyPoint,
            purpose: " ... ".to_string(),
        };
        assert_eq!(SlideContent::placeholder(&descriptor).title, "Slide 5");
    }

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        let ctx = ResearchContext {
            text: "énergie solaire".to_string(),
            sources: Vec::new(),
        };
        assert_eq!(ctx.excerpt(3), "éne");
        assert_eq!(ctx.excerpt(100), "énergie solaire");
    }

    #[test]
    fn test_blank_image_query_is_none() {
        let content = SlideContent {
            position: 4,
            title: "Panels".to_string(),
            bullets: vec!["a".to_string()],
            image_query: Some("   ".to_string()),
        };
        assert_eq!(content.image_query(), None);
    }
}
