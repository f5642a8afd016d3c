use async_trait::async_trait;
use deckgen_common::{ConfigError, SearchHit, SlideKind, Topic};
use deckgen_core::retry::RetryPolicy;
use deckgen_core::{
    DeckError, LlmContentGenerator, MarkdownWriter, Pipeline, PptxWriter, WebImageResolver,
    WebResearcher,
};
use deckgen_genai::{GenAiError, TextGenerator};
use deckgen_web_search::{SearchBackend, SearchError};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Answers every prompt with well-formed slide JSON. Slides listed in `broken` get prose instead.
struct FakeModel {
    calls: AtomicUsize,
    broken: Vec<usize>,
    delay_by_position: bool,
}

impl FakeModel {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            broken: Vec::new(),
            delay_by_position: false,
        })
    }
}

fn slide_position(prompt: &str) -> usize {
    prompt
        .split("Slide ")
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

#[async_trait]
impl TextGenerator for FakeModel {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenAiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let position = slide_position(prompt);
        if self.delay_by_position {
            // Earlier slides finish last.
            tokio::time::sleep(Duration::from_millis(10 * (8 - position as u64))).await;
        }
        if self.broken.contains(&position) {
            return Ok("Sorry, I can't produce JSON today.".to_string());
        }
        let reply = if prompt.contains("\"title_slide\"") {
            serde_json::json!({"title": "Harnessing the Sun", "points": []})
        } else {
            serde_json::json!({
                "title": format!("Point {position}"),
                "points": [
                    format!("Slide {position} explains one idea."),
                    "Solar capacity keeps growing every year.",
                ],
                "image_query": "solar panel",
            })
        };
        Ok(format!("```json\n{reply}\n```"))
    }
}

struct CountingSearch {
    calls: AtomicUsize,
    fail: bool,
}

#[async_trait]
impl SearchBackend for CountingSearch {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn search(&self, query: &str, _max: usize) -> Result<Vec<SearchHit>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SearchError::Status {
                backend: "counting",
                status: 503,
            });
        }
        Ok(vec![SearchHit {
            title: query.to_string(),
            snippet: format!("{query} is growing fast."),
            url: "https://example.com".to_string(),
            backend: "counting".to_string(),
        }])
    }
}

fn no_retry() -> RetryPolicy {
    RetryPolicy::once(Duration::from_secs(5))
}

fn pipeline(model: Arc<FakeModel>, search: Arc<CountingSearch>) -> Pipeline {
    let researcher =
        WebResearcher::new(Some(search as Arc<dyn SearchBackend>), None).with_retry(no_retry());
    let generator = LlmContentGenerator::new(model).with_retry(no_retry());
    Pipeline::new(
        Arc::new(researcher),
        Arc::new(generator),
        Arc::new(WebImageResolver::disabled()),
        Box::new(PptxWriter::default()),
    )
}

#[tokio::test]
async fn solar_energy_without_search_or_image_credentials() {
    let model = FakeModel::new();
    let search = Arc::new(CountingSearch {
        calls: AtomicUsize::new(0),
        fail: true,
    });
    let output = pipeline(model.clone(), search.clone())
        .run("Solar Energy")
        .await
        .unwrap();

    let deck = &output.deck;
    assert_eq!(deck.topic, Topic::new("Solar Energy").unwrap());
    assert_eq!(deck.len(), 7);
    for (i, slide) in deck.slides.iter().enumerate() {
        assert_eq!(slide.position(), i + 1);
        assert!(!slide.content.title.is_empty());
        if slide.kind.is_body() {
            assert!(!slide.content.bullets.is_empty(), "slide {} has no bullets", i + 1);
        }
        assert!(slide.image.is_absent());
        assert!(slide.image.bytes.is_empty());
    }
    assert_eq!(deck.slides[0].kind, SlideKind::Title);
    assert_eq!(model.calls.load(Ordering::SeqCst), 7);

    assert!(output.report.research_degraded.is_some());
    assert_eq!(output.report.images_absent, vec![3, 4, 5, 6]);
    assert!(output.report.placeholder_slides.is_empty());

    let archive = zip::ZipArchive::new(Cursor::new(output.document.as_slice())).unwrap();
    let slide_parts = archive
        .file_names()
        .filter(|n| n.starts_with("ppt/slides/slide") && n.ends_with(".xml"))
        .count();
    assert_eq!(slide_parts, 7);
}

#[tokio::test]
async fn empty_topic_fails_before_any_backend_call() {
    let model = FakeModel::new();
    let search = Arc::new(CountingSearch {
        calls: AtomicUsize::new(0),
        fail: false,
    });
    let err = pipeline(model.clone(), search.clone())
        .run("   ")
        .await
        .unwrap_err();

    assert!(matches!(err, DeckError::Config(ConfigError::EmptyTopic)));
    assert!(err.is_fatal());
    assert!(err.to_string().contains("empty"));
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    assert_eq!(search.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_slide_degrades_without_cancelling_siblings() {
    let model = Arc::new(FakeModel {
        calls: AtomicUsize::new(0),
        broken: vec![4],
        delay_by_position: true,
    });
    let search = Arc::new(CountingSearch {
        calls: AtomicUsize::new(0),
        fail: false,
    });
    let output = pipeline(model.clone(), search)
        .with_concurrency(4)
        .run("Solar Energy")
        .await
        .unwrap();

    let positions: Vec<usize> = output.deck.slides.iter().map(|s| s.position()).collect();
    assert_eq!(positions, (1..=7).collect::<Vec<_>>());
    assert_eq!(model.calls.load(Ordering::SeqCst), 7);

    let placeholder = &output.deck.slides[3];
    assert_eq!(placeholder.content.title, "The second key point or argument about Solar Energy");
    assert!(placeholder.content.bullets.is_empty());
    assert_eq!(output.report.placeholder_slides.len(), 1);
    assert_eq!(output.report.placeholder_slides[0].0, 4);
    assert_eq!(output.deck.slides[4].content.title, "Point 5");
    assert!(output.report.research_degraded.is_none());
    assert_eq!(output.report.research_sources, 1);
}

#[tokio::test]
async fn markdown_output_has_seven_slides() {
    let researcher = WebResearcher::new(None, None);
    let generator = LlmContentGenerator::new(FakeModel::new()).with_retry(no_retry());
    let output = Pipeline::new(
        Arc::new(researcher),
        Arc::new(generator),
        Arc::new(WebImageResolver::disabled()),
        Box::new(MarkdownWriter),
    )
    .run("Solar Energy")
    .await
    .unwrap();

    let text = String::from_utf8(output.document).unwrap();
    assert_eq!(text.matches("\n---\n").count(), 6);
    assert!(text.starts_with("# Harnessing the Sun"));
    assert!(text.contains("*A Presentation on Solar Energy*"));
    assert!(!text.contains("data:image"));
}
