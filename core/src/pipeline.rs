use deckgen_common::{
    Deck, DeckConfig, Provider, ResearchContext, ResolvedImage, SlideContent, SlideDescriptor,
    Topic,
};
use deckgen_genai::{GeminiClient, OpenAiClient, TextGenerator};
use deckgen_web_search::{DuckDuckGo, GoogleImageSearch, GoogleSearch, HttpFetcher, SearchBackend};
use futures::stream::{self, StreamExt};
use std::sync::Arc;

use crate::assembly::assemble;
use crate::content::{generate_or_placeholder, ContentGenerator, LlmContentGenerator};
use crate::error::{ConfigError, ContentGenerationError, DeckError};
use crate::plan::build_plan;
use crate::research::{Research, WebResearcher};
use crate::retry::RetryPolicy;
use crate::visual::{ImageResolver, WebImageResolver};
use crate::writer::{writer_for, DocumentWriter};

/// What degraded during a run. A run with degradations still produces a full deck.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Set when every search backend failed.
    pub research_degraded: Option<String>,
    pub research_sources: usize,
    /// Positions that fell back to placeholder content, with the reason.
    pub placeholder_slides: Vec<(usize, String)>,
    pub images_resolved: Vec<usize>,
    /// Positions that asked for an image but got none.
    pub images_absent: Vec<usize>,
}

impl RunReport {
    pub fn is_degraded(&self) -> bool {
        self.research_degraded.is_some()
            || !self.placeholder_slides.is_empty()
            || !self.images_absent.is_empty()
    }
}

#[derive(Debug)]
pub struct RunOutput {
    pub deck: Deck,
    pub document: Vec<u8>,
    pub report: RunReport,
}

struct SlideOutcome {
    content: SlideContent,
    image: ResolvedImage,
    error: Option<ContentGenerationError>,
    wanted_image: bool,
}

/// Research, plan, per-slide content and imagery, assembly, rendering.
pub struct Pipeline {
    researcher: Arc<dyn Research>,
    generator: Arc<dyn ContentGenerator>,
    resolver: Arc<dyn ImageResolver>,
    writer: Box<dyn DocumentWriter>,
    concurrency: usize,
}

impl Pipeline {
    pub fn new(
        researcher: Arc<dyn Research>,
        generator: Arc<dyn ContentGenerator>,
        resolver: Arc<dyn ImageResolver>,
        writer: Box<dyn DocumentWriter>,
    ) -> Self {
        Self {
            researcher,
            generator,
            resolver,
            writer,
            concurrency: 1,
        }
    }

    /// Number of slides processed at once.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Build the production pipeline. Fails if a required credential is missing.
    pub fn from_config(config: &DeckConfig) -> Result<Self, DeckError> {
        config.validate()?;

        let timeout = config.request_timeout();
        let retry = RetryPolicy::from_config(config);
        let client = deckgen_web_search::http_client(timeout).map_err(|e| {
            ConfigError::InvalidValue {
                field: "http_client".to_string(),
                value: e.to_string(),
            }
        })?;

        let key = config.generative_key()?.to_string();
        let model = config.model().to_string();
        let backend: Arc<dyn TextGenerator> = match config.provider {
            Provider::Gemini => {
                Arc::new(GeminiClient::new_with_model(key, model).with_timeout(timeout))
            }
            Provider::OpenAi => {
                Arc::new(OpenAiClient::new_with_model(key, model).with_timeout(timeout))
            }
        };
        tracing::info!("Content backend: {} ({})", backend.name(), config.model());
        let generator = LlmContentGenerator::new(backend)
            .with_retry(retry)
            .with_excerpt_chars(config.prompt_excerpt_chars);

        let open: Option<Arc<dyn SearchBackend>> = config
            .duckduckgo_enabled
            .then(|| Arc::new(DuckDuckGo::new(client.clone())) as Arc<dyn SearchBackend>);
        let credentialed: Option<Arc<dyn SearchBackend>> =
            config.search_credentials().map(|(key, cx)| {
                Arc::new(GoogleSearch::new(client.clone(), key, cx)) as Arc<dyn SearchBackend>
            });
        if credentialed.is_none() {
            tracing::info!("Google search not configured, using open web search only");
        }
        let researcher = WebResearcher::new(open, credentialed)
            .with_limits(config.max_results_per_backend, config.context_char_budget)
            .with_retry(retry);

        let resolver = match config.image_credentials() {
            Some((key, cx)) => WebImageResolver::new(
                Arc::new(
                    GoogleImageSearch::new(client.clone(), key, cx)
                        .with_num(config.image_candidates),
                ),
                Arc::new(HttpFetcher::new(client.clone()).with_max_bytes(config.max_image_bytes)),
            ),
            None => {
                tracing::info!("Image search not configured, slides will have no images");
                WebImageResolver::disabled()
            }
        }
        .with_min_size(config.min_image_width, config.min_image_height)
        .with_retry(retry);

        Ok(Self::new(
            Arc::new(researcher),
            Arc::new(generator),
            Arc::new(resolver),
            writer_for(config.format),
        )
        .with_concurrency(config.concurrency))
    }

    /// Run every stage for `topic`. Only configuration and structural errors are returned;
    /// all other failures are logged, recorded in the report, and replaced with fallbacks.
    pub async fn run(&self, topic: &str) -> Result<RunOutput, DeckError> {
        let topic = Topic::new(topic)?;
        let mut report = RunReport::default();
        tracing::info!("Starting presentation generation for '{topic}'");

        let context = match self.researcher.research(&topic).await {
            Ok(context) => context,
            Err(e) => {
                tracing::warn!("Research unavailable, continuing without context: {e}");
                report.research_degraded = Some(e.to_string());
                ResearchContext::empty()
            }
        };
        report.research_sources = context.sources.len();

        let plan = build_plan(&topic);
        tracing::info!("Planned {} slides", plan.len());

        let mut outcomes: Vec<SlideOutcome> = stream::iter(plan.slides.iter())
            .map(|descriptor| self.process_slide(descriptor, &topic, &context))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;
        outcomes.sort_by_key(|o| o.content.position);

        let mut contents = Vec::with_capacity(outcomes.len());
        let mut images = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            let position = outcome.content.position;
            if let Some(e) = outcome.error {
                report.placeholder_slides.push((e.position(), e.to_string()));
            }
            if outcome.wanted_image {
                if outcome.image.is_absent() {
                    report.images_absent.push(position);
                } else {
                    report.images_resolved.push(position);
                }
            }
            contents.push(outcome.content);
            images.push(outcome.image);
        }

        let deck = assemble(&topic, &plan, contents, images)?;
        let document = self.writer.render(&deck)?;
        tracing::info!(
            "Presentation assembled: {} slides, {} bytes",
            deck.len(),
            document.len()
        );

        Ok(RunOutput {
            deck,
            document,
            report,
        })
    }

    async fn process_slide(
        &self,
        descriptor: &SlideDescriptor,
        topic: &Topic,
        context: &ResearchContext,
    ) -> SlideOutcome {
        tracing::info!(
            "Generating slide {} ({})",
            descriptor.position,
            descriptor.kind
        );
        let (content, error) =
            generate_or_placeholder(self.generator.as_ref(), descriptor, topic, context).await;
        let wanted_image = content.image_query().is_some();
        let image = self.resolver.resolve_image(&content).await;
        SlideOutcome {
            content,
            image,
            error,
            wanted_image,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckgen_common::OutputFormat;

    #[test]
    fn test_from_config_requires_generative_key() {
        let config = DeckConfig::default();
        let err = Pipeline::from_config(&config).err().unwrap();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("GOOGLE_API_KEY"));
    }

    #[test]
    fn test_from_config_without_optional_keys() {
        let mut config = DeckConfig::default();
        config.credentials.google_api_key = Some("key".to_string());
        config.format = OutputFormat::Markdown;
        config.concurrency = 0;
        assert!(Pipeline::from_config(&config).is_err());
        config.concurrency = 3;
        let pipeline = Pipeline::from_config(&config).unwrap();
        assert_eq!(pipeline.concurrency, 3);
        assert_eq!(pipeline.writer.format(), OutputFormat::Markdown);
    }

    #[test]
    fn test_report_degradation() {
        let mut report = RunReport::default();
        assert!(!report.is_degraded());
        report.images_absent.push(3);
        assert!(report.is_degraded());
    }
}
