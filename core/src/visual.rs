use async_trait::async_trait;
use deckgen_common::{ImageFormat, ResolvedImage, SlideContent};
use deckgen_web_search::{Fetch, ImageHit, ImageSearch};
use std::io::Cursor;
use std::sync::Arc;

use crate::error::ImageResolutionError;
use crate::retry::{call_with_retry, CallError, RetryPolicy};

/// Visual resolution stage. Never fails: every problem degrades to an absent image.
#[async_trait]
pub trait ImageResolver: Send + Sync {
    async fn resolve_image(&self, content: &SlideContent) -> ResolvedImage;
}

/// Resolves images through an image search backend and a downloader.
pub struct WebImageResolver {
    backend: Option<(Arc<dyn ImageSearch>, Arc<dyn Fetch>)>,
    min_width: u32,
    min_height: u32,
    retry: RetryPolicy,
}

impl WebImageResolver {
    pub fn new(search: Arc<dyn ImageSearch>, fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            backend: Some((search, fetcher)),
            ..Self::disabled()
        }
    }

    /// A resolver with no image backend; it always yields absent images.
    pub fn disabled() -> Self {
        Self {
            backend: None,
            min_width: 400,
            min_height: 300,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_min_size(mut self, min_width: u32, min_height: u32) -> Self {
        self.min_width = min_width;
        self.min_height = min_height;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Resolve an image, reporting why it could not be found.
    pub async fn try_resolve(
        &self,
        content: &SlideContent,
    ) -> Result<ResolvedImage, ImageResolutionError> {
        let position = content.position;
        let Some(query) = content.image_query() else {
            return Ok(ResolvedImage::absent(position));
        };
        let Some((search, fetcher)) = &self.backend else {
            return Ok(ResolvedImage::absent(position));
        };

        let hits = call_with_retry(self.retry, "image search", || search.search_images(query))
            .await
            .map_err(|e| match e {
                CallError::Failed(source) => ImageResolutionError::Search {
                    query: query.to_string(),
                    source,
                },
                CallError::TimedOut(timeout) => ImageResolutionError::Timeout { timeout },
            })?;

        let hit = hits
            .iter()
            .find(|hit| is_admissible(hit, self.min_width, self.min_height))
            .ok_or_else(|| ImageResolutionError::NoAdmissibleHit {
                query: query.to_string(),
                seen: hits.len(),
            })?;
        tracing::debug!("slide {position}: downloading {}", hit.url);

        let bytes = call_with_retry(self.retry, "image download", || fetcher.fetch(&hit.url))
            .await
            .map_err(|e| match e {
                CallError::Failed(source) => ImageResolutionError::Download {
                    url: hit.url.clone(),
                    source,
                },
                CallError::TimedOut(timeout) => ImageResolutionError::Timeout { timeout },
            })?;

        let url = hit.url.clone();
        let decoded = tokio::task::spawn_blocking(move || decode_image(bytes))
            .await
            .map_err(|e| e.to_string())
            .and_then(|r| r);
        let (format, bytes, dimensions) =
            decoded.map_err(|reason| ImageResolutionError::Decode { url, reason })?;

        Ok(ResolvedImage {
            position,
            bytes,
            format,
            dimensions: Some(dimensions),
        })
    }
}

#[async_trait]
impl ImageResolver for WebImageResolver {
    async fn resolve_image(&self, content: &SlideContent) -> ResolvedImage {
        match self.try_resolve(content).await {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!("slide {}: no image: {e}", content.position);
                ResolvedImage::absent(content.position)
            }
        }
    }
}

/// Large enough and in an allowed format. A reported mime type decides the format; the URL
/// extension is only consulted when the backend reports none.
pub fn is_admissible(hit: &ImageHit, min_width: u32, min_height: u32) -> bool {
    if hit.width < min_width || hit.height < min_height {
        return false;
    }
    match hit.mime_type.as_deref() {
        Some(mime) => matches!(
            mime.trim().to_ascii_lowercase().as_str(),
            "image/jpeg" | "image/jpg" | "image/png"
        ),
        None => hit
            .url_extension()
            .is_some_and(|ext| matches!(ext.as_str(), "jpg" | "jpeg" | "png")),
    }
}

/// Decode downloaded bytes. JPEG and PNG are kept verbatim, other formats become PNG.
fn decode_image(bytes: Vec<u8>) -> Result<(ImageFormat, Vec<u8>, (u32, u32)), String> {
    let format = image::guess_format(&bytes).map_err(|e| e.to_string())?;
    let img = image::load_from_memory_with_format(&bytes, format).map_err(|e| e.to_string())?;
    let dimensions = (img.width(), img.height());
    match format {
        image::ImageFormat::Jpeg => Ok((ImageFormat::Jpeg, bytes, dimensions)),
        image::ImageFormat::Png => Ok((ImageFormat::Png, bytes, dimensions)),
        other => {
            tracing::debug!("converting {other:?} image to PNG");
            let mut out = Cursor::new(Vec::new());
            img.write_to(&mut out, image::ImageFormat::Png)
                .map_err(|e| e.to_string())?;
            Ok((ImageFormat::Png, out.into_inner(), dimensions))
        }
    }
}
