//! Generative text backends.
//!
//! The pipeline only needs "prompt in, text out"; callers must treat the returned text
//! as untrusted and validate it.

use async_trait::async_trait;
use std::time::Duration;

mod client;
mod error;
mod gemini;
mod sse;

pub use client::OpenAiClient;
pub use error::GenAiError;
pub use gemini::GeminiClient;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &'static str;

    async fn generate(&self, prompt: &str) -> Result<String, GenAiError>;
}

pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!("falling back to default HTTP client: {e}");
            reqwest::Client::new()
        })
}
