use async_trait::async_trait;
use futures_util::StreamExt;
use std::time::Duration;

use crate::sse::{SseDecoder, SseEvent};
use crate::{GenAiError, TextGenerator};

const PROVIDER: &str = "openai";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI Chat Completions client. Responses are streamed over SSE and collected.
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    pub model: String,
}

impl OpenAiClient {
    pub fn new(api_key: String) -> Self {
        Self::new_with_model(api_key, "gpt-4o-mini".to_string())
    }

    pub fn new_with_model(api_key: String, model: String) -> Self {
        Self {
            client: crate::http_client(Duration::from_secs(60)),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = crate::http_client(timeout);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "response_format": {"type": "json_object"},
            "stream": true,
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenAiError> {
        let body = self.request_body(prompt);
        tracing::debug!("openai request: model={} prompt_chars={}", self.model, prompt.len());

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|source| GenAiError::Request {
                provider: PROVIDER,
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(GenAiError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
                body: text,
            });
        }

        let mut stream = Box::pin(resp.bytes_stream());
        let mut decoder = SseDecoder::new();
        let mut out = String::new();
        'outer: while let Some(chunk) = stream.next().await {
            let bytes = chunk.map_err(|source| GenAiError::Request {
                provider: PROVIDER,
                source,
            })?;
            for event in decoder.push(&bytes) {
                match event {
                    SseEvent::Delta(delta) => out.push_str(&delta),
                    SseEvent::Done => break 'outer,
                }
            }
        }
        tracing::debug!("openai stream finished ({} chars)", out.len());

        if out.trim().is_empty() {
            return Err(GenAiError::Empty {
                provider: PROVIDER,
                reason: None,
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_streams_json() {
        let client = OpenAiClient::new_with_model("k".to_string(), "gpt-4o".to_string())
            .with_base_url("http://localhost:9999/v1/");
        let body = client.request_body("hello");
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["stream"], true);
        assert_eq!(body["messages"][0]["content"], "hello");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(client.base_url, "http://localhost:9999/v1");
    }
}
