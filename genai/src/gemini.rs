use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::{GenAiError, TextGenerator};

const PROVIDER: &str = "gemini";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini `generateContent` client.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    pub model: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self::new_with_model(api_key, "gemini-2.5-flash".to_string())
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

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

fn request_body(prompt: &str) -> Value {
    serde_json::json!({
        "contents": [{"role": "user", "parts": [{"text": prompt}]}],
        "generationConfig": {"responseMimeType": "application/json"},
    })
}

/// Join the text parts of the first candidate.
fn parse_gemini_response(v: &Value) -> Result<String, GenAiError> {
    if let Some(reason) = v["promptFeedback"]["blockReason"].as_str() {
        return Err(GenAiError::Empty {
            provider: PROVIDER,
            reason: Some(format!("prompt blocked: {reason}")),
        });
    }

    let Some(candidate) = v["candidates"].get(0) else {
        return Err(GenAiError::Empty {
            provider: PROVIDER,
            reason: None,
        });
    };

    let text: String = candidate["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p["text"].as_str())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate["finishReason"]
            .as_str()
            .filter(|r| *r != "STOP")
            .map(|r| format!("finish reason {r}"));
        return Err(GenAiError::Empty {
            provider: PROVIDER,
            reason,
        });
    }
    Ok(text)
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenAiError> {
        tracing::debug!("gemini request: model={} prompt_chars={}", self.model, prompt.len());

        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(prompt))
            .send()
            .await
            .map_err(|source| GenAiError::Request {
                provider: PROVIDER,
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GenAiError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = resp.json().await.map_err(|e| GenAiError::Decode {
            provider: PROVIDER,
            reason: e.to_string(),
        })?;
        parse_gemini_response(&value)
    }
}
