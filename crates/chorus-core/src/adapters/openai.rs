//! OpenAI text adapter using the Chat Completions API.
//!
//! The endpoint is configurable, so any OpenAI-compatible backend can be
//! pulled into a comparison.

use super::{ProviderAdapter, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use crate::error::{ProviderError, ProviderResult};
use crate::types::{Modality, Payload, Prompt, ProviderSpec};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OpenAI adapter using the Chat Completions API.
pub struct OpenAiAdapter {
    spec: ProviderSpec,
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl OpenAiAdapter {
    pub fn new(endpoint: &str, api_key: &str, model: &str, timeout: Duration) -> Self {
        Self {
            spec: ProviderSpec::new("openai", model, Modality::Text),
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

// --- Request types ---

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

// --- Response types ---

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn spec(&self) -> &ProviderSpec {
        &self.spec
    }

    async fn generate(&self, prompt: &Prompt) -> ProviderResult<Payload> {
        let params = prompt.params();
        let body = ChatRequest {
            model: self.spec.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.text().to_string(),
            }],
            max_tokens: params.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: params.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(&e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(
                status.as_u16(),
                format!("OpenAI HTTP {status}: {text}"),
            ));
        }

        let chat_resp: ChatResponse = resp.json().await.map_err(|e| ProviderError::Unknown {
            message: format!("Failed to parse OpenAI response: {e}"),
        })?;

        let text = chat_resp
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| ProviderError::Unknown {
                message: "OpenAI returned empty choices array".to_string(),
            })?;

        Ok(Payload::text(text.trim().to_string()))
    }
}
