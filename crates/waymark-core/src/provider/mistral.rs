//! Mistral chat-completions client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{
    CompletionRequest, Provider, ProviderError, ProviderKind, ProviderSettings, http_client,
    decode_error, http_error,
};

const KIND: ProviderKind = ProviderKind::Mistral;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl ChatResponse {
    fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()?
            .message?
            .content
            .filter(|text| !text.trim().is_empty())
    }
}

/// Client for `POST {base}/v1/chat/completions` with bearer auth.
pub struct MistralClient {
    http: reqwest::Client,
    settings: ProviderSettings,
}

impl MistralClient {
    pub fn new(settings: ProviderSettings, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            http: http_client(timeout, KIND)?,
            settings,
        })
    }
}

#[async_trait]
impl Provider for MistralClient {
    fn kind(&self) -> ProviderKind {
        KIND
    }

    fn is_configured(&self) -> bool {
        self.settings.usable_key(KIND).is_some()
    }

    fn default_model(&self) -> &str {
        &self.settings.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let key = self
            .settings
            .usable_key(KIND)
            .ok_or(ProviderError::Unconfigured { provider: KIND })?;

        let model = self.default_model();
        let body = ChatRequest {
            model,
            messages: [ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        tracing::debug!(provider = %KIND, model, "sending completion request");
        let response = self
            .http
            .post(self.settings.endpoint("/v1/chat/completions"))
            .bearer_auth(key)
            .json(&body)
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                provider: KIND,
                source,
            })?;

        if !response.status().is_success() {
            return Err(http_error(KIND, response).await);
        }

        let parsed: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| decode_error(KIND, e))?;

        parsed
            .into_text()
            .ok_or_else(|| ProviderError::InvalidResponse {
                provider: KIND,
                message: "response contained no message content".to_owned(),
            })
    }
}
