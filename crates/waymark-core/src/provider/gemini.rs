//! Google Gemini `generateContent` client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{
    CompletionRequest, Provider, ProviderError, ProviderKind, ProviderSettings, http_client,
    decode_error, http_error,
};

const KIND: ProviderKind = ProviderKind::Gemini;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [TextPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, parts concatenated.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        if text.trim().is_empty() { None } else { Some(text) }
    }
}

/// Client for `POST {base}/v1beta/models/{model}:generateContent`.
pub struct GeminiClient {
    http: reqwest::Client,
    settings: ProviderSettings,
}

impl GeminiClient {
    pub fn new(settings: ProviderSettings, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            http: http_client(timeout, KIND)?,
            settings,
        })
    }
}

#[async_trait]
impl Provider for GeminiClient {
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
        let url = self
            .settings
            .endpoint(&format!("/v1beta/models/{model}:generateContent"));
        let body = GenerateContentRequest {
            contents: [Content {
                parts: [TextPart {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: request.max_tokens,
                temperature: request.temperature,
            },
        };

        tracing::debug!(provider = %KIND, model, "sending completion request");
        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", key)
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

        let parsed: GenerateContentResponse =
            response
                .json()
                .await
                .map_err(|e| decode_error(KIND, e))?;

        parsed
            .into_text()
            .ok_or_else(|| ProviderError::InvalidResponse {
                provider: KIND,
                message: "response contained no candidate text".to_owned(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_uses_camel_case_fields() {
        let body = GenerateContentRequest {
            contents: [Content {
                parts: [TextPart { text: "hi" }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: 100,
                temperature: 0.5,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 100);
    }

    #[test]
    fn response_text_joins_parts_of_first_candidate() {
        let raw = serde_json::json!({
            "candidates": [
                { "content": { "parts": [ { "text": "Phase 1: A\n" }, { "text": "1.1 b" } ] } },
                { "content": { "parts": [ { "text": "ignored" } ] } }
            ]
        });
        let parsed: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.into_text().as_deref(), Some("Phase 1: A\n1.1 b"));
    }

    #[test]
    fn response_without_candidates_has_no_text() {
        let parsed: GenerateContentResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(parsed.into_text().is_none());
    }

    #[tokio::test]
    async fn unconfigured_client_fails_without_network() {
        // Unroutable base URL: any network attempt would surface as Transport.
        let settings = ProviderSettings::gemini(None).with_base_url("http://192.0.2.1:9");
        let client = GeminiClient::new(settings, Duration::from_millis(50)).unwrap();
        assert!(!client.is_configured());
        let err = client
            .complete(&CompletionRequest {
                prompt: "x".into(),
                max_tokens: 1,
                temperature: 0.0,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Unconfigured { provider: ProviderKind::Gemini }));
    }
}
