//! Generative-text provider clients.
//!
//! Each provider issues exactly one HTTP request per completion and never
//! retries; the orchestrator decides what to do with failures.

pub mod gemini;
pub mod mistral;
pub mod registry;
pub mod trait_def;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub use gemini::GeminiClient;
pub use mistral::MistralClient;
pub use registry::ProviderRegistry;
pub use trait_def::Provider;

// ---------------------------------------------------------------------------
// Provider kind
// ---------------------------------------------------------------------------

/// The supported providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProviderKind {
    Gemini,
    Mistral,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Mistral => "mistral",
        }
    }

    /// Placeholder value shipped in sample env files; treated as "no key".
    fn placeholder_key(&self) -> &'static str {
        match self {
            Self::Gemini => "your-gemini-api-key-here",
            Self::Mistral => "your_mistral_api_key_here",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ProviderKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gemini" => Ok(Self::Gemini),
            "mistral" => Ok(Self::Mistral),
            other => Err(ProviderKindParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`ProviderKind`] string.
#[derive(Debug, Clone)]
pub struct ProviderKindParseError(pub String);

impl fmt::Display for ProviderKindParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid provider: {:?}", self.0)
    }
}

impl std::error::Error for ProviderKindParseError {}

// ---------------------------------------------------------------------------
// Requests and errors
// ---------------------------------------------------------------------------

/// A single completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Failures of a provider call.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{provider} API key not configured")]
    Unconfigured { provider: ProviderKind },

    #[error("{provider} API error: {status} - {body}")]
    Http {
        provider: ProviderKind,
        status: u16,
        body: String,
    },

    #[error("{provider} request failed: {source}")]
    Transport {
        provider: ProviderKind,
        source: reqwest::Error,
    },

    #[error("{provider} returned an unusable response: {message}")]
    InvalidResponse {
        provider: ProviderKind,
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Connection settings for one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    /// Raw credential as configured. See [`ProviderSettings::usable_key`].
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl ProviderSettings {
    pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
    pub const GEMINI_MODEL: &str = "gemini-2.0-flash";
    pub const MISTRAL_BASE_URL: &str = "https://api.mistral.ai";
    pub const MISTRAL_MODEL: &str = "mistral-small-latest";

    pub fn gemini(api_key: Option<String>) -> Self {
        Self {
            api_key,
            model: Self::GEMINI_MODEL.to_owned(),
            base_url: Self::GEMINI_BASE_URL.to_owned(),
        }
    }

    pub fn mistral(api_key: Option<String>) -> Self {
        Self {
            api_key,
            model: Self::MISTRAL_MODEL.to_owned(),
            base_url: Self::MISTRAL_BASE_URL.to_owned(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// The credential if it is present, non-blank, and not the sample
    /// placeholder for `kind`.
    pub fn usable_key(&self, kind: ProviderKind) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && *key != kind.placeholder_key())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Settings for every provider, loaded once at process start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvidersConfig {
    pub gemini: ProviderSettings,
    pub mistral: ProviderSettings,
    /// Whole-request timeout applied to every provider call.
    pub timeout: Duration,
}

impl ProvidersConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(gemini_key: Option<String>, mistral_key: Option<String>) -> Self {
        Self {
            gemini: ProviderSettings::gemini(gemini_key),
            mistral: ProviderSettings::mistral(mistral_key),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self::new(None, None)
    }
}

fn http_client(timeout: Duration, provider: ProviderKind) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|source| ProviderError::Transport { provider, source })
}

/// Map a failure while reading a success body. Timeouts and broken bodies
/// are transport failures; anything else is an unusable response.
fn decode_error(provider: ProviderKind, source: reqwest::Error) -> ProviderError {
    if source.is_timeout() || source.is_body() {
        ProviderError::Transport { provider, source }
    } else {
        ProviderError::InvalidResponse {
            provider,
            message: format!("failed to decode response body: {source}"),
        }
    }
}

/// Read a non-success response into [`ProviderError::Http`].
async fn http_error(provider: ProviderKind, response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ProviderError::Http {
        provider,
        status,
        body,
    }
}
