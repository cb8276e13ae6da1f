//! Per-request orchestration: select a provider, call it once, parse the
//! answer, and substitute fallback content on any failure.
//!
//! The flow is straight-line, with no retries and no automatic switch to
//! the other provider:
//!
//! ```text
//! SELECT_PROVIDER -> CALL_PROVIDER -> PARSE -> RESPOND
//!        |                |             |
//!        +----------------+-------------+--> FALLBACK -> RESPOND
//! ```

use std::sync::Arc;

use crate::fallback;
use crate::model::{
    Category, FallbackReason, Generated, InstructionRequest, ProviderPreference, Roadmap,
    RoadmapRequest,
};
use crate::normalize::normalize;
use crate::parse::{InstructionParse, parse_instructions, parse_roadmap};
use crate::prompt;
use crate::provider::{CompletionRequest, ProviderError, ProviderKind, ProviderRegistry};

/// Sampling parameters for the two kinds of generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub roadmap_max_tokens: u32,
    pub instruction_max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            roadmap_max_tokens: 1500,
            instruction_max_tokens: 500,
            temperature: 0.7,
        }
    }
}

/// Choose the provider for a request.
///
/// An explicit preference wins when that provider is configured. Otherwise:
/// Gemini for travel planning if configured, then Mistral, then Gemini.
/// `None` means no provider is usable.
pub fn select_provider(
    registry: &ProviderRegistry,
    category: Category,
    preference: ProviderPreference,
) -> Option<ProviderKind> {
    if let Some(kind) = preference.explicit() {
        if registry.is_configured(kind) {
            return Some(kind);
        }
        tracing::debug!(provider = %kind, "requested provider not configured, using default precedence");
    }

    if category == Category::TravelPlanner && registry.is_configured(ProviderKind::Gemini) {
        return Some(ProviderKind::Gemini);
    }

    [ProviderKind::Mistral, ProviderKind::Gemini]
        .into_iter()
        .find(|kind| registry.is_configured(*kind))
}

/// Request handler core shared by the HTTP server and in-process clients.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    registry: Arc<ProviderRegistry>,
    settings: GenerationSettings,
}

impl Orchestrator {
    pub fn new(registry: Arc<ProviderRegistry>, settings: GenerationSettings) -> Self {
        Self { registry, settings }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    async fn call(
        &self,
        kind: ProviderKind,
        prompt: String,
        max_tokens: u32,
    ) -> Result<String, ProviderError> {
        let provider = self
            .registry
            .configured(kind)
            .ok_or(ProviderError::Unconfigured { provider: kind })?;
        tracing::debug!(provider = %kind, model = provider.default_model(), max_tokens, "calling provider");
        provider
            .complete(&CompletionRequest {
                prompt,
                max_tokens,
                temperature: self.settings.temperature,
            })
            .await
    }

    /// Generate a roadmap. Never fails: every error path yields the
    /// fallback roadmap tagged with the reason.
    pub async fn generate_roadmap(&self, request: &RoadmapRequest) -> Generated<Roadmap> {
        let goal = request.goal();
        let category = request.category();

        let Some(kind) = select_provider(&self.registry, category, ProviderPreference::Auto) else {
            tracing::info!(%category, "no provider configured, using fallback roadmap");
            return Generated::fallback(
                fallback::roadmap(goal, category),
                FallbackReason::Unconfigured,
            );
        };

        tracing::info!(provider = %kind, %category, "generating roadmap");
        let raw = match self
            .call(kind, prompt::roadmap_prompt(request), self.settings.roadmap_max_tokens)
            .await
        {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(provider = %kind, error = %err, "roadmap generation failed, using fallback");
                return Generated::fallback(
                    fallback::roadmap(goal, category),
                    FallbackReason::ProviderFailed(err.to_string()),
                );
            }
        };

        match parse_roadmap(&normalize(&raw)).into_roadmap(goal, category) {
            Some(roadmap) => {
                tracing::info!(
                    provider = %kind,
                    phases = roadmap.phases.len(),
                    steps = roadmap.step_count(),
                    "roadmap generated"
                );
                Generated::from_provider(roadmap, kind)
            }
            None => {
                tracing::warn!(provider = %kind, "no phases found in provider response, using fallback");
                Generated::fallback(fallback::roadmap(goal, category), FallbackReason::EmptyParse)
            }
        }
    }

    /// Generate step instructions. Never fails, like
    /// [`Orchestrator::generate_roadmap`].
    pub async fn generate_instructions(&self, request: &InstructionRequest) -> Generated<Vec<String>> {
        let description = request.step_description.as_str();
        let category = request.category;

        let Some(kind) = select_provider(&self.registry, category, request.preference) else {
            tracing::info!(%category, "no provider configured, using fallback instructions");
            return Generated::fallback(
                fallback::instructions(description, category),
                FallbackReason::Unconfigured,
            );
        };

        tracing::info!(provider = %kind, %category, preference = %request.preference, "generating instructions");
        let raw = match self
            .call(
                kind,
                prompt::instruction_prompt(request),
                self.settings.instruction_max_tokens,
            )
            .await
        {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(provider = %kind, error = %err, "instruction generation failed, using fallback");
                return Generated::fallback(
                    fallback::instructions(description, category),
                    FallbackReason::ProviderFailed(err.to_string()),
                );
            }
        };

        match parse_instructions(&normalize(&raw)) {
            InstructionParse::Parsed(list) => {
                tracing::info!(provider = %kind, count = list.len(), "instructions generated");
                Generated::from_provider(list, kind)
            }
            InstructionParse::Empty => {
                tracing::warn!(provider = %kind, "no instructions found in provider response, using fallback");
                Generated::fallback(
                    fallback::instructions(description, category),
                    FallbackReason::EmptyParse,
                )
            }
        }
    }
}
