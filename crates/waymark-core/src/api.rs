//! JSON wire types for the HTTP API, shared by the server and
//! [`crate::source::RemoteSource`].
//!
//! Version 2 (phases with nested steps) is canonical. Version 1 (a flat step
//! list) is served only on the legacy route and is derived from the same
//! roadmap.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    Category, FallbackReason, Generated, InstructionRequest, Phase, ProviderPreference, Roadmap,
    RoadmapRequest, Source, Step, ValidationError,
};
use crate::provider::ProviderKind;

/// Current roadmap API version.
pub const API_VERSION: u32 = 2;

/// Legacy flat-list roadmap API version.
pub const LEGACY_API_VERSION: u32 = 1;

/// RFC 3339 UTC timestamp with millisecond precision.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_category(raw: Option<&str>) -> Result<Category, ValidationError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(tag) => Ok(tag.parse()?),
        None => Ok(Category::default()),
    }
}

/// Rebuild a [`Source`] from the wire `aiUsed` tag.
fn source_from_wire(ai_used: &str, note: Option<String>) -> Source {
    match ai_used.parse::<ProviderKind>() {
        Ok(kind) => Source::Provider(kind),
        Err(_) => Source::Fallback(FallbackReason::Remote(note)),
    }
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body of `POST /api/generate-roadmap`. Fields are optional on the wire so
/// that missing values produce a validation error rather than a decode error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRoadmapBody {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl GenerateRoadmapBody {
    pub fn validate(&self) -> Result<RoadmapRequest, ValidationError> {
        let category = parse_category(self.category.as_deref())?;
        RoadmapRequest::new(self.prompt.as_deref().unwrap_or_default(), category)
    }
}

impl From<&RoadmapRequest> for GenerateRoadmapBody {
    fn from(request: &RoadmapRequest) -> Self {
        Self {
            prompt: Some(request.goal().to_owned()),
            category: Some(request.category().to_string()),
        }
    }
}

/// Body of `POST /api/instructions`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionsBody {
    #[serde(default)]
    pub step_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, rename = "useAI", skip_serializing_if = "Option::is_none")]
    pub use_ai: Option<String>,
}

impl InstructionsBody {
    pub fn validate(&self) -> Result<InstructionRequest, ValidationError> {
        let category = parse_category(self.category.as_deref())?;
        let preference: ProviderPreference = match self.use_ai.as_deref() {
            Some(raw) => raw.parse()?,
            None => ProviderPreference::Auto,
        };
        Ok(
            InstructionRequest::new(self.step_description.as_deref().unwrap_or_default(), category)?
                .with_preference(preference)
                .with_position(self.phase_number, self.step_number)
                .with_project_name(self.project_name.clone()),
        )
    }
}

impl From<&InstructionRequest> for InstructionsBody {
    fn from(request: &InstructionRequest) -> Self {
        Self {
            step_description: Some(request.step_description.clone()),
            category: Some(request.category.to_string()),
            phase_number: request.phase_number,
            step_number: request.step_number,
            project_name: request.project_name.clone(),
            use_ai: Some(request.preference.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Canonical (v2) roadmap response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapResponse {
    pub success: bool,
    pub api_version: u32,
    pub project_name: String,
    pub phases: Vec<Phase>,
    pub category: Category,
    pub original_prompt: String,
    pub ai_used: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub timestamp: String,
}

impl RoadmapResponse {
    pub fn new(request: &RoadmapRequest, generated: Generated<Roadmap>) -> Self {
        Self {
            success: true,
            api_version: API_VERSION,
            project_name: generated.value.project_name,
            phases: generated.value.phases,
            category: request.category(),
            original_prompt: request.goal().to_owned(),
            ai_used: generated.source.ai_used().to_owned(),
            note: generated.source.note(),
            timestamp: timestamp_now(),
        }
    }

    pub fn into_generated(self) -> Generated<Roadmap> {
        Generated {
            source: source_from_wire(&self.ai_used, self.note),
            value: Roadmap {
                project_name: self.project_name,
                phases: self.phases,
            },
        }
    }
}

/// Legacy (v1) roadmap response: the same roadmap as a flat step list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyRoadmapResponse {
    pub success: bool,
    pub api_version: u32,
    pub project_name: String,
    pub roadmap: Vec<Step>,
    pub ai_used: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub timestamp: String,
}

impl From<Generated<Roadmap>> for LegacyRoadmapResponse {
    fn from(generated: Generated<Roadmap>) -> Self {
        let roadmap = generated
            .value
            .flatten()
            .map(|(_, step)| step.clone())
            .collect();
        Self {
            success: true,
            api_version: LEGACY_API_VERSION,
            project_name: generated.value.project_name,
            roadmap,
            ai_used: generated.source.ai_used().to_owned(),
            note: generated.source.note(),
            timestamp: timestamp_now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionsResponse {
    pub success: bool,
    pub instructions: Vec<String>,
    pub ai_used: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub timestamp: String,
}

impl From<Generated<Vec<String>>> for InstructionsResponse {
    fn from(generated: Generated<Vec<String>>) -> Self {
        Self {
            success: true,
            ai_used: generated.source.ai_used().to_owned(),
            note: generated.source.note(),
            instructions: generated.value,
            timestamp: timestamp_now(),
        }
    }
}

impl InstructionsResponse {
    pub fn into_generated(self) -> Generated<Vec<String>> {
        Generated {
            source: source_from_wire(&self.ai_used, self.note),
            value: self.instructions,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub configured: bool,
    pub status: String,
}

impl ServiceStatus {
    pub fn new(configured: bool) -> Self {
        Self {
            configured,
            status: if configured { "active" } else { "inactive" }.to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiServices {
    pub gemini: ServiceStatus,
    pub mistral: ServiceStatus,
}

/// `GET /api/health` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub success: bool,
    pub status: String,
    pub gemini_configured: bool,
    pub mistral_configured: bool,
    pub port: u16,
    pub environment: String,
    pub ai_services: AiServices,
    pub timestamp: String,
}

/// Route listing returned by `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoints {
    pub health: String,
    pub generate_roadmap: String,
    pub generate_roadmap_v1: String,
    pub instructions: String,
    pub generate_instructions: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            health: "/api/health".to_owned(),
            generate_roadmap: "/api/generate-roadmap".to_owned(),
            generate_roadmap_v1: "/api/v1/generate-roadmap".to_owned(),
            instructions: "/api/instructions".to_owned(),
            generate_instructions: "/api/generate-instructions".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexResponse {
    pub success: bool,
    pub message: String,
    pub status: String,
    pub endpoints: Endpoints,
    pub timestamp: String,
}

impl Default for IndexResponse {
    fn default() -> Self {
        Self {
            success: true,
            message: "waymark roadmap API is running".to_owned(),
            status: "healthy".to_owned(),
            endpoints: Endpoints::default(),
            timestamp: timestamp_now(),
        }
    }
}

/// Body of every 4xx/5xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            timestamp: timestamp_now(),
        }
    }
}
