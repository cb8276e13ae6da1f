//! Roadmap generation: provider clients, response parsing, deterministic
//! fallbacks, and the per-request orchestrator that ties them together.

pub mod api;
pub mod fallback;
pub mod model;
pub mod normalize;
pub mod orchestrator;
pub mod parse;
pub mod prompt;
pub mod provider;
pub mod quiz;
pub mod source;

pub use model::{
    Category, FallbackReason, Generated, InstructionRequest, Phase, ProviderPreference, Roadmap,
    RoadmapRequest, Source, Step, ValidationError,
};
pub use orchestrator::{GenerationSettings, Orchestrator};
pub use provider::{ProviderError, ProviderKind, ProviderRegistry, ProvidersConfig};
