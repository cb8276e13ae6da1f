use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::provider::ProviderKind;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Kind of goal a roadmap is generated for. Selects prompt templates,
/// fallback templates, and (for travel) the preferred provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Learning,
    TravelPlanner,
    Fitness,
    Career,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Learning,
        Category::TravelPlanner,
        Category::Fitness,
        Category::Career,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Learning => "learning",
            Self::TravelPlanner => "travel_planner",
            Self::Fitness => "fitness",
            Self::Career => "career",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "learning" => Ok(Self::Learning),
            "travel_planner" | "travel" => Ok(Self::TravelPlanner),
            "fitness" => Ok(Self::Fitness),
            "career" => Ok(Self::Career),
            other => Err(CategoryParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`Category`] string.
#[derive(Debug, Clone)]
pub struct CategoryParseError(pub String);

impl fmt::Display for CategoryParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let valid: Vec<&str> = Category::ALL.iter().map(Category::as_str).collect();
        write!(
            f,
            "invalid category: {:?} (expected one of {})",
            self.0,
            valid.join(", ")
        )
    }
}

impl std::error::Error for CategoryParseError {}

// ---------------------------------------------------------------------------

/// Which provider the caller asked for (`useAI` on the wire).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderPreference {
    #[default]
    Auto,
    Gemini,
    Mistral,
}

impl ProviderPreference {
    /// The explicitly requested provider, if any.
    pub fn explicit(&self) -> Option<ProviderKind> {
        match self {
            Self::Auto => None,
            Self::Gemini => Some(ProviderKind::Gemini),
            Self::Mistral => Some(ProviderKind::Mistral),
        }
    }
}

impl fmt::Display for ProviderPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Auto => "auto",
            Self::Gemini => "gemini",
            Self::Mistral => "mistral",
        };
        f.write_str(s)
    }
}

impl FromStr for ProviderPreference {
    type Err = ProviderPreferenceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "" => Ok(Self::Auto),
            "gemini" => Ok(Self::Gemini),
            "mistral" => Ok(Self::Mistral),
            other => Err(ProviderPreferenceParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`ProviderPreference`] string.
#[derive(Debug, Clone)]
pub struct ProviderPreferenceParseError(pub String);

impl fmt::Display for ProviderPreferenceParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid useAI value: {:?} (expected auto, gemini, or mistral)",
            self.0
        )
    }
}

impl std::error::Error for ProviderPreferenceParseError {}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Rejections for malformed client input. These map to HTTP 400.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required and must not be empty")]
    EmptyField(&'static str),

    #[error(transparent)]
    Category(#[from] CategoryParseError),

    #[error(transparent)]
    Preference(#[from] ProviderPreferenceParseError),
}

/// A validated request for a new roadmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoadmapRequest {
    goal: String,
    category: Category,
}

impl RoadmapRequest {
    pub fn new(goal: &str, category: Category) -> Result<Self, ValidationError> {
        let goal = goal.trim();
        if goal.is_empty() {
            return Err(ValidationError::EmptyField("prompt"));
        }
        Ok(Self {
            goal: goal.to_owned(),
            category,
        })
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn category(&self) -> Category {
        self.category
    }
}

/// A validated request for step-level instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionRequest {
    pub step_description: String,
    pub category: Category,
    pub phase_number: Option<u32>,
    pub step_number: Option<u32>,
    pub project_name: Option<String>,
    pub preference: ProviderPreference,
}

impl InstructionRequest {
    pub fn new(step_description: &str, category: Category) -> Result<Self, ValidationError> {
        let step_description = step_description.trim();
        if step_description.is_empty() {
            return Err(ValidationError::EmptyField("stepDescription"));
        }
        Ok(Self {
            step_description: step_description.to_owned(),
            category,
            phase_number: None,
            step_number: None,
            project_name: None,
            preference: ProviderPreference::Auto,
        })
    }

    pub fn with_preference(mut self, preference: ProviderPreference) -> Self {
        self.preference = preference;
        self
    }

    pub fn with_position(mut self, phase_number: Option<u32>, step_number: Option<u32>) -> Self {
        self.phase_number = phase_number;
        self.step_number = step_number;
        self
    }

    pub fn with_project_name(mut self, project_name: Option<String>) -> Self {
        self.project_name = project_name.filter(|n| !n.trim().is_empty());
        self
    }
}

// ---------------------------------------------------------------------------
// Roadmap structure
// ---------------------------------------------------------------------------

/// An actionable unit of work inside a phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub title: String,
    pub description: String,
}

/// A named, ordered group of steps. `number` is the number declared in the
/// source text, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub number: u32,
    pub name: String,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roadmap {
    pub project_name: String,
    pub phases: Vec<Phase>,
}

impl Roadmap {
    pub fn step_count(&self) -> usize {
        self.phases.iter().map(|p| p.steps.len()).sum()
    }

    /// Steps in roadmap order, paired with their phase number.
    pub fn flatten(&self) -> impl Iterator<Item = (u32, &Step)> {
        self.phases
            .iter()
            .flat_map(|phase| phase.steps.iter().map(move |step| (phase.number, step)))
    }
}

// ---------------------------------------------------------------------------
// Provenance
// ---------------------------------------------------------------------------

/// Why fallback content was substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// No provider has a usable credential.
    Unconfigured,
    /// The selected provider call failed.
    ProviderFailed(String),
    /// The provider answered but nothing parseable came back.
    EmptyParse,
    /// The caller chose the in-memory sample source.
    Offline,
    /// A remote server answered with fallback content; carries its note.
    Remote(Option<String>),
}

/// Which path produced a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Provider(ProviderKind),
    Fallback(FallbackReason),
}

impl Source {
    /// Wire tag: the provider name, or `"fallback"`.
    pub fn ai_used(&self) -> &'static str {
        match self {
            Self::Provider(kind) => kind.as_str(),
            Self::Fallback(_) => "fallback",
        }
    }

    /// Human-readable explanation attached to fallback responses.
    pub fn note(&self) -> Option<String> {
        match self {
            Self::Provider(_) => None,
            Self::Fallback(FallbackReason::Unconfigured) => Some(
                "Using fallback response - configure GEMINI_API_KEY or MISTRAL_API_KEY for AI-generated content"
                    .to_owned(),
            ),
            Self::Fallback(FallbackReason::ProviderFailed(_)) => {
                Some("AI service temporarily unavailable, using fallback content".to_owned())
            }
            Self::Fallback(FallbackReason::EmptyParse) => {
                Some("AI response could not be parsed, using fallback content".to_owned())
            }
            Self::Fallback(FallbackReason::Offline) => {
                Some("Offline mode, using sample content".to_owned())
            }
            Self::Fallback(FallbackReason::Remote(note)) => Some(
                note.clone()
                    .unwrap_or_else(|| "Server returned fallback content".to_owned()),
            ),
        }
    }
}

/// A result tagged with the path that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated<T> {
    pub value: T,
    pub source: Source,
}

impl<T> Generated<T> {
    pub fn from_provider(value: T, kind: ProviderKind) -> Self {
        Self {
            value,
            source: Source::Provider(kind),
        }
    }

    pub fn fallback(value: T, reason: FallbackReason) -> Self {
        Self {
            value,
            source: Source::Fallback(reason),
        }
    }
}
