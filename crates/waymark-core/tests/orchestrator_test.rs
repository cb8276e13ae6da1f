//! Integration tests for the roadmap orchestrator: provider selection,
//! parsing, and the fallback paths, driven by scripted providers.

use std::sync::Arc;

use waymark_core::fallback;
use waymark_core::parse::MAX_INSTRUCTIONS;
use waymark_core::{
    Category, FallbackReason, GenerationSettings, InstructionRequest, Orchestrator,
    ProviderKind, ProviderPreference, ProviderRegistry, RoadmapRequest, Source,
};
use waymark_test_utils::ScriptedProvider;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const ROADMAP_TEXT: &str = "\
Project: **Chord Mastery**

## Phase 1: Foundation
1.1 Learn the open chords
1.2 Practice switching between G and C
Phase 2: Songs
2.1 Play three full songs
";

fn orchestrator(providers: Vec<ScriptedProvider>) -> Orchestrator {
    let mut registry = ProviderRegistry::new();
    for provider in providers {
        registry.register(provider);
    }
    Orchestrator::new(Arc::new(registry), GenerationSettings::default())
}

// ---------------------------------------------------------------------------
// Roadmaps
// ---------------------------------------------------------------------------

#[tokio::test]
async fn roadmap_from_provider_text() {
    let mistral = ScriptedProvider::new(ProviderKind::Mistral).with_text(ROADMAP_TEXT);
    let orch = orchestrator(vec![mistral.clone()]);

    let req = RoadmapRequest::new("learn guitar", Category::Learning).unwrap();
    let generated = orch.generate_roadmap(&req).await;

    assert_eq!(generated.source, Source::Provider(ProviderKind::Mistral));
    let roadmap = generated.value;
    assert_eq!(roadmap.project_name, "Chord Mastery");
    assert_eq!(roadmap.phases.len(), 2);
    assert_eq!(roadmap.phases[0].name, "Foundation");
    assert_eq!(roadmap.phases[0].steps.len(), 2);
    assert_eq!(roadmap.phases[1].number, 2);
    assert_eq!(roadmap.phases[1].steps[0].description, "Play three full songs");
    assert_eq!(mistral.calls(), 1);
    assert!(mistral.prompts()[0].contains("learn guitar"));
}

#[tokio::test]
async fn unconfigured_providers_are_never_called() {
    let gemini = ScriptedProvider::unconfigured(ProviderKind::Gemini).with_text(ROADMAP_TEXT);
    let mistral = ScriptedProvider::unconfigured(ProviderKind::Mistral).with_text(ROADMAP_TEXT);
    let orch = orchestrator(vec![gemini.clone(), mistral.clone()]);

    let req = RoadmapRequest::new("learn guitar", Category::Learning).unwrap();
    let generated = orch.generate_roadmap(&req).await;

    assert_eq!(generated.source, Source::Fallback(FallbackReason::Unconfigured));
    assert_eq!(generated.value, fallback::roadmap("learn guitar", Category::Learning));
    assert_eq!(gemini.calls(), 0);
    assert_eq!(mistral.calls(), 0);
}

#[tokio::test]
async fn provider_failure_falls_back_without_switching_provider() {
    let gemini = ScriptedProvider::new(ProviderKind::Gemini).with_text(ROADMAP_TEXT);
    let mistral = ScriptedProvider::new(ProviderKind::Mistral).with_http_error(503);
    let orch = orchestrator(vec![gemini.clone(), mistral.clone()]);

    let req = RoadmapRequest::new("get fit", Category::Fitness).unwrap();
    let generated = orch.generate_roadmap(&req).await;

    match &generated.source {
        Source::Fallback(FallbackReason::ProviderFailed(msg)) => assert!(msg.contains("503")),
        other => panic!("expected provider failure fallback, got {other:?}"),
    }
    assert_eq!(generated.value, fallback::roadmap("get fit", Category::Fitness));
    assert_eq!(mistral.calls(), 1);
    assert_eq!(gemini.calls(), 0, "no failover to the other provider");
}

#[tokio::test]
async fn unparseable_answer_falls_back() {
    let mistral = ScriptedProvider::new(ProviderKind::Mistral)
        .with_text("Sure! Practice a lot and you will get there.");
    let orch = orchestrator(vec![mistral]);

    let req = RoadmapRequest::new("learn guitar", Category::Learning).unwrap();
    let generated = orch.generate_roadmap(&req).await;

    assert_eq!(generated.source, Source::Fallback(FallbackReason::EmptyParse));
    assert_eq!(generated.value, fallback::roadmap("learn guitar", Category::Learning));
}

#[tokio::test]
async fn travel_roadmap_goes_to_gemini() {
    let gemini = ScriptedProvider::new(ProviderKind::Gemini).with_text(ROADMAP_TEXT);
    let mistral = ScriptedProvider::new(ProviderKind::Mistral).with_text(ROADMAP_TEXT);
    let orch = orchestrator(vec![gemini.clone(), mistral.clone()]);

    let req = RoadmapRequest::new("visit japan", Category::TravelPlanner).unwrap();
    let generated = orch.generate_roadmap(&req).await;

    assert_eq!(generated.source, Source::Provider(ProviderKind::Gemini));
    assert_eq!(gemini.calls(), 1);
    assert_eq!(mistral.calls(), 0);
}

// ---------------------------------------------------------------------------
// Instructions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn guitar_chords_without_providers_uses_fallback() {
    let orch = orchestrator(vec![]);
    let req = InstructionRequest::new("Learn guitar chords", Category::Learning).unwrap();

    let generated = orch.generate_instructions(&req).await;

    assert_eq!(generated.source.ai_used(), "fallback");
    assert!(generated.source.note().is_some());
    assert_eq!(generated.value.len(), fallback::FALLBACK_INSTRUCTION_COUNT);
    assert!(generated.value[0].contains("Learn guitar chords"));
}

#[tokio::test]
async fn instructions_are_cleaned_and_capped() {
    let answer: String = (1..=12)
        .map(|i| format!("{i}. **Do** the thing number {i} carefully\n"))
        .collect();
    let gemini = ScriptedProvider::new(ProviderKind::Gemini).with_text(format!(
        "Here are the steps:\n{answer}"
    ));
    let orch = orchestrator(vec![gemini]);

    let req = InstructionRequest::new("Tune the guitar", Category::Learning)
        .unwrap()
        .with_preference(ProviderPreference::Gemini);
    let generated = orch.generate_instructions(&req).await;

    assert_eq!(generated.source, Source::Provider(ProviderKind::Gemini));
    assert_eq!(generated.value.len(), MAX_INSTRUCTIONS);
    assert_eq!(generated.value[0], "Do the thing number 1 carefully");
}

#[tokio::test]
async fn explicit_preference_overrides_default_order() {
    let gemini = ScriptedProvider::new(ProviderKind::Gemini)
        .with_text("1. Hold the pick loosely\n2. Strum from the wrist");
    let mistral = ScriptedProvider::new(ProviderKind::Mistral);
    let orch = orchestrator(vec![gemini.clone(), mistral.clone()]);

    let req = InstructionRequest::new("Strumming", Category::Learning)
        .unwrap()
        .with_preference(ProviderPreference::Gemini)
        .with_position(Some(1), Some(2))
        .with_project_name(Some("Guitar Journey".into()));
    let generated = orch.generate_instructions(&req).await;

    assert_eq!(generated.source, Source::Provider(ProviderKind::Gemini));
    assert_eq!(mistral.calls(), 0);
    let prompt = &gemini.prompts()[0];
    assert!(prompt.contains("Strumming"));
    assert!(prompt.contains("Guitar Journey"));
}

#[tokio::test]
async fn empty_instruction_parse_falls_back() {
    let mistral = ScriptedProvider::new(ProviderKind::Mistral).with_text("Here are\nok\n");
    let orch = orchestrator(vec![mistral]);

    let req = InstructionRequest::new("Stretch", Category::Fitness).unwrap();
    let generated = orch.generate_instructions(&req).await;

    assert_eq!(generated.source, Source::Fallback(FallbackReason::EmptyParse));
    assert_eq!(generated.value, fallback::instructions("Stretch", Category::Fitness));
}
