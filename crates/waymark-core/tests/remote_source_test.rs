//! `RemoteSource` against a fake `waymark serve`.

use std::time::Duration;

use serde_json::json;

use waymark_core::source::{RemoteSource, RoadmapSource};
use waymark_core::{
    Category, FallbackReason, InstructionRequest, ProviderKind, RoadmapRequest, Source,
};
use waymark_test_utils::FakeUpstream;

fn source(upstream: &FakeUpstream) -> RemoteSource {
    RemoteSource::new(&upstream.url(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn roadmap_is_decoded_from_v2_response() {
    let upstream = FakeUpstream::start().await;
    upstream.respond_json(
        "/api/generate-roadmap",
        200,
        json!({
            "success": true,
            "apiVersion": 2,
            "projectName": "Rust Journey",
            "phases": [
                { "number": 1, "name": "Basics", "steps": [ { "title": "Install", "description": "Install rustup" } ] }
            ],
            "category": "learning",
            "originalPrompt": "learn rust",
            "aiUsed": "gemini",
            "timestamp": "2026-01-01T00:00:00.000Z"
        }),
    );

    let req = RoadmapRequest::new("learn rust", Category::Learning).unwrap();
    let generated = source(&upstream).roadmap(&req).await.unwrap();

    assert_eq!(generated.source, Source::Provider(ProviderKind::Gemini));
    assert_eq!(generated.value.project_name, "Rust Journey");
    assert_eq!(generated.value.phases[0].steps[0].title, "Install");

    let sent = &upstream.requests()[0];
    assert_eq!(sent.body["prompt"], "learn rust");
    assert_eq!(sent.body["category"], "learning");
}

#[tokio::test]
async fn fallback_instructions_keep_server_note() {
    let upstream = FakeUpstream::start().await;
    upstream.respond_json(
        "/api/instructions",
        200,
        json!({
            "success": true,
            "instructions": ["Step one is long enough", "Step two is long enough"],
            "aiUsed": "fallback",
            "note": "server says hi",
            "timestamp": "2026-01-01T00:00:00.000Z"
        }),
    );

    let req = InstructionRequest::new("Tune strings", Category::Learning).unwrap();
    let generated = source(&upstream).instructions(&req).await.unwrap();

    assert_eq!(
        generated.source,
        Source::Fallback(FallbackReason::Remote(Some("server says hi".into())))
    );
    assert_eq!(generated.value.len(), 2);
    assert_eq!(upstream.requests()[0].body["stepDescription"], "Tune strings");
}

#[tokio::test]
async fn server_error_is_an_error() {
    let upstream = FakeUpstream::start().await;
    upstream.respond("/api/generate-roadmap", 400, r#"{"success":false,"error":"bad"}"#);

    let req = RoadmapRequest::new("learn rust", Category::Learning).unwrap();
    assert!(source(&upstream).roadmap(&req).await.is_err());
}
