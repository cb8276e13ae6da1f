use async_trait::async_trait;

use super::RoadmapSource;
use crate::fallback;
use crate::model::{FallbackReason, Generated, InstructionRequest, Roadmap, RoadmapRequest};

/// Offline source that serves the built-in templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleSource;

#[async_trait]
impl RoadmapSource for SampleSource {
    fn name(&self) -> &str {
        "sample"
    }

    async fn roadmap(&self, request: &RoadmapRequest) -> anyhow::Result<Generated<Roadmap>> {
        Ok(Generated::fallback(
            fallback::roadmap(request.goal(), request.category()),
            FallbackReason::Offline,
        ))
    }

    async fn instructions(
        &self,
        request: &InstructionRequest,
    ) -> anyhow::Result<Generated<Vec<String>>> {
        Ok(Generated::fallback(
            fallback::instructions(&request.step_description, request.category),
            FallbackReason::Offline,
        ))
    }
}
