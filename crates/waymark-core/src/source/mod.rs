//! Data sources for roadmap content.
//!
//! A client picks one [`RoadmapSource`] at startup: the in-process
//! [`Orchestrator`], a [`RemoteSource`] talking to `waymark serve`, or the
//! offline [`SampleSource`].

mod remote;
mod sample;

pub use remote::RemoteSource;
pub use sample::SampleSource;

use async_trait::async_trait;

use crate::model::{Generated, InstructionRequest, Roadmap, RoadmapRequest};
use crate::orchestrator::Orchestrator;

/// Something that can produce roadmaps and step instructions.
#[async_trait]
pub trait RoadmapSource: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    async fn roadmap(&self, request: &RoadmapRequest) -> anyhow::Result<Generated<Roadmap>>;

    async fn instructions(
        &self,
        request: &InstructionRequest,
    ) -> anyhow::Result<Generated<Vec<String>>>;
}

#[async_trait]
impl RoadmapSource for Orchestrator {
    fn name(&self) -> &str {
        "local"
    }

    async fn roadmap(&self, request: &RoadmapRequest) -> anyhow::Result<Generated<Roadmap>> {
        Ok(self.generate_roadmap(request).await)
    }

    async fn instructions(
        &self,
        request: &InstructionRequest,
    ) -> anyhow::Result<Generated<Vec<String>>> {
        Ok(self.generate_instructions(request).await)
    }
}

// Compile-time check that RoadmapSource is object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn RoadmapSource) {}
};
