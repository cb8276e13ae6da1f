use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;

use super::RoadmapSource;
use crate::api::{GenerateRoadmapBody, InstructionsBody, InstructionsResponse, RoadmapResponse};
use crate::model::{Generated, InstructionRequest, Roadmap, RoadmapRequest};

/// Client for a running `waymark serve` instance.
#[derive(Debug, Clone)]
pub struct RemoteSource {
    http: reqwest::Client,
    base_url: String,
}

impl RemoteSource {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> anyhow::Result<R>
    where
        B: serde::Serialize + Sync,
        R: serde::de::DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%url, "posting to remote server");
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("server at {url} returned an error"))?;
        response
            .json()
            .await
            .with_context(|| format!("invalid response body from {url}"))
    }
}

#[async_trait]
impl RoadmapSource for RemoteSource {
    fn name(&self) -> &str {
        "remote"
    }

    async fn roadmap(&self, request: &RoadmapRequest) -> anyhow::Result<Generated<Roadmap>> {
        let response: RoadmapResponse = self
            .post("/api/generate-roadmap", &GenerateRoadmapBody::from(request))
            .await?;
        Ok(response.into_generated())
    }

    async fn instructions(
        &self,
        request: &InstructionRequest,
    ) -> anyhow::Result<Generated<Vec<String>>> {
        let response: InstructionsResponse = self
            .post("/api/instructions", &InstructionsBody::from(request))
            .await?;
        Ok(response.into_generated())
    }
}
