//! The `Provider` trait: the adapter interface for text-completion APIs.
//!
//! The trait is object-safe so providers can be stored as
//! `Box<dyn Provider>` in the [`super::ProviderRegistry`] and swapped for
//! scripted doubles in tests.

use async_trait::async_trait;

use super::{CompletionRequest, ProviderError, ProviderKind};

/// A generative-text endpoint that turns a prompt into raw completion text.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Which provider this adapter talks to.
    fn kind(&self) -> ProviderKind;

    /// Whether a usable credential is present. An unconfigured provider
    /// must fail [`Provider::complete`] with
    /// [`ProviderError::Unconfigured`] without touching the network.
    fn is_configured(&self) -> bool;

    /// Model name sent with every request.
    fn default_model(&self) -> &str;

    /// Perform one completion call. No retries.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;
}

// Compile-time assertion: Provider must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn Provider) {}
};

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoProvider;

    #[async_trait]
    impl Provider for EchoProvider {
        fn kind(&self) -> ProviderKind {
            ProviderKind::Mistral
        }

        fn is_configured(&self) -> bool {
            true
        }

        fn default_model(&self) -> &str {
            "echo"
        }

        async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
            Ok(request.prompt.clone())
        }
    }

    #[tokio::test]
    async fn provider_is_usable_as_trait_object() {
        let provider: Box<dyn Provider> = Box::new(EchoProvider);
        let request = CompletionRequest {
            prompt: "hello".into(),
            max_tokens: 10,
            temperature: 0.0,
        };
        assert_eq!(provider.complete(&request).await.unwrap(), "hello");
        assert_eq!(provider.kind(), ProviderKind::Mistral);
    }
}
