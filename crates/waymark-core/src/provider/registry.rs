//! Provider registry: the set of provider adapters available to the
//! orchestrator, keyed by [`ProviderKind`].
//!
//! Built once at startup from [`ProvidersConfig`] and shared read-only.

use std::collections::HashMap;

use super::{GeminiClient, MistralClient, Provider, ProviderError, ProviderKind, ProvidersConfig};

/// A collection of registered [`Provider`] implementations.
///
/// # Example
///
/// ```ignore
/// let registry = ProviderRegistry::from_config(&ProvidersConfig::new(Some(key), None))?;
/// assert!(registry.is_configured(ProviderKind::Gemini));
/// ```
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, Box<dyn Provider>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register both HTTP clients. Providers without a usable key are still
    /// registered; they report `is_configured() == false`.
    pub fn from_config(config: &ProvidersConfig) -> Result<Self, ProviderError> {
        let mut registry = Self::new();
        registry.register(GeminiClient::new(config.gemini.clone(), config.timeout)?);
        registry.register(MistralClient::new(config.mistral.clone(), config.timeout)?);
        Ok(registry)
    }

    /// Register a provider under its [`Provider::kind`], returning the one
    /// it replaced, if any.
    pub fn register(&mut self, provider: impl Provider + 'static) -> Option<Box<dyn Provider>> {
        self.providers.insert(provider.kind(), Box::new(provider))
    }

    /// Look up a provider regardless of configuration state.
    pub fn get(&self, kind: ProviderKind) -> Option<&dyn Provider> {
        self.providers.get(&kind).map(|b| b.as_ref())
    }

    /// Look up a provider only if it has a usable credential.
    pub fn configured(&self, kind: ProviderKind) -> Option<&dyn Provider> {
        self.get(kind).filter(|p| p.is_configured())
    }

    pub fn is_configured(&self, kind: ProviderKind) -> bool {
        self.configured(kind).is_some()
    }

    /// Registered kinds, sorted.
    pub fn list(&self) -> Vec<ProviderKind> {
        let mut kinds: Vec<ProviderKind> = self.providers.keys().copied().collect();
        kinds.sort();
        kinds
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries: Vec<(ProviderKind, bool)> = self
            .list()
            .into_iter()
            .map(|kind| (kind, self.is_configured(kind)))
            .collect();
        f.debug_struct("ProviderRegistry")
            .field("providers", &entries)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::CompletionRequest;
    use async_trait::async_trait;

    struct StaticProvider {
        kind: ProviderKind,
        configured: bool,
    }

    #[async_trait]
    impl Provider for StaticProvider {
        fn kind(&self) -> ProviderKind {
            self.kind
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        fn default_model(&self) -> &str {
            "static"
        }

        async fn complete(&self, _request: &CompletionRequest) -> Result<String, ProviderError> {
            Ok(String::new())
        }
    }

    #[test]
    fn new_registry_is_empty() {
        let registry = ProviderRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get(ProviderKind::Gemini).is_none());
    }

    #[test]
    fn register_replaces_same_kind() {
        let mut registry = ProviderRegistry::new();
        assert!(registry
            .register(StaticProvider {
                kind: ProviderKind::Gemini,
                configured: false,
            })
            .is_none());
        let old = registry.register(StaticProvider {
            kind: ProviderKind::Gemini,
            configured: true,
        });
        assert!(old.is_some());
        assert_eq!(registry.len(), 1);
        assert!(registry.is_configured(ProviderKind::Gemini));
    }

    #[test]
    fn configured_filters_unconfigured_providers() {
        let mut registry = ProviderRegistry::new();
        registry.register(StaticProvider {
            kind: ProviderKind::Mistral,
            configured: false,
        });
        assert!(registry.get(ProviderKind::Mistral).is_some());
        assert!(registry.configured(ProviderKind::Mistral).is_none());
    }

    #[test]
    fn from_config_registers_both_kinds() {
        let registry =
            ProviderRegistry::from_config(&ProvidersConfig::new(None, Some("key".into()))).unwrap();
        assert_eq!(registry.list(), vec![ProviderKind::Gemini, ProviderKind::Mistral]);
        assert!(!registry.is_configured(ProviderKind::Gemini));
        assert!(registry.is_configured(ProviderKind::Mistral));
    }
}
