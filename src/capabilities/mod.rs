//! Capability trait and registry
//!
//! A capability is a named unit of external work with a fixed
//! natural-language description shown to the planner. Invocation is total
//! over its string input: every failure is converted into a failure-tagged
//! result string at this boundary, never raised to the caller.

use crate::config::Settings;
use crate::models::CapabilitySpec;
use std::sync::Arc;

pub mod news;
pub mod sentiment;
pub mod stock;

pub use news::NewsCapability;
pub use sentiment::SentimentCapability;
pub use stock::StockInfoCapability;

/// Trait for a single capability
#[async_trait::async_trait]
pub trait Capability: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;

    /// Invoke with one free-text input. Always returns a result string,
    /// success- or failure-tagged.
    async fn invoke(&self, input: &str) -> String;
}

/// Immutable registry binding capabilities to stable names.
///
/// Credentials are injected into the capabilities at construction time, so
/// the invocation signature the planner sees is reduced to a single
/// free-text input. Built once per agent and never mutated afterwards.
pub struct CapabilityRegistry {
    capabilities: Vec<Arc<dyn Capability>>,
}

impl CapabilityRegistry {
    /// The three production capabilities, in presentation order.
    pub fn with_defaults(settings: &Settings) -> Self {
        Self::from_capabilities(vec![
            Arc::new(StockInfoCapability::new()),
            Arc::new(NewsCapability::new(settings.news_api_key.clone())),
            Arc::new(SentimentCapability::new(settings.gemini_api_key.clone())),
        ])
    }

    pub fn from_capabilities(capabilities: Vec<Arc<dyn Capability>>) -> Self {
        Self { capabilities }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Capability>> {
        self.capabilities
            .iter()
            .find(|capability| capability.name() == name)
            .cloned()
    }

    /// Name + description pairs shown to the planner.
    pub fn specs(&self) -> Vec<CapabilitySpec> {
        self.capabilities
            .iter()
            .map(|capability| CapabilitySpec {
                name: capability.name().to_string(),
                description: capability.description().to_string(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_settings() -> Settings {
        Settings {
            gemini_api_key: "test-gemini-key".to_string(),
            news_api_key: "test-news-key".to_string(),
        }
    }

    #[test]
    fn test_default_registry_exposes_exactly_three_capabilities() {
        let registry = CapabilityRegistry::with_defaults(&test_settings());
        assert_eq!(registry.len(), 3);

        for name in ["get_stock_info", "get_financial_news", "analyze_sentiment"] {
            assert!(registry.get(name).is_some(), "missing capability {}", name);
        }
        assert!(registry.get("place_order").is_none());
    }

    #[test]
    fn test_specs_carry_descriptions() {
        let registry = CapabilityRegistry::with_defaults(&test_settings());
        let specs = registry.specs();

        assert_eq!(specs.len(), 3);
        for spec in specs {
            assert!(!spec.description.is_empty(), "{} has no description", spec.name);
        }
    }
}
