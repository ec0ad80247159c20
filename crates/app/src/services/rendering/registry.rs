//! Renderer registry — picks the [`CardRenderer`] of a domain.

use std::collections::HashMap;

use super::card::{CardRenderer, ClimateCard, DefaultCard, LightSwitchCard};

/// Card renderers keyed by domain, with a fallback for unknown domains.
///
/// New domains get dedicated behavior by registering a renderer here.
pub struct RendererRegistry {
    renderers: HashMap<String, Box<dyn CardRenderer>>,
    fallback: Box<dyn CardRenderer>,
}

impl Default for RendererRegistry {
    fn default() -> Self {
        let mut registry = Self::with_fallback(DefaultCard);
        registry.register("climate", ClimateCard);
        registry.register("light", LightSwitchCard);
        registry.register("switch", LightSwitchCard);
        registry
    }
}

impl RendererRegistry {
    /// An empty registry that sends every domain to `fallback`.
    #[must_use]
    pub fn with_fallback(fallback: impl CardRenderer + 'static) -> Self {
        Self {
            renderers: HashMap::new(),
            fallback: Box::new(fallback),
        }
    }

    /// Register (or replace) the renderer of a domain.
    pub fn register(&mut self, domain: impl Into<String>, renderer: impl CardRenderer + 'static) {
        self.renderers.insert(domain.into(), Box::new(renderer));
    }

    /// Renderer for `domain`, or the fallback.
    #[must_use]
    pub fn get(&self, domain: &str) -> &dyn CardRenderer {
        self.renderers
            .get(domain)
            .map_or(self.fallback.as_ref(), |renderer| &**renderer)
    }
}
