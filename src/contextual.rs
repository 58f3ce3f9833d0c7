//! Per-context overrides of a service's implementation.

use std::collections::HashMap;

use crate::container::Container;
use crate::error::{DiError, DiResult};
use crate::registration::{AnyArc, Factory};

/// Factories keyed by (abstract id, context id), independent of the registry.
///
/// An unbound pair fails with [`DiError::UnboundContext`] rather than falling
/// back to the registry.
#[derive(Clone, Default)]
pub struct ContextualBindingManager {
    bindings: HashMap<String, HashMap<String, Factory>>,
}

impl ContextualBindingManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the factory for the pair, replacing any prior one.
    pub fn bind(&mut self, abstract_id: impl Into<String>, context: impl Into<String>, factory: Factory) {
        self.bindings
            .entry(abstract_id.into())
            .or_default()
            .insert(context.into(), factory);
    }

    pub fn has_binding(&self, abstract_id: &str, context: &str) -> bool {
        self.bindings
            .get(abstract_id)
            .is_some_and(|contexts| contexts.contains_key(context))
    }

    pub fn unbind(&mut self, abstract_id: &str, context: &str) {
        if let Some(contexts) = self.bindings.get_mut(abstract_id) {
            contexts.remove(context);
            if contexts.is_empty() {
                self.bindings.remove(abstract_id);
            }
        }
    }

    /// Drops every context bound for `abstract_id`.
    pub fn clear_bindings(&mut self, abstract_id: &str) {
        self.bindings.remove(abstract_id);
    }

    /// Factory bound for the pair.
    pub fn binding(&self, abstract_id: &str, context: &str) -> DiResult<Factory> {
        self.bindings
            .get(abstract_id)
            .and_then(|contexts| contexts.get(context))
            .cloned()
            .ok_or_else(|| DiError::UnboundContext {
                abstract_id: abstract_id.to_string(),
                context: context.to_string(),
            })
    }

    /// Invokes the factory bound for the pair with `container`.
    pub fn resolve(&self, abstract_id: &str, context: &str, container: &Container) -> DiResult<AnyArc> {
        let factory = self.binding(abstract_id, context)?;
        factory(container)
    }

    /// Contexts bound for `abstract_id`, sorted.
    pub fn contexts(&self, abstract_id: &str) -> Vec<String> {
        let mut contexts: Vec<String> = self
            .bindings
            .get(abstract_id)
            .map(|c| c.keys().cloned().collect())
            .unwrap_or_default();
        contexts.sort();
        contexts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn constant(value: u8) -> Factory {
        Arc::new(move |_: &Container| -> DiResult<AnyArc> { Ok(Arc::new(value)) })
    }

    #[test]
    fn unbinding_last_context_drops_the_abstract() {
        let mut manager = ContextualBindingManager::new();
        manager.bind("cache", "http", constant(1));
        manager.bind("cache", "cli", constant(2));

        manager.unbind("cache", "http");
        assert_eq!(manager.contexts("cache"), vec!["cli".to_string()]);

        manager.unbind("cache", "cli");
        assert!(manager.bindings.is_empty());

        // Unbinding an unknown pair is a no-op.
        manager.unbind("cache", "cli");
        manager.unbind("queue", "worker");
    }

    #[test]
    fn contexts_are_sorted() {
        let mut manager = ContextualBindingManager::new();
        for context in ["worker", "api", "cli", "batch"] {
            manager.bind("logger", context, constant(0));
        }

        assert_eq!(manager.contexts("logger"), vec!["api", "batch", "cli", "worker"]);
        assert!(manager.contexts("missing").is_empty());
    }

    #[test]
    fn binding_reports_unbound_pair() {
        let mut manager = ContextualBindingManager::new();
        manager.bind("cache", "http", constant(1));

        let err = manager.binding("cache", "cli").err().unwrap();
        assert_eq!(
            err,
            DiError::UnboundContext { abstract_id: "cache".into(), context: "cli".into() }
        );
    }
}
