//! Keyed factories taking caller-supplied arguments.

use std::collections::HashMap;
use std::sync::Arc;

use crate::arguments::Arguments;
use crate::error::{DiError, DiResult};
use crate::registration::AnyArc;

/// A factory building an instance from explicit arguments.
pub type ParametrizedFactory = Arc<dyn Fn(&Arguments) -> DiResult<AnyArc> + Send + Sync>;

/// Factories keyed by abstract id, invoked on demand with [`Arguments`].
///
/// Unlike registry factories these never see the container and never cache.
///
/// # Examples
///
/// ```rust
/// use ferrous_container::{AnyArc, Arguments, FactoryManager};
/// use std::sync::Arc;
///
/// struct Report { title: String }
///
/// let mut factories = FactoryManager::new();
/// factories.register_factory("report", |args| {
///     Ok(Arc::new(Report { title: args.cloned::<String>(0)? }) as AnyArc)
/// });
///
/// let report = factories
///     .create("report", &Arguments::new().with(String::from("Q3")))
///     .unwrap();
/// assert_eq!(report.downcast::<Report>().unwrap().title, "Q3");
/// ```
#[derive(Clone, Default)]
pub struct FactoryManager {
    factories: HashMap<String, ParametrizedFactory>,
}

impl FactoryManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the factory for `abstract_id`, replacing any prior one.
    pub fn register_factory<F>(&mut self, abstract_id: impl Into<String>, factory: F)
    where
        F: Fn(&Arguments) -> DiResult<AnyArc> + Send + Sync + 'static,
    {
        self.factories.insert(abstract_id.into(), Arc::new(factory));
    }

    pub fn has_factory(&self, abstract_id: &str) -> bool {
        self.factories.contains_key(abstract_id)
    }

    pub fn factory(&self, abstract_id: &str) -> DiResult<ParametrizedFactory> {
        self.factories
            .get(abstract_id)
            .cloned()
            .ok_or_else(|| DiError::MissingFactory(abstract_id.to_string()))
    }

    /// Invokes the factory registered for `abstract_id` with `args`.
    pub fn create(&self, abstract_id: &str, args: &Arguments) -> DiResult<AnyArc> {
        let factory = self.factory(abstract_id)?;
        factory(args)
    }

    pub fn remove(&mut self, abstract_id: &str) {
        self.factories.remove(abstract_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_factory_is_reported() {
        let factories = FactoryManager::new();
        assert_eq!(
            factories.create("nope", &Arguments::new()).unwrap_err(),
            DiError::MissingFactory("nope".into())
        );
    }

    #[test]
    fn each_call_builds_a_fresh_instance() {
        let mut factories = FactoryManager::new();
        factories.register_factory("n", |args| Ok(Arc::new(args.len()) as AnyArc));

        let a = factories.create("n", &Arguments::new().with(1u8)).unwrap();
        let b = factories.create("n", &Arguments::new().with(1u8)).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(*a.downcast::<usize>().unwrap(), 1);
    }

    #[test]
    fn factory_errors_propagate() {
        let mut factories = FactoryManager::new();
        factories.register_factory("strict", |args| {
            let n = args.cloned::<u32>(0)?;
            Ok(Arc::new(n) as AnyArc)
        });

        assert_eq!(
            factories.create("strict", &Arguments::new()).unwrap_err(),
            DiError::MissingArgument("#0".into())
        );

        factories.remove("strict");
        assert!(!factories.has_factory("strict"));
    }
}
