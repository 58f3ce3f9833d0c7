//! Service registration types.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::container::Container;
use crate::descriptors::ServiceDescriptor;
use crate::error::DiResult;
use crate::lifetime::Lifetime;

/// Type-erased Arc for storage
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Type-erased factory receiving the owning container.
pub type Factory = Arc<dyn Fn(&Container) -> DiResult<AnyArc> + Send + Sync>;

/// Wraps an infallible closure producing `T` as a type-erased [`Factory`].
pub(crate) fn erased_factory<T, F>(factory: F) -> Factory
where
    T: Send + Sync + 'static,
    F: Fn(&Container) -> T + Send + Sync + 'static,
{
    Arc::new(move |container: &Container| -> DiResult<AnyArc> { Ok(Arc::new(factory(container))) })
}

/// What a service id is bound to: a pre-built value or a factory.
///
/// # Examples
///
/// ```rust
/// use ferrous_container::{Concrete, Container};
///
/// struct Connection { dsn: String }
///
/// let container = Container::new();
/// container.register("dsn", Concrete::value(String::from("sqlite::memory:")), true);
/// container.register(
///     "db",
///     Concrete::factory(|c| Connection {
///         dsn: c.get_as::<String>("dsn").map(|s| (*s).clone()).unwrap_or_default(),
///     }),
///     true,
/// );
///
/// let db = container.get_as::<Connection>("db").unwrap();
/// assert_eq!(db.dsn, "sqlite::memory:");
/// ```
#[derive(Clone)]
pub enum Concrete {
    /// A pre-built value, handed out as is.
    Value(AnyArc),
    /// A factory invoked with the container on construction.
    Factory(Factory),
}

impl Concrete {
    /// Wraps a plain value.
    pub fn value<T: Send + Sync + 'static>(value: T) -> Self {
        Concrete::Value(Arc::new(value))
    }

    /// Wraps an already shared value without re-allocating.
    pub fn shared<T: Send + Sync + 'static>(value: Arc<T>) -> Self {
        Concrete::Value(value)
    }

    /// Wraps an infallible factory producing `T`.
    pub fn factory<T, F>(factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Container) -> T + Send + Sync + 'static,
    {
        Concrete::Factory(erased_factory(factory))
    }

    /// Wraps a fallible factory producing `T`.
    pub fn try_factory<T, F>(factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Container) -> DiResult<T> + Send + Sync + 'static,
    {
        Concrete::Factory(Arc::new(move |container: &Container| -> DiResult<AnyArc> {
            Ok(Arc::new(factory(container)?))
        }))
    }

    /// Returns true when construction invokes a factory.
    pub fn is_factory(&self) -> bool {
        matches!(self, Concrete::Factory(_))
    }

    /// Produces an instance: invokes the factory or hands out the stored value.
    pub(crate) fn build(&self, container: &Container) -> DiResult<AnyArc> {
        match self {
            Concrete::Value(value) => Ok(value.clone()),
            Concrete::Factory(factory) => factory(container),
        }
    }
}

impl fmt::Debug for Concrete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Concrete::Value(_) => f.write_str("Concrete::Value(..)"),
            Concrete::Factory(_) => f.write_str("Concrete::Factory(..)"),
        }
    }
}

/// Service registration with lifecycle flag and concrete
#[derive(Debug, Clone)]
pub(crate) struct ServiceDefinition {
    pub(crate) concrete: Concrete,
    pub(crate) shared: bool,
}

/// Service registry holding definitions, cached singletons, deferred factories and tags
#[derive(Default)]
pub(crate) struct Registry {
    definitions: HashMap<String, ServiceDefinition>,
    instances: HashMap<String, AnyArc>,
    deferred: HashMap<String, Factory>,
    tags: HashMap<String, HashSet<String>>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Inserts a definition, replacing any prior one. A cached instance of the
    /// previous definition stays until `remove`/`clear`.
    pub(crate) fn insert(&mut self, id: String, concrete: Concrete, shared: bool) {
        self.definitions.insert(id, ServiceDefinition { concrete, shared });
    }

    pub(crate) fn definition(&self, id: &str) -> Option<ServiceDefinition> {
        self.definitions.get(id).cloned()
    }

    pub(crate) fn instance(&self, id: &str) -> Option<AnyArc> {
        self.instances.get(id).cloned()
    }

    /// Caches `instance` unless another one got there first; returns the cached one.
    pub(crate) fn cache(&mut self, id: &str, instance: AnyArc) -> AnyArc {
        self.instances
            .entry(id.to_string())
            .or_insert(instance)
            .clone()
    }

    pub(crate) fn defer(&mut self, id: String, factory: Factory) {
        self.deferred.insert(id, factory);
    }

    pub(crate) fn deferred(&self, id: &str) -> Option<Factory> {
        self.deferred.get(id).cloned()
    }

    /// Turns a materialized deferred entry into a shared definition.
    pub(crate) fn settle_deferred(&mut self, id: &str, instance: AnyArc) {
        self.deferred.remove(id);
        self.insert(id.to_string(), Concrete::Value(instance), true);
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.definitions.contains_key(id) || self.deferred.contains_key(id)
    }

    /// Drops the definition, cached instance and deferred entry of `id`.
    /// Tag memberships stay; only `clear` empties the tag index.
    pub(crate) fn remove(&mut self, id: &str) {
        self.definitions.remove(id);
        self.instances.remove(id);
        self.deferred.remove(id);
    }

    pub(crate) fn clear(&mut self) {
        self.definitions.clear();
        self.instances.clear();
        self.deferred.clear();
        self.tags.clear();
    }

    pub(crate) fn tag(&mut self, id: String, tag: String) {
        self.tags.entry(tag).or_default().insert(id);
    }

    pub(crate) fn tagged(&self, tag: &str) -> Vec<String> {
        self.tags
            .get(tag)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn tags_of(&self, id: &str) -> Vec<String> {
        let mut tags: Vec<String> = self
            .tags
            .iter()
            .filter(|(_, ids)| ids.contains(id))
            .map(|(tag, _)| tag.clone())
            .collect();
        tags.sort();
        tags
    }

    /// Snapshot of every registered and deferred id, sorted by id.
    pub(crate) fn descriptors(&self) -> Vec<ServiceDescriptor> {
        let mut out: Vec<ServiceDescriptor> = self
            .definitions
            .iter()
            .map(|(id, def)| ServiceDescriptor {
                id: id.clone(),
                lifetime: Lifetime::from_shared(def.shared),
                is_factory: def.concrete.is_factory(),
                instantiated: self.instances.contains_key(id),
                tags: self.tags_of(id),
            })
            .collect();

        out.extend(
            self.deferred
                .keys()
                .filter(|id| !self.definitions.contains_key(*id))
                .map(|id| ServiceDescriptor {
                    id: id.clone(),
                    lifetime: Lifetime::Deferred,
                    is_factory: true,
                    instantiated: false,
                    tags: self.tags_of(id),
                }),
        );

        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }

    #[cfg(feature = "diagnostics")]
    pub(crate) fn len(&self) -> usize {
        self.definitions.len() + self.deferred.len()
    }
}
