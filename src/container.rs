//! The container facade.
//!
//! [`Container`] composes the registry with the autowiring resolver,
//! contextual bindings, scopes, middleware, keyed factories, aliases and
//! providers. It is cheap to clone: clones share the same state.
//!
//! No lock is held while user code runs (factories, middleware, scope
//! resolvers, providers, observers), so that code may call back into the
//! container freely.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, RwLock};

use crate::alias::AliasManager;
use crate::arguments::Arguments;
use crate::class::{ClassDescriptor, Injectable};
use crate::contextual::ContextualBindingManager;
use crate::descriptors::ServiceDescriptor;
use crate::error::{DiError, DiResult};
use crate::factory::FactoryManager;
use crate::internal::{Frame, ResolutionStack};
use crate::key::{id_of, short_name};
use crate::middleware::{Middleware, MiddlewareManager};
use crate::observer::{ContainerObserver, Observers};
use crate::providers::ServiceProvider;
use crate::registration::{erased_factory, AnyArc, Concrete, Factory, Registry};
use crate::resolver::{resolve_parameters, DependencyResolver};
use crate::scope::ScopeManager;

/// Runtime service container.
///
/// # Examples
///
/// ```
/// use ferrous_container::Container;
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// let container = Container::new();
/// container.instance("db.url", String::from("postgres://localhost"));
/// container.singleton("db", |c| Database {
///     url: c.get_as::<String>("db.url").map(|u| (*u).clone()).unwrap_or_default(),
/// });
/// container.transient("users", |c| UserService {
///     db: c.get_as::<Database>("db").expect("db is registered"),
/// });
///
/// let users = container.get_as::<UserService>("users").unwrap();
/// assert_eq!(users.db.url, "postgres://localhost");
///
/// // Singletons are shared, transients are rebuilt.
/// let again = container.get_as::<UserService>("users").unwrap();
/// assert!(Arc::ptr_eq(&users.db, &again.db));
/// assert!(!Arc::ptr_eq(&users, &again));
/// ```
#[derive(Clone, Default)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

/// A deferred provider waiting for one of its ids to be requested.
struct PendingProvider {
    provides: Vec<String>,
    provider: Box<dyn ServiceProvider>,
}

#[derive(Default)]
struct ContainerInner {
    registry: Mutex<Registry>,
    resolver: RwLock<DependencyResolver>,
    contextual: RwLock<ContextualBindingManager>,
    scopes: RwLock<ScopeManager>,
    middleware: RwLock<MiddlewareManager>,
    factories: RwLock<FactoryManager>,
    aliases: RwLock<AliasManager>,
    providers: Mutex<Vec<PendingProvider>>,
    observers: RwLock<Observers>,
    stack: ResolutionStack,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    // ----- Registration -----

    /// Registers `concrete` under `id`, replacing any prior definition.
    ///
    /// With `shared` the first constructed instance is cached and handed out
    /// on every later `get`; otherwise every `get` constructs anew.
    pub fn register(&self, id: impl Into<String>, concrete: Concrete, shared: bool) {
        let id = id.into();
        tracing::trace!(service = %id, shared, factory = concrete.is_factory(), "registering service");
        self.inner.registry.lock().insert(id, concrete, shared);
    }

    /// Registers a ready-made value as a shared service.
    pub fn instance<T: Send + Sync + 'static>(&self, id: impl Into<String>, value: T) {
        self.register(id, Concrete::value(value), true);
    }

    /// Registers a factory whose first result is cached.
    pub fn singleton<T, F>(&self, id: impl Into<String>, factory: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&Container) -> T + Send + Sync + 'static,
    {
        self.register(id, Concrete::factory(factory), true);
    }

    /// Registers a factory invoked on every `get`.
    pub fn transient<T, F>(&self, id: impl Into<String>, factory: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&Container) -> T + Send + Sync + 'static,
    {
        self.register(id, Concrete::factory(factory), false);
    }

    /// Registers `T` under `id_of::<T>()`, built by autowiring.
    pub fn register_autowired<T: Injectable>(&self, shared: bool) {
        let class = T::describe();
        let name = class.name().to_string();
        self.register_class_descriptor(class);
        let factory: Factory = Arc::new(move |container: &Container| container.resolve_class(&name));
        self.register(id_of::<T>(), Concrete::Factory(factory), shared);
    }

    /// Registers a factory that runs once, on first access.
    ///
    /// Its result becomes a shared value.
    ///
    /// Unlike other failures, a failing deferred factory is not final: the
    /// error propagates to the caller, the deferred entry is kept, and the next
    /// `get` runs the factory again.
    pub fn defer<T, F>(&self, id: impl Into<String>, factory: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&Container) -> T + Send + Sync + 'static,
    {
        self.defer_factory(id, erased_factory(factory));
    }

    /// Type-erased form of [`defer`](Self::defer).
    pub fn defer_factory(&self, id: impl Into<String>, factory: Factory) {
        let id = id.into();
        tracing::trace!(service = %id, "deferring service");
        self.inner.registry.lock().defer(id, factory);
    }

    // ----- Lookup -----

    /// Resolves the service registered under `id` (or under the target of
    /// the alias `id`).
    ///
    /// Middleware runs on every call, cache hits included.
    pub fn get(&self, id: &str) -> DiResult<AnyArc> {
        let id = self.resolve_alias(id);

        let observers = {
            let observers = self.inner.observers.read();
            observers.has_observers().then(|| observers.clone())
        };

        match observers {
            None => self.get_guarded(&id),
            Some(observers) => {
                let start = Instant::now();
                observers.resolving(&id);
                let result = self.get_guarded(&id);
                match &result {
                    Ok(_) => observers.resolved(&id, start.elapsed()),
                    Err(error) => observers.failed(&id, error),
                }
                result
            }
        }
    }

    fn get_guarded(&self, id: &str) -> DiResult<AnyArc> {
        let _frame = self.inner.stack.enter(Frame::Service(id.to_string()))?;
        let instance = self.get_impl(id)?;

        let middleware = self.inner.middleware.read().clone();
        if middleware.is_empty() {
            return Ok(instance);
        }
        Ok(middleware.apply_middleware(id, instance))
    }

    fn get_impl(&self, id: &str) -> DiResult<AnyArc> {
        let deferred = self.inner.registry.lock().deferred(id);
        if let Some(factory) = deferred {
            tracing::debug!(service = id, "materializing deferred service");
            let instance = factory(self)?;
            self.inner.registry.lock().settle_deferred(id, instance);
        }

        self.load_deferred_provider(id)?;

        let cached = self.inner.registry.lock().instance(id);
        if let Some(instance) = cached {
            return Ok(instance);
        }

        let definition = self
            .inner
            .registry
            .lock()
            .definition(id)
            .ok_or_else(|| DiError::NotFound(id.to_string()))?;

        let instance = definition.concrete.build(self)?;
        if definition.shared {
            return Ok(self.inner.registry.lock().cache(id, instance));
        }
        Ok(instance)
    }

    /// Resolves `id` and downcasts it to `T`.
    pub fn get_as<T: Send + Sync + 'static>(&self, id: &str) -> DiResult<Arc<T>> {
        self.get(id)?
            .downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(id.to_string()))
    }

    /// Resolves the service registered under `id_of::<T>()`.
    pub fn get_type<T: Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        self.get_as::<T>(&id_of::<T>())
    }

    /// Whether `id` has a definition, a deferred entry or a pending provider.
    /// Never constructs anything.
    pub fn has(&self, id: &str) -> bool {
        let id = self.resolve_alias(id);
        if self.inner.registry.lock().contains(&id) {
            return true;
        }
        self.inner
            .providers
            .lock()
            .iter()
            .any(|pending| pending.provides.iter().any(|p| *p == id))
    }

    /// Drops the definition, cached instance and deferred entry of `id`.
    pub fn remove(&self, id: &str) {
        let id = self.resolve_alias(id);
        self.inner.registry.lock().remove(&id);
    }

    /// Drops every definition, cached instance, deferred entry and tag.
    pub fn clear(&self) {
        self.inner.registry.lock().clear();
    }

    // ----- Tags -----

    pub fn tag(&self, id: &str, tag: impl Into<String>) {
        let id = self.resolve_alias(id);
        self.inner.registry.lock().tag(id, tag.into());
    }

    /// Ids tagged with `tag`, sorted.
    pub fn tagged_ids(&self, tag: &str) -> Vec<String> {
        let mut ids = self.inner.registry.lock().tagged(tag);
        ids.sort();
        ids
    }

    /// Resolves every service tagged with `tag`. The first failure aborts.
    pub fn get_by_tag(&self, tag: &str) -> DiResult<HashMap<String, AnyArc>> {
        self.tagged_ids(tag)
            .into_iter()
            .map(|id| self.get(&id).map(|instance| (id, instance)))
            .collect()
    }

    // ----- Autowiring -----

    /// Makes `T` known to the resolver.
    pub fn register_class<T: Injectable>(&self) {
        self.register_class_descriptor(T::describe());
    }

    pub fn register_class_descriptor(&self, class: ClassDescriptor) {
        tracing::trace!(class = short_name(class.name()), "registering class");
        self.inner.resolver.write().register_class(class);
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.inner.resolver.read().has_class(name)
    }

    /// Builds `T`, autowiring its constructor parameters.
    pub fn resolve<T: Injectable>(&self) -> DiResult<Arc<T>> {
        let known = self
            .inner
            .resolver
            .read()
            .class_by_type_id(TypeId::of::<T>())
            .map(|class| class.name().to_string());

        let name = match known {
            Some(name) => name,
            None => {
                let class = T::describe();
                let name = class.name().to_string();
                self.register_class_descriptor(class);
                name
            }
        };

        self.resolve_class(&name)?
            .downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(name))
    }

    /// Builds the class registered as `name`, autowiring its constructor.
    ///
    /// Each parameter takes, in order: a value bound with
    /// [`bind_parameter`](Self::bind_parameter), its declared service type
    /// when the container can provide it, its default. Anything else fails
    /// with [`DiError::UnresolvedParameter`].
    pub fn resolve_class(&self, name: &str) -> DiResult<AnyArc> {
        let class = self
            .inner
            .resolver
            .read()
            .class(name)
            .ok_or_else(|| DiError::UnknownClass(name.to_string()))?;

        let _frame = self.inner.stack.enter(Frame::Class(class.name().to_string()))?;

        if !class.is_instantiable() {
            return Err(DiError::NotInstantiable(class.name().to_string()));
        }

        let args = match class.constructor() {
            None => Arguments::new(),
            Some(params) => {
                let bindings = self.inner.resolver.read().bindings_for(class.name());
                resolve_parameters(self, class.name(), params, bindings.as_ref())?
            }
        };

        tracing::trace!(class = short_name(class.name()), arguments = args.len(), "instantiating class");
        class.instantiate(&args)
    }

    /// Calls `method` on `instance` with autowired arguments.
    ///
    /// The instance's type must be a registered class. Parameter bindings do
    /// not apply to methods.
    pub fn resolve_method(&self, instance: &AnyArc, method: &str) -> DiResult<AnyArc> {
        let type_id = (**instance).type_id();
        let class = self
            .inner
            .resolver
            .read()
            .class_by_type_id(type_id)
            .ok_or_else(|| DiError::UnknownClass(format!("{:?}", type_id)))?;

        let descriptor = class
            .method(method)
            .cloned()
            .ok_or_else(|| DiError::UnknownMethod {
                class: class.name().to_string(),
                method: method.to_string(),
            })?;

        let args = resolve_parameters(self, class.name(), descriptor.params(), None)?;
        descriptor.invoke(instance, &args)
    }

    /// Typed form of [`resolve_method`](Self::resolve_method); registers `T`
    /// first when needed.
    pub fn call_method<T: Injectable>(&self, instance: &Arc<T>, method: &str) -> DiResult<AnyArc> {
        let known = self
            .inner
            .resolver
            .read()
            .class_by_type_id(TypeId::of::<T>())
            .is_some();
        if !known {
            self.register_class::<T>();
        }
        let erased: AnyArc = instance.clone();
        self.resolve_method(&erased, method)
    }

    /// Fixes the value of `parameter` whenever `class` is resolved.
    pub fn bind_parameter<V: Send + Sync + 'static>(
        &self,
        class: impl Into<String>,
        parameter: impl Into<String>,
        value: V,
    ) {
        self.inner
            .resolver
            .write()
            .bind_parameter(class, parameter, Arc::new(value));
    }

    // ----- Contextual bindings -----

    /// Binds a factory for `abstract_id` when requested from `context`.
    pub fn bind_context<T, F>(&self, abstract_id: impl Into<String>, context: impl Into<String>, factory: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&Container) -> T + Send + Sync + 'static,
    {
        self.inner
            .contextual
            .write()
            .bind(abstract_id, context, erased_factory(factory));
    }

    /// Invokes the factory bound for the pair. Unbound pairs fail with
    /// [`DiError::UnboundContext`]; the registry is not consulted.
    pub fn resolve_with_context(&self, abstract_id: &str, context: &str) -> DiResult<AnyArc> {
        let factory = self.inner.contextual.read().binding(abstract_id, context)?;
        factory(self)
    }

    pub fn has_contextual_binding(&self, abstract_id: &str, context: &str) -> bool {
        self.inner.contextual.read().has_binding(abstract_id, context)
    }

    pub fn unbind_context(&self, abstract_id: &str, context: &str) {
        self.inner.contextual.write().unbind(abstract_id, context);
    }

    pub fn clear_contextual_bindings(&self, abstract_id: &str) {
        self.inner.contextual.write().clear_bindings(abstract_id);
    }

    // ----- Scopes -----

    pub fn define_scope<F>(&self, scope: impl Into<String>, resolver: F)
    where
        F: Fn(&str) -> DiResult<AnyArc> + Send + Sync + 'static,
    {
        self.inner.scopes.write().define_scope(scope, resolver);
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.inner.scopes.read().has_scope(scope)
    }

    /// Invokes the resolver of `scope` for `abstract_id`. Middleware does not run.
    pub fn resolve_in_scope(&self, scope: &str, abstract_id: &str) -> DiResult<AnyArc> {
        let resolver = self.inner.scopes.read().resolver(scope)?;
        resolver(abstract_id)
    }

    // ----- Middleware -----

    pub fn add_middleware<F>(&self, middleware: F)
    where
        F: Fn(&str, AnyArc) -> AnyArc + Send + Sync + 'static,
    {
        self.inner.middleware.write().add_middleware(middleware);
    }

    pub fn add_middleware_handler<M: Middleware + 'static>(&self, middleware: M) {
        self.inner.middleware.write().add_handler(middleware);
    }

    // ----- Keyed factories -----

    pub fn register_factory<F>(&self, abstract_id: impl Into<String>, factory: F)
    where
        F: Fn(&Arguments) -> DiResult<AnyArc> + Send + Sync + 'static,
    {
        self.inner.factories.write().register_factory(abstract_id, factory);
    }

    /// Invokes the keyed factory and passes the result through middleware.
    pub fn create_from_factory(&self, abstract_id: &str, args: &Arguments) -> DiResult<AnyArc> {
        let factory = self.inner.factories.read().factory(abstract_id)?;
        let instance = factory(args)?;
        let middleware = self.inner.middleware.read().clone();
        Ok(middleware.apply_middleware(abstract_id, instance))
    }

    // ----- Aliases -----

    pub fn alias(&self, alias: impl Into<String>, id: impl Into<String>) {
        self.inner.aliases.write().add_alias(alias, id);
    }

    /// Target of `alias`, or `alias` itself.
    pub fn resolve_alias(&self, alias: &str) -> String {
        self.inner.aliases.read().resolve_alias(alias).to_string()
    }

    // ----- Providers -----

    /// Registers and boots `provider`, or holds it back until first use of
    /// one of its ids when it is deferred.
    pub fn register_provider<P: ServiceProvider + 'static>(&self, provider: P) -> DiResult<()> {
        let provides = provider.provides();
        if provider.is_deferred() && !provides.is_empty() {
            tracing::debug!(services = ?provides, "deferring provider");
            self.inner.providers.lock().push(PendingProvider {
                provides,
                provider: Box::new(provider),
            });
            return Ok(());
        }

        provider.register(self)?;
        provider.boot(self)
    }

    fn load_deferred_provider(&self, id: &str) -> DiResult<()> {
        let pending = {
            let mut providers = self.inner.providers.lock();
            match providers.iter().position(|p| p.provides.iter().any(|provided| provided == id)) {
                Some(index) => providers.remove(index),
                None => return Ok(()),
            }
        };

        tracing::debug!(service = id, provides = ?pending.provides, "loading deferred provider");
        pending.provider.register(self)?;
        pending.provider.boot(self)
    }

    // ----- Diagnostics -----

    pub fn add_observer(&self, observer: Arc<dyn ContainerObserver>) {
        self.inner.observers.write().add(observer);
    }

    /// Snapshot of every registered and deferred service, sorted by id.
    pub fn service_descriptors(&self) -> Vec<ServiceDescriptor> {
        self.inner.registry.lock().descriptors()
    }

    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let mut s = String::new();
        s.push_str("=== Container Debug ===\n");
        s.push_str(&format!("Services ({}):\n", self.inner.registry.lock().len()));
        for d in self.service_descriptors() {
            s.push_str(&format!(
                "  {}: {:?}{}{}\n",
                d.id,
                d.lifetime,
                if d.instantiated { " [cached]" } else { "" },
                if d.tags.is_empty() { String::new() } else { format!(" tags={:?}", d.tags) },
            ));
        }
        let pending = self.inner.providers.lock();
        if !pending.is_empty() {
            s.push_str("Deferred providers:\n");
            for p in pending.iter() {
                s.push_str(&format!("  {:?}\n", p.provides));
            }
        }
        s
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("services", &self.service_descriptors().len())
            .finish()
    }
}
