//! Post-resolution decoration pipeline.
//!
//! Middleware sees every instance handed out by the registry (`get`, cache
//! hits included) and by keyed factories (`create_from_factory`). Each
//! decorator receives the previous decorator's output, so the chain runs in
//! registration order: `m2(m1(instance))`.
//!
//! Because the chain is re-applied on every `get` of a cached singleton,
//! decorators must tolerate seeing the same instance repeatedly.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::registration::AnyArc;

/// A decorator applied to resolved instances.
///
/// # Examples
///
/// ```
/// use ferrous_container::{AnyArc, Container, Middleware};
/// use std::sync::Arc;
///
/// struct Uppercase;
///
/// impl Middleware for Uppercase {
///     fn handle(&self, _id: &str, instance: AnyArc) -> AnyArc {
///         match instance.downcast_ref::<String>() {
///             Some(s) => Arc::new(s.to_uppercase()),
///             None => instance,
///         }
///     }
/// }
///
/// let container = Container::new();
/// container.instance("greeting", String::from("hello"));
/// container.add_middleware_handler(Uppercase);
///
/// let greeting = container.get_as::<String>("greeting").unwrap();
/// assert_eq!(*greeting, "HELLO");
/// ```
pub trait Middleware: Send + Sync {
    /// Decorates `instance`, resolved under `abstract_id`.
    fn handle(&self, abstract_id: &str, instance: AnyArc) -> AnyArc;
}

impl<M: Middleware + ?Sized> Middleware for Arc<M> {
    fn handle(&self, abstract_id: &str, instance: AnyArc) -> AnyArc {
        (**self).handle(abstract_id, instance)
    }
}

/// Internal wrapper turning a closure into a [`Middleware`].
struct FnMiddleware<F>(F);

impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(&str, AnyArc) -> AnyArc + Send + Sync,
{
    fn handle(&self, abstract_id: &str, instance: AnyArc) -> AnyArc {
        (self.0)(abstract_id, instance)
    }
}

/// Decorates only instances of type `T`; everything else passes through.
pub struct TypedMiddleware<T, F> {
    decorate: F,
    _marker: PhantomData<fn() -> T>,
}

/// Builds a middleware that decorates instances of `T` only.
///
/// ```
/// use ferrous_container::{middleware, Container};
/// use std::sync::Arc;
///
/// let container = Container::new();
/// container.instance("port", 8080u16);
/// container.instance("name", String::from("api"));
/// container.add_middleware_handler(middleware::for_type::<u16, _>(|_, port| Arc::new(*port + 1)));
///
/// assert_eq!(*container.get_as::<u16>("port").unwrap(), 8081);
/// assert_eq!(*container.get_as::<String>("name").unwrap(), "api");
/// ```
pub fn for_type<T, F>(decorate: F) -> TypedMiddleware<T, F>
where
    T: Send + Sync + 'static,
    F: Fn(&str, Arc<T>) -> Arc<T> + Send + Sync,
{
    TypedMiddleware {
        decorate,
        _marker: PhantomData,
    }
}

impl<T, F> Middleware for TypedMiddleware<T, F>
where
    T: Send + Sync + 'static,
    F: Fn(&str, Arc<T>) -> Arc<T> + Send + Sync,
{
    fn handle(&self, abstract_id: &str, instance: AnyArc) -> AnyArc {
        match instance.clone().downcast::<T>() {
            Ok(typed) => (self.decorate)(abstract_id, typed),
            Err(_) => instance,
        }
    }
}

/// Ordered decorator chain.
#[derive(Clone, Default)]
pub struct MiddlewareManager {
    chain: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a closure decorator to the end of the chain.
    pub fn add_middleware<F>(&mut self, middleware: F)
    where
        F: Fn(&str, AnyArc) -> AnyArc + Send + Sync + 'static,
    {
        self.chain.push(Arc::new(FnMiddleware(middleware)));
    }

    /// Appends a [`Middleware`] implementation to the end of the chain.
    pub fn add_handler<M: Middleware + 'static>(&mut self, middleware: M) {
        self.chain.push(Arc::new(middleware));
    }

    /// Folds the chain over `instance`. An empty chain returns it unchanged.
    pub fn apply_middleware(&self, abstract_id: &str, instance: AnyArc) -> AnyArc {
        self.chain
            .iter()
            .fold(instance, |current, middleware| middleware.handle(abstract_id, current))
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn clear(&mut self) {
        self.chain.clear();
    }
}

/// Ready-made middleware.
pub mod decorators {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Logs every instance handed out, at `debug` level.
    pub struct LoggingMiddleware {
        target: &'static str,
    }

    impl LoggingMiddleware {
        pub fn new(target: &'static str) -> Self {
            Self { target }
        }
    }

    impl Default for LoggingMiddleware {
        fn default() -> Self {
            Self::new("container")
        }
    }

    impl Middleware for LoggingMiddleware {
        fn handle(&self, abstract_id: &str, instance: AnyArc) -> AnyArc {
            tracing::debug!(target: "ferrous_container::middleware", label = self.target, service = abstract_id, "instance handed out");
            instance
        }
    }

    /// Counts how often each service passes through the chain.
    ///
    /// Share it through an `Arc` to read the counts after registering it.
    ///
    /// ```
    /// use ferrous_container::{decorators::CountingMiddleware, Container};
    /// use std::sync::Arc;
    ///
    /// let counter = Arc::new(CountingMiddleware::new());
    /// let container = Container::new();
    /// container.singleton("clock", |_| 0u64);
    /// container.add_middleware_handler(counter.clone());
    ///
    /// container.get("clock").unwrap();
    /// container.get("clock").unwrap();
    /// assert_eq!(counter.count(), 2);
    /// assert_eq!(counter.count_for("clock"), 2);
    /// ```
    #[derive(Default)]
    pub struct CountingMiddleware {
        count: AtomicU64,
        per_service: Mutex<HashMap<String, u64>>,
    }

    impl CountingMiddleware {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn count(&self) -> u64 {
            self.count.load(Ordering::Relaxed)
        }

        pub fn count_for(&self, abstract_id: &str) -> u64 {
            self.per_service.lock().get(abstract_id).copied().unwrap_or(0)
        }
    }

    impl Middleware for CountingMiddleware {
        fn handle(&self, abstract_id: &str, instance: AnyArc) -> AnyArc {
            self.count.fetch_add(1, Ordering::Relaxed);
            *self.per_service.lock().entry(abstract_id.to_string()).or_insert(0) += 1;
            instance
        }
    }
}
