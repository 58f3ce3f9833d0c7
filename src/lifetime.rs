//! Service lifetime definitions.

/// Lifetimes controlling instance caching behavior
///
/// A definition registered with `shared = true` is a singleton, `shared = false`
/// is transient. Deferred entries become singletons once they are first accessed.
///
/// # Examples
///
/// ```rust
/// use ferrous_container::{Container, Lifetime};
///
/// let container = Container::new();
/// container.singleton("config", |_| 42u32);
/// container.transient("request", |_| String::from("req"));
/// container.defer("mailer", |_| String::from("smtp"));
///
/// let lifetimes = |id: &str| {
///     container
///         .service_descriptors()
///         .into_iter()
///         .find(|d| d.id == id)
///         .map(|d| d.lifetime)
/// };
/// assert_eq!(lifetimes("config"), Some(Lifetime::Singleton));
/// assert_eq!(lifetimes("request"), Some(Lifetime::Transient));
/// assert_eq!(lifetimes("mailer"), Some(Lifetime::Deferred));
///
/// container.get("mailer").unwrap();
/// assert_eq!(lifetimes("mailer"), Some(Lifetime::Singleton));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// Constructed on first `get` and cached until removed or cleared.
    Singleton,
    /// Constructed fresh on every `get`, never cached.
    Transient,
    /// Registered but not yet materialized; becomes a singleton on first access.
    Deferred,
}

impl Lifetime {
    /// Maps the registry's `shared` flag onto a lifetime.
    pub fn from_shared(shared: bool) -> Self {
        if shared {
            Lifetime::Singleton
        } else {
            Lifetime::Transient
        }
    }

    /// Whether constructed instances are cached.
    pub fn is_shared(self) -> bool {
        !matches!(self, Lifetime::Transient)
    }
}
