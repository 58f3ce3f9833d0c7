//! Named custom resolution strategies.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::registration::AnyArc;

/// Resolver callable for one scope, receiving the requested service id.
pub type ScopeResolver = Arc<dyn Fn(&str) -> DiResult<AnyArc> + Send + Sync>;

/// Holds one resolver per scope name (per-request, per-session and so on).
///
/// # Examples
///
/// ```rust
/// use ferrous_container::{AnyArc, DiError, ScopeManager};
/// use std::sync::Arc;
///
/// let mut scopes = ScopeManager::new();
/// assert!(matches!(
///     scopes.resolve_in_scope("request", "user"),
///     Err(DiError::UndefinedScope(_))
/// ));
///
/// scopes.define_scope("request", |id| Ok(Arc::new(format!("request:{}", id)) as AnyArc));
/// let user = scopes.resolve_in_scope("request", "user").unwrap();
/// assert_eq!(*user.downcast::<String>().unwrap(), "request:user");
/// ```
#[derive(Clone, Default)]
pub struct ScopeManager {
    scopes: HashMap<String, ScopeResolver>,
}

impl ScopeManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the resolver for `scope`, replacing any prior one.
    pub fn define_scope<F>(&mut self, scope: impl Into<String>, resolver: F)
    where
        F: Fn(&str) -> DiResult<AnyArc> + Send + Sync + 'static,
    {
        self.scopes.insert(scope.into(), Arc::new(resolver));
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.contains_key(scope)
    }

    pub fn remove_scope(&mut self, scope: &str) {
        self.scopes.remove(scope);
    }

    /// Resolver registered for `scope`.
    pub fn resolver(&self, scope: &str) -> DiResult<ScopeResolver> {
        self.scopes
            .get(scope)
            .cloned()
            .ok_or_else(|| DiError::UndefinedScope(scope.to_string()))
    }

    /// Invokes the scope's resolver with `abstract_id`.
    pub fn resolve_in_scope(&self, scope: &str, abstract_id: &str) -> DiResult<AnyArc> {
        let resolver = self.resolver(scope)?;
        resolver(abstract_id)
    }
}
