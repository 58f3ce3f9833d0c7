//! Error types for the service container.

use thiserror::Error;

/// Container errors
///
/// Every failure is synchronous and aborts the resolution it happened in.
/// There is no retry and no partially built object graph.
///
/// # Examples
///
/// ```rust
/// use ferrous_container::{Container, DiError};
///
/// let container = Container::new();
/// match container.get("mailer") {
///     Err(DiError::NotFound(id)) => assert_eq!(id, "mailer"),
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use ferrous_container::DiError;
///
/// let circular = DiError::Circular(vec!["A".into(), "B".into(), "A".into()]);
/// assert_eq!(circular.to_string(), "Circular dependency: A -> B -> A");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiError {
    /// Service id is neither registered nor deferred
    #[error("Service not found: {0}")]
    NotFound(String),
    /// Type downcast failed
    #[error("Type mismatch for: {0}")]
    TypeMismatch(String),
    /// No class descriptor is known under this name
    #[error("Unknown class: {0}")]
    UnknownClass(String),
    /// Class is abstract or has no accessible constructor
    #[error("Class {0} is not instantiable")]
    NotInstantiable(String),
    /// Class has no method with this name
    #[error("Unknown method: {class}::{method}")]
    UnknownMethod { class: String, method: String },
    /// Autowiring found no binding, container entry or default
    #[error("Cannot resolve parameter `{parameter}` in class {class}")]
    UnresolvedParameter { class: String, parameter: String },
    /// Circular dependency detected (includes path)
    #[error("Circular dependency: {}", .0.join(" -> "))]
    Circular(Vec<String>),
    /// Maximum recursion depth exceeded
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),
    /// Scope was never defined
    #[error("Scope {0} is not defined")]
    UndefinedScope(String),
    /// No contextual binding for the pair
    #[error("No contextual binding for {abstract_id} in context {context}")]
    UnboundContext { abstract_id: String, context: String },
    /// No keyed factory registered
    #[error("No factory registered for: {0}")]
    MissingFactory(String),
    /// Positional or named argument absent
    #[error("Missing argument: {0}")]
    MissingArgument(String),
    /// Configuration has no value for a required parameter
    #[error("Missing configuration for parameter {0}")]
    MissingConfiguration(String),
    /// Configuration could not be read or decoded
    #[error("Configuration error: {0}")]
    Config(String),
    /// Failure reported by user code inside a factory
    #[error("Factory failed: {0}")]
    Factory(String),
}

impl DiError {
    /// Wraps any displayable failure raised inside a factory.
    pub fn factory(message: impl std::fmt::Display) -> Self {
        DiError::Factory(message.to_string())
    }
}

/// Result type for container operations
///
/// A convenience alias for `Result<T, DiError>` used throughout the crate.
///
/// ```rust
/// use ferrous_container::{DiError, DiResult};
///
/// fn failing_operation() -> DiResult<()> {
///     Err(DiError::NotFound("cache".into()))
/// }
///
/// assert!(failing_operation().is_err());
/// ```
pub type DiResult<T> = Result<T, DiError>;
