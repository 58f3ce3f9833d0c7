//! # ferrous-container
//!
//! A string-keyed runtime service container with autowiring, deferred
//! services, tags, scopes and middleware.
//!
//! ## Features
//!
//! - **Lifecycles**: shared (singleton), transient and deferred services
//! - **Autowiring**: classes describe their constructors with [`ClassDescriptor`];
//!   parameters are filled from bindings, the container or defaults
//! - **Circular dependency detection**: cycles fail with the full path instead
//!   of overflowing the stack
//! - **Contextual bindings and named scopes**: per-context implementations and
//!   custom resolution strategies
//! - **Middleware**: an ordered decoration chain over resolved instances
//! - **Tags, aliases, providers and configuration**
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_container::{Container, DiResult};
//! use std::sync::Arc;
//!
//! struct Database {
//!     connection_string: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! # fn main() -> DiResult<()> {
//! let container = Container::new();
//! container.instance("db", Database {
//!     connection_string: "postgres://localhost".to_string(),
//! });
//! container.transient("users", |c| UserService {
//!     db: c.get_as::<Database>("db").expect("db is registered"),
//! });
//!
//! let users = container.get_as::<UserService>("users")?;
//! assert_eq!(users.db.connection_string, "postgres://localhost");
//! # Ok(())
//! # }
//! ```
//!
//! ## Autowiring
//!
//! ```rust
//! use ferrous_container::{ClassDescriptor, Container, Injectable, ParameterDescriptor};
//! use std::sync::Arc;
//!
//! struct Logger;
//!
//! impl Injectable for Logger {
//!     fn describe() -> ClassDescriptor {
//!         ClassDescriptor::of::<Logger>().construct(|_| Ok(Logger))
//!     }
//! }
//!
//! struct Handler {
//!     logger: Arc<Logger>,
//!     name: String,
//! }
//!
//! impl Injectable for Handler {
//!     fn describe() -> ClassDescriptor {
//!         ClassDescriptor::of::<Handler>()
//!             .param(ParameterDescriptor::autowired::<Logger>("logger"))
//!             .param(ParameterDescriptor::builtin::<String>("name"))
//!             .construct(|args| Ok(Handler { logger: args.get(0)?, name: args.cloned(1)? }))
//!     }
//! }
//!
//! let container = Container::new();
//! container.bind_parameter(ferrous_container::id_of::<Handler>(), "name", String::from("index"));
//!
//! let handler = container.resolve::<Handler>().unwrap();
//! assert_eq!(handler.name, "index");
//! ```
//!
//! ## Lifetimes
//!
//! - **Singleton** (`shared = true`): constructed once, cached until removed
//! - **Transient** (`shared = false`): constructed on every `get`
//! - **Deferred**: constructed on first access, then shared

pub mod alias;
pub mod arguments;
pub mod class;
pub mod config;
pub mod container;
pub mod contextual;
pub mod descriptors;
pub mod error;
pub mod factory;
pub mod key;
pub mod lifetime;
pub mod middleware;
pub mod observer;
pub mod providers;
pub mod resolver;
pub mod scope;

mod internal;
mod registration;

pub use alias::AliasManager;
pub use arguments::{Argument, Arguments};
pub use class::{ClassBuilder, ClassDescriptor, Injectable, MethodDescriptor};
pub use config::{ConfigRepository, ConfigurableResolver};
pub use container::Container;
pub use contextual::ContextualBindingManager;
pub use descriptors::{DeclaredType, DefaultValue, ParameterDescriptor, ServiceDescriptor};
pub use error::{DiError, DiResult};
pub use factory::{FactoryManager, ParametrizedFactory};
pub use key::id_of;
pub use lifetime::Lifetime;
pub use middleware::{decorators, Middleware, MiddlewareManager};
pub use observer::{ContainerObserver, LoggingObserver, MetricsObserver};
pub use providers::ServiceProvider;
pub use registration::{AnyArc, Concrete, Factory};
pub use resolver::DependencyResolver;
pub use scope::{ScopeManager, ScopeResolver};
