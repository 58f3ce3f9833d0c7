//! Descriptors for introspection: registered services and declared parameters.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::class::{ClassDescriptor, Injectable};
use crate::error::{DiError, DiResult};
use crate::key::id_of;
use crate::lifetime::Lifetime;
use crate::registration::AnyArc;

/// Service descriptor for introspection and diagnostics
///
/// A snapshot of one registry entry, produced by
/// [`Container::service_descriptors`](crate::Container::service_descriptors).
///
/// # Examples
///
/// ```rust
/// use ferrous_container::{Container, Lifetime};
///
/// let container = Container::new();
/// container.instance("port", 8080u16);
/// container.tag("port", "settings");
///
/// let descriptors = container.service_descriptors();
/// let port = descriptors.iter().find(|d| d.id == "port").unwrap();
/// assert_eq!(port.lifetime, Lifetime::Singleton);
/// assert!(!port.is_factory);
/// assert_eq!(port.tags, vec!["settings".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    /// The service id
    pub id: String,
    /// Service lifetime
    pub lifetime: Lifetime,
    /// Whether construction invokes a factory
    pub is_factory: bool,
    /// Whether a shared instance is already cached
    pub instantiated: bool,
    /// Tags the id is indexed under, sorted
    pub tags: Vec<String>,
}

/// Decodes a configuration value into the parameter's declared type.
pub(crate) type ConfigDecoder = fn(&serde_json::Value) -> DiResult<AnyArc>;

fn decode_config<T>(value: &serde_json::Value) -> DiResult<AnyArc>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    serde_json::from_value::<T>(value.clone())
        .map(|decoded| Arc::new(decoded) as AnyArc)
        .map_err(|e| DiError::TypeMismatch(format!("{}: {}", std::any::type_name::<T>(), e)))
}

/// The type a parameter declares.
#[derive(Clone)]
pub enum DeclaredType {
    /// A primitive/builtin type. Never looked up in the container.
    Builtin(&'static str),
    /// A service type, looked up under `id`. `autowire` lets the resolver
    /// construct the type itself when nothing is registered under `id`.
    Service {
        id: String,
        autowire: Option<fn() -> ClassDescriptor>,
    },
}

impl DeclaredType {
    /// Type name as written in error messages.
    pub fn name(&self) -> &str {
        match self {
            DeclaredType::Builtin(name) => name,
            DeclaredType::Service { id, .. } => id,
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, DeclaredType::Builtin(_))
    }
}

impl fmt::Debug for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::Builtin(name) => write!(f, "Builtin({})", name),
            DeclaredType::Service { id, autowire } => f
                .debug_struct("Service")
                .field("id", id)
                .field("autowire", &autowire.is_some())
                .finish(),
        }
    }
}

/// A parameter's declared default.
#[derive(Clone)]
pub enum DefaultValue {
    /// `null` / `None`
    Null,
    Value(AnyArc),
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Null => f.write_str("Null"),
            DefaultValue::Value(_) => f.write_str("Value(..)"),
        }
    }
}

/// One declared constructor or method parameter.
///
/// This is what the resolver inspects in place of runtime reflection: a name,
/// an optional declared type, nullability and an optional default.
///
/// # Examples
///
/// ```rust
/// use ferrous_container::ParameterDescriptor;
///
/// struct Logger;
///
/// let logger = ParameterDescriptor::service::<Logger>("logger").default_null();
/// assert!(logger.is_nullable());
/// assert!(logger.has_default());
///
/// let retries = ParameterDescriptor::builtin::<u32>("retries").with_default(3u32);
/// assert!(retries.declared_type().unwrap().is_builtin());
/// ```
#[derive(Clone)]
pub struct ParameterDescriptor {
    name: String,
    declared_type: Option<DeclaredType>,
    nullable: bool,
    default: Option<DefaultValue>,
    pub(crate) config_decoder: Option<ConfigDecoder>,
}

impl ParameterDescriptor {
    /// A parameter without a declared type.
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: None,
            nullable: false,
            default: None,
            config_decoder: None,
        }
    }

    /// A builtin-typed parameter. The type can be decoded from configuration.
    pub fn builtin<T>(name: impl Into<String>) -> Self
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        Self {
            declared_type: Some(DeclaredType::Builtin(std::any::type_name::<T>())),
            config_decoder: Some(decode_config::<T>),
            ..Self::untyped(name)
        }
    }

    /// A parameter declaring the service type `T`, looked up under `id_of::<T>()`.
    pub fn service<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self::service_id(name, id_of::<T>())
    }

    /// A parameter declaring a service type by explicit id (an interface name, say).
    pub fn service_id(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            declared_type: Some(DeclaredType::Service {
                id: id.into(),
                autowire: None,
            }),
            ..Self::untyped(name)
        }
    }

    /// A parameter declaring `T` that the resolver may autowire when no
    /// container entry exists for it.
    pub fn autowired<T: Injectable>(name: impl Into<String>) -> Self {
        Self {
            declared_type: Some(DeclaredType::Service {
                id: id_of::<T>(),
                autowire: Some(T::describe),
            }),
            ..Self::untyped(name)
        }
    }

    /// Marks the declared type nullable.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Declares a default value.
    pub fn with_default<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.default = Some(DefaultValue::Value(Arc::new(value)));
        self
    }

    /// Declares `null` as default; implies nullable.
    pub fn default_null(mut self) -> Self {
        self.nullable = true;
        self.default = Some(DefaultValue::Null);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_type(&self) -> Option<&DeclaredType> {
        self.declared_type.as_ref()
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub fn default_value(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }
}

impl fmt::Debug for ParameterDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterDescriptor")
            .field("name", &self.name)
            .field("declared_type", &self.declared_type)
            .field("nullable", &self.nullable)
            .field("default", &self.default)
            .finish()
    }
}
