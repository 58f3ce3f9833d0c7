//! Configuration values and configuration-driven construction.
//!
//! [`ConfigRepository`] holds a tree of JSON values addressed with dotted
//! keys (`"database.pool.size"`), loaded from JSON files (and YAML files with
//! the `yaml` feature). [`ConfigurableResolver`] builds classes whose
//! constructor parameters are filled from configuration by parameter name.

use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::arguments::{Argument, Arguments};
use crate::class::{ClassDescriptor, Injectable};
use crate::descriptors::{DefaultValue, ParameterDescriptor};
use crate::error::{DiError, DiResult};
use crate::registration::AnyArc;

/// Dotted-key configuration store.
///
/// # Examples
///
/// ```rust
/// use ferrous_container::ConfigRepository;
/// use serde_json::json;
///
/// let mut config = ConfigRepository::new();
/// config.set("database.host", json!("localhost"));
/// config.set("database.port", json!(5432));
///
/// assert_eq!(config.get("database.host"), Some(&json!("localhost")));
/// assert_eq!(config.get_as::<u16>("database.port").unwrap(), Some(5432));
/// assert_eq!(config.get("database.user"), None);
/// assert_eq!(config.get_or("database.user", json!("root")), json!("root"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigRepository {
    values: Map<String, Value>,
}

impl ConfigRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing JSON object. Anything else is rejected.
    pub fn from_value(value: Value) -> DiResult<Self> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            other => Err(DiError::Config(format!(
                "configuration root must be an object, got {}",
                kind_of(&other)
            ))),
        }
    }

    /// Loads a configuration file and merges its top-level keys over the
    /// current values. Nested objects are replaced, not merged.
    ///
    /// `.yaml`/`.yml` files need the `yaml` feature; every other file is
    /// read as JSON.
    pub fn load(&mut self, path: impl AsRef<Path>) -> DiResult<&Map<String, Value>> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            DiError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;

        let loaded = match parse(path, &text)? {
            Value::Object(map) => map,
            other => {
                return Err(DiError::Config(format!(
                    "{} must contain an object, got {}",
                    path.display(),
                    kind_of(&other)
                )))
            }
        };

        tracing::debug!(path = %path.display(), keys = loaded.len(), "configuration loaded");
        self.values.extend(loaded);
        Ok(&self.values)
    }

    /// Value at the dotted `key`. Missing keys and `null` values are `None`.
    /// Array elements are addressed by index (`"servers.0.host"`).
    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut parts = key.split('.');
        let mut current = self.values.get(parts.next()?)?;
        for part in parts {
            current = match current {
                Value::Object(map) => map.get(part)?,
                Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        if current.is_null() {
            None
        } else {
            Some(current)
        }
    }

    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.get(key).cloned().unwrap_or(default)
    }

    /// Decodes the value at `key` into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> DiResult<Option<T>> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| DiError::Config(format!("{}: {}", key, e))),
        }
    }

    /// Stores `value` at the dotted `key`, creating intermediate objects and
    /// replacing non-object values in the way.
    pub fn set(&mut self, key: &str, value: Value) {
        let mut parts: Vec<&str> = key.split('.').collect();
        let last = match parts.pop() {
            Some(last) => last,
            None => return,
        };

        let mut current = &mut self.values;
        for part in parts {
            let slot = current
                .entry(part.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            current = match slot.as_object_mut() {
                Some(map) => map,
                None => return,
            };
        }
        current.insert(last.to_string(), value);
    }

    pub fn all(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

fn parse(path: &Path, text: &str) -> DiResult<Value> {
    match path.extension().and_then(|ext| ext.to_str()) {
        #[cfg(feature = "yaml")]
        Some("yaml") | Some("yml") => serde_yaml::from_str(text)
            .map_err(|e| DiError::Config(format!("{}: {}", path.display(), e))),
        _ => serde_json::from_str(text)
            .map_err(|e| DiError::Config(format!("{}: {}", path.display(), e))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Builds classes from configuration instead of the container.
///
/// Each constructor parameter is looked up by name in the top level of the
/// configuration. Builtin parameters are decoded into their declared type;
/// untyped parameters receive the raw [`serde_json::Value`]. A missing or
/// `null` entry falls back to the parameter default, otherwise resolution
/// fails with [`DiError::MissingConfiguration`].
///
/// ```rust
/// use ferrous_container::{ClassDescriptor, ConfigRepository, ConfigurableResolver, Injectable, ParameterDescriptor};
/// use serde_json::json;
///
/// struct Pool { size: u32, name: String }
///
/// impl Injectable for Pool {
///     fn describe() -> ClassDescriptor {
///         ClassDescriptor::of::<Pool>()
///             .param(ParameterDescriptor::builtin::<u32>("size"))
///             .param(ParameterDescriptor::builtin::<String>("name").with_default(String::from("main")))
///             .construct(|args| Ok(Pool { size: args.cloned(0)?, name: args.cloned(1)? }))
///     }
/// }
///
/// let config = ConfigRepository::from_value(json!({ "size": 8 })).unwrap();
/// let pool = ConfigurableResolver::new(config).resolve::<Pool>().unwrap();
/// assert_eq!(pool.size, 8);
/// assert_eq!(pool.name, "main");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigurableResolver {
    config: ConfigRepository,
}

impl ConfigurableResolver {
    pub fn new(config: ConfigRepository) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConfigRepository {
        &self.config
    }

    /// Builds `T` from its own descriptor.
    pub fn resolve<T: Injectable>(&self) -> DiResult<Arc<T>> {
        let class = T::describe();
        self.resolve_class(&class)?
            .downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(class.name().to_string()))
    }

    /// Builds the class described by `class`.
    pub fn resolve_class(&self, class: &ClassDescriptor) -> DiResult<AnyArc> {
        if !class.is_instantiable() {
            return Err(DiError::NotInstantiable(class.name().to_string()));
        }

        let mut args = Arguments::new();
        for param in class.constructor().unwrap_or(&[]) {
            let argument = self.resolve_parameter(param)?;
            args.push_named(param.name(), argument);
        }
        class.instantiate(&args)
    }

    fn resolve_parameter(&self, param: &ParameterDescriptor) -> DiResult<Argument> {
        if let Some(value) = self.config.get(param.name()) {
            return decode_parameter(param, value).map(Argument::Value);
        }

        match param.default_value() {
            Some(DefaultValue::Null) => Ok(Argument::Null),
            Some(DefaultValue::Value(value)) => Ok(Argument::Value(value.clone())),
            None => Err(DiError::MissingConfiguration(param.name().to_string())),
        }
    }
}

fn decode_parameter(param: &ParameterDescriptor, value: &Value) -> DiResult<AnyArc> {
    if let Some(decode) = param.config_decoder {
        return decode(value);
    }
    match param.declared_type() {
        None => Ok(Arc::new(value.clone())),
        Some(declared) => Err(DiError::TypeMismatch(format!(
            "`{}` cannot be read from configuration as {}",
            param.name(),
            declared.name()
        ))),
    }
}
