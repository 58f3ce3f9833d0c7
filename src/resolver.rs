//! Class registry and parameter resolution for autowiring.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use crate::arguments::{Argument, Arguments};
use crate::class::ClassDescriptor;
use crate::container::Container;
use crate::descriptors::{DeclaredType, DefaultValue, ParameterDescriptor};
use crate::error::{DiError, DiResult};
use crate::registration::AnyArc;

/// Known class descriptors plus per-class parameter bindings.
///
/// Owned by the container; the resolution algorithm itself lives in
/// [`Container::resolve_class`](crate::Container::resolve_class) since it
/// needs the registry for declared service parameters.
#[derive(Default)]
pub struct DependencyResolver {
    classes: HashMap<String, Arc<ClassDescriptor>>,
    by_type: HashMap<TypeId, String>,
    bindings: HashMap<String, HashMap<String, AnyArc>>,
}

impl DependencyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `class` under its name, replacing any prior descriptor.
    pub fn register_class(&mut self, class: ClassDescriptor) {
        let name = class.name().to_string();
        if let Some(type_id) = class.type_id() {
            self.by_type.insert(type_id, name.clone());
        }
        self.classes.insert(name, Arc::new(class));
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn class(&self, name: &str) -> Option<Arc<ClassDescriptor>> {
        self.classes.get(name).cloned()
    }

    /// Descriptor of the class whose instances have the given `TypeId`.
    pub fn class_by_type_id(&self, type_id: TypeId) -> Option<Arc<ClassDescriptor>> {
        self.by_type.get(&type_id).and_then(|name| self.class(name))
    }

    /// Binds a fixed value to `parameter` of `class`, overwriting any prior binding.
    pub fn bind_parameter(&mut self, class: impl Into<String>, parameter: impl Into<String>, value: AnyArc) {
        self.bindings
            .entry(class.into())
            .or_default()
            .insert(parameter.into(), value);
    }

    pub fn bindings_for(&self, class: &str) -> Option<HashMap<String, AnyArc>> {
        self.bindings.get(class).cloned()
    }
}

/// Resolves `params` in declaration order.
///
/// Per parameter: a binding for its name, then a declared service type the
/// container can satisfy, then its default. Anything else is unresolvable.
pub(crate) fn resolve_parameters(
    container: &Container,
    class: &str,
    params: &[ParameterDescriptor],
    bindings: Option<&HashMap<String, AnyArc>>,
) -> DiResult<Arguments> {
    let mut args = Arguments::new();
    for param in params {
        let argument = resolve_parameter(container, class, param, bindings)?;
        args.push_named(param.name(), argument);
    }
    Ok(args)
}

fn resolve_parameter(
    container: &Container,
    class: &str,
    param: &ParameterDescriptor,
    bindings: Option<&HashMap<String, AnyArc>>,
) -> DiResult<Argument> {
    if let Some(value) = bindings.and_then(|b| b.get(param.name())) {
        return Ok(Argument::Value(value.clone()));
    }

    if let Some(DeclaredType::Service { id, autowire }) = param.declared_type() {
        if container.has(id) {
            return container.get(id).map(Argument::Value);
        }
        if container.has_class(id) {
            return container.resolve_class(id).map(Argument::Value);
        }
        if let Some(describe) = autowire {
            let descriptor = describe();
            let name = descriptor.name().to_string();
            container.register_class_descriptor(descriptor);
            return container.resolve_class(&name).map(Argument::Value);
        }
    }

    match param.default_value() {
        Some(DefaultValue::Null) => Ok(Argument::Null),
        Some(DefaultValue::Value(value)) => Ok(Argument::Value(value.clone())),
        None => Err(DiError::UnresolvedParameter {
            class: class.to_string(),
            parameter: param.name().to_string(),
        }),
    }
}
