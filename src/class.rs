//! Class descriptors: the compile-time stand-in for constructor reflection.
//!
//! A [`ClassDescriptor`] names a type, lists its constructor parameters and
//! knows how to build an instance from resolved [`Arguments`]. Types opt into
//! autowiring by implementing [`Injectable`].
//!
//! # Examples
//!
//! ```rust
//! use ferrous_container::{ClassDescriptor, Container, Injectable, ParameterDescriptor};
//! use std::sync::Arc;
//!
//! struct Transport;
//!
//! struct Mailer {
//!     transport: Arc<Transport>,
//!     retries: u32,
//! }
//!
//! impl Injectable for Mailer {
//!     fn describe() -> ClassDescriptor {
//!         ClassDescriptor::of::<Mailer>()
//!             .param(ParameterDescriptor::service::<Transport>("transport"))
//!             .param(ParameterDescriptor::builtin::<u32>("retries").with_default(3u32))
//!             .construct(|args| {
//!                 Ok(Mailer {
//!                     transport: args.get(0)?,
//!                     retries: args.cloned(1)?,
//!                 })
//!             })
//!     }
//! }
//!
//! let container = Container::new();
//! container.instance(ferrous_container::id_of::<Transport>(), Transport);
//!
//! let mailer = container.resolve::<Mailer>().unwrap();
//! assert_eq!(mailer.retries, 3);
//! ```

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::arguments::Arguments;
use crate::descriptors::ParameterDescriptor;
use crate::error::{DiError, DiResult};
use crate::key::id_of;
use crate::registration::AnyArc;

/// Builds an instance from resolved constructor arguments.
pub type Instantiator = Arc<dyn Fn(&Arguments) -> DiResult<AnyArc> + Send + Sync>;

/// Invokes a method on a type-erased instance.
pub type MethodInvoker = Arc<dyn Fn(&AnyArc, &Arguments) -> DiResult<AnyArc> + Send + Sync>;

/// Types that describe their own constructor for autowiring.
pub trait Injectable: Send + Sync + Sized + 'static {
    /// Returns the descriptor the resolver uses to construct `Self`.
    fn describe() -> ClassDescriptor;
}

/// A callable method with declared parameters.
#[derive(Clone)]
pub struct MethodDescriptor {
    name: String,
    params: Vec<ParameterDescriptor>,
    invoke: MethodInvoker,
}

impl MethodDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[ParameterDescriptor] {
        &self.params
    }

    pub(crate) fn invoke(&self, instance: &AnyArc, args: &Arguments) -> DiResult<AnyArc> {
        (self.invoke)(instance, args)
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish()
    }
}

/// Everything the resolver needs to know about a class.
#[derive(Clone)]
pub struct ClassDescriptor {
    name: String,
    type_id: Option<TypeId>,
    constructor: Option<Vec<ParameterDescriptor>>,
    instantiator: Option<Instantiator>,
    methods: HashMap<String, MethodDescriptor>,
}

impl ClassDescriptor {
    /// Starts describing `T`, named by `id_of::<T>()`.
    pub fn of<T: Send + Sync + 'static>() -> ClassBuilder<T> {
        ClassBuilder {
            name: id_of::<T>(),
            constructor: None,
            methods: HashMap::new(),
            _marker: PhantomData,
        }
    }

    /// Describes an abstract type (an interface, say) that can never be
    /// instantiated directly.
    pub fn abstract_class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_id: None,
            constructor: None,
            instantiator: None,
            methods: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_id(&self) -> Option<TypeId> {
        self.type_id
    }

    /// Declared constructor parameters; `None` when no constructor is declared.
    pub fn constructor(&self) -> Option<&[ParameterDescriptor]> {
        self.constructor.as_deref()
    }

    pub fn is_instantiable(&self) -> bool {
        self.instantiator.is_some()
    }

    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.get(name)
    }

    pub(crate) fn instantiate(&self, args: &Arguments) -> DiResult<AnyArc> {
        match &self.instantiator {
            Some(instantiator) => instantiator(args),
            None => Err(DiError::NotInstantiable(self.name.clone())),
        }
    }
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<&String> = self.methods.keys().collect();
        methods.sort();
        f.debug_struct("ClassDescriptor")
            .field("name", &self.name)
            .field("constructor", &self.constructor)
            .field("instantiable", &self.is_instantiable())
            .field("methods", &methods)
            .finish()
    }
}

/// Fluent builder for [`ClassDescriptor`].
pub struct ClassBuilder<T> {
    name: String,
    constructor: Option<Vec<ParameterDescriptor>>,
    methods: HashMap<String, MethodDescriptor>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> ClassBuilder<T> {
    /// Overrides the class name (defaults to the Rust type name).
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Appends a constructor parameter. Declares a constructor if none was yet.
    pub fn param(mut self, param: ParameterDescriptor) -> Self {
        self.constructor.get_or_insert_with(Vec::new).push(param);
        self
    }

    /// Declares an explicit constructor taking no parameters.
    pub fn empty_constructor(mut self) -> Self {
        self.constructor.get_or_insert_with(Vec::new);
        self
    }

    /// Adds a method the resolver can call with autowired arguments.
    pub fn method<R, F>(mut self, name: impl Into<String>, params: Vec<ParameterDescriptor>, body: F) -> Self
    where
        R: Send + Sync + 'static,
        F: Fn(&T, &Arguments) -> DiResult<R> + Send + Sync + 'static,
    {
        let name = name.into();
        let class = self.name.clone();
        let method = name.clone();
        let invoke: MethodInvoker = Arc::new(move |instance: &AnyArc, args: &Arguments| -> DiResult<AnyArc> {
            let this = instance
                .downcast_ref::<T>()
                .ok_or_else(|| DiError::TypeMismatch(format!("{}::{} receiver", class, method)))?;
            Ok(Arc::new(body(this, args)?))
        });
        self.methods.insert(
            name.clone(),
            MethodDescriptor { name, params, invoke },
        );
        self
    }

    /// Finishes the descriptor with the function that builds `T`.
    pub fn construct<F>(self, build: F) -> ClassDescriptor
    where
        F: Fn(&Arguments) -> DiResult<T> + Send + Sync + 'static,
    {
        let instantiator: Instantiator =
            Arc::new(move |args: &Arguments| -> DiResult<AnyArc> { Ok(Arc::new(build(args)?)) });
        ClassDescriptor {
            name: self.name,
            type_id: Some(TypeId::of::<T>()),
            constructor: self.constructor,
            instantiator: Some(instantiator),
            methods: self.methods,
        }
    }

    /// Finishes the descriptor without a way to build `T`: resolving it
    /// fails with `NotInstantiable`, but its methods stay callable.
    pub fn not_instantiable(self) -> ClassDescriptor {
        ClassDescriptor {
            name: self.name,
            type_id: Some(TypeId::of::<T>()),
            constructor: self.constructor,
            instantiator: None,
            methods: self.methods,
        }
    }
}
