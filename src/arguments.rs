//! Positional argument lists handed to instantiators, methods and keyed factories.

use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::registration::AnyArc;

/// A single resolved argument.
#[derive(Clone)]
pub enum Argument {
    Value(AnyArc),
    /// Explicit null, produced by a `null` default.
    Null,
}

impl std::fmt::Debug for Argument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Argument::Value(_) => f.write_str("Value(..)"),
            Argument::Null => f.write_str("Null"),
        }
    }
}

/// Ordered arguments, optionally named after the parameter they satisfy.
///
/// # Examples
///
/// ```rust
/// use ferrous_container::Arguments;
///
/// let args = Arguments::new().with(String::from("smtp.local")).with(25u16);
/// assert_eq!(args.len(), 2);
/// assert_eq!(*args.get::<String>(0).unwrap(), "smtp.local");
/// assert_eq!(args.cloned::<u16>(1).unwrap(), 25);
/// assert!(args.get::<u16>(0).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    items: Vec<(Option<String>, Argument)>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value.
    pub fn with<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.push(Arc::new(value));
        self
    }

    /// Appends an already type-erased value.
    pub fn push(&mut self, value: AnyArc) {
        self.items.push((None, Argument::Value(value)));
    }

    pub(crate) fn push_named(&mut self, name: &str, argument: Argument) {
        self.items.push((Some(name.to_string()), argument));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Raw argument at `index`.
    pub fn raw(&self, index: usize) -> Option<&Argument> {
        self.items.get(index).map(|(_, arg)| arg)
    }

    /// Required argument at `index`. A `Null` argument is a type mismatch.
    pub fn get<T: Send + Sync + 'static>(&self, index: usize) -> DiResult<Arc<T>> {
        self.optional(index)?
            .ok_or_else(|| DiError::TypeMismatch(format!("argument {} is null", index)))
    }

    /// Nullable argument at `index`: `Null` becomes `None`.
    pub fn optional<T: Send + Sync + 'static>(&self, index: usize) -> DiResult<Option<Arc<T>>> {
        match self.raw(index) {
            None => Err(DiError::MissingArgument(format!("#{}", index))),
            Some(arg) => downcast_argument(arg, || format!("argument {}", index)),
        }
    }

    /// Clones the argument at `index` out of its `Arc`.
    pub fn cloned<T: Clone + Send + Sync + 'static>(&self, index: usize) -> DiResult<T> {
        self.get::<T>(index).map(|value| (*value).clone())
    }

    /// Required argument bound to the parameter `name`.
    pub fn named<T: Send + Sync + 'static>(&self, name: &str) -> DiResult<Arc<T>> {
        self.named_optional(name)?
            .ok_or_else(|| DiError::TypeMismatch(format!("argument `{}` is null", name)))
    }

    /// Nullable argument bound to the parameter `name`.
    pub fn named_optional<T: Send + Sync + 'static>(&self, name: &str) -> DiResult<Option<Arc<T>>> {
        let arg = self
            .items
            .iter()
            .find(|(n, _)| n.as_deref() == Some(name))
            .map(|(_, arg)| arg)
            .ok_or_else(|| DiError::MissingArgument(name.to_string()))?;
        downcast_argument(arg, || format!("argument `{}`", name))
    }
}

fn downcast_argument<T, L>(arg: &Argument, label: L) -> DiResult<Option<Arc<T>>>
where
    T: Send + Sync + 'static,
    L: FnOnce() -> String,
{
    match arg {
        Argument::Null => Ok(None),
        Argument::Value(value) => value.clone().downcast::<T>().map(Some).map_err(|_| {
            DiError::TypeMismatch(format!("{} is not {}", label(), std::any::type_name::<T>()))
        }),
    }
}

impl FromIterator<AnyArc> for Arguments {
    fn from_iter<I: IntoIterator<Item = AnyArc>>(iter: I) -> Self {
        let mut args = Arguments::new();
        for value in iter {
            args.push(value);
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_is_none_for_optional_and_error_for_required() {
        let mut args = Arguments::new();
        args.push_named("logger", Argument::Null);

        assert!(args.optional::<String>(0).unwrap().is_none());
        assert!(args.named_optional::<String>("logger").unwrap().is_none());
        assert!(matches!(args.get::<String>(0), Err(DiError::TypeMismatch(_))));
    }

    #[test]
    fn missing_positions_and_names_are_reported() {
        let args = Arguments::new().with(1u8);
        assert_eq!(args.get::<u8>(3).unwrap_err(), DiError::MissingArgument("#3".into()));
        assert_eq!(args.named::<u8>("x").unwrap_err(), DiError::MissingArgument("x".into()));
    }
}
