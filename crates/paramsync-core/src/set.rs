//! Name- and index-addressable parameter collection.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ParamError;
use crate::param_info::lookup_key;
use crate::parameter::Parameter;

/// How a caller refers to a parameter.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// A parameter handle, resolved by identity.
    Param(&'a Arc<Parameter>),
    /// Position in insertion order.
    Index(usize),
    /// Name, matched through [`lookup_key`].
    Name(&'a str),
}

impl<'a> From<&'a Arc<Parameter>> for Target<'a> {
    fn from(param: &'a Arc<Parameter>) -> Self {
        Target::Param(param)
    }
}

impl From<usize> for Target<'_> {
    fn from(index: usize) -> Self {
        Target::Index(index)
    }
}

impl<'a> From<&'a str> for Target<'a> {
    fn from(name: &'a str) -> Self {
        Target::Name(name)
    }
}

impl<'a> From<&'a String> for Target<'a> {
    fn from(name: &'a String) -> Self {
        Target::Name(name.as_str())
    }
}

/// Resolves a [`Target`] to a parameter handle.
///
/// `None` means "not found"; callers treat it as a no-op, never as an error.
pub trait ParameterLookup {
    /// Looks up the parameter a target refers to.
    fn resolve(&self, target: Target<'_>) -> Option<Arc<Parameter>>;
}

/// Ordered collection of parameters with name lookup.
///
/// Parameters are shared (`Arc`) so queued changes can outlive a `clear`.
#[derive(Debug, Default)]
pub struct ParameterSet {
    parameters: Vec<Arc<Parameter>>,
    by_key: HashMap<String, usize>,
}

impl ParameterSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter and returns the shared handle.
    ///
    /// Fails if the name has no alphanumeric characters or if another
    /// parameter already has the same lookup key.
    pub fn add(&mut self, parameter: Parameter) -> Result<Arc<Parameter>, ParamError> {
        let key = lookup_key(parameter.name());
        if key.is_empty() {
            return Err(ParamError::EmptyName(parameter.name().to_string()));
        }
        if let Some(&existing) = self.by_key.get(&key) {
            return Err(ParamError::DuplicateName {
                name: parameter.name().to_string(),
                existing: self.parameters[existing].name().to_string(),
            });
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(name = parameter.name(), index = self.parameters.len(), "param_add");

        let parameter = Arc::new(parameter);
        self.by_key.insert(key, self.parameters.len());
        self.parameters.push(Arc::clone(&parameter));
        Ok(parameter)
    }

    /// Looks up a parameter by name (see [`lookup_key`]).
    pub fn get(&self, name: &str) -> Option<&Arc<Parameter>> {
        self.by_key
            .get(&lookup_key(name))
            .and_then(|&index| self.parameters.get(index))
    }

    /// Looks up a parameter by insertion index.
    pub fn get_index(&self, index: usize) -> Option<&Arc<Parameter>> {
        self.parameters.get(index)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Whether the set holds no parameters.
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Iterates parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Parameter>> {
        self.parameters.iter()
    }

    /// Removes every parameter from the set.
    ///
    /// Handles held elsewhere (including queued changes) stay valid.
    pub fn clear(&mut self) {
        #[cfg(feature = "tracing")]
        tracing::debug!(count = self.parameters.len(), "param_clear");

        self.parameters.clear();
        self.by_key.clear();
    }
}

impl ParameterLookup for ParameterSet {
    fn resolve(&self, target: Target<'_>) -> Option<Arc<Parameter>> {
        match target {
            Target::Param(param) => Some(Arc::clone(param)),
            Target::Index(index) => self.get_index(index).cloned(),
            Target::Name(name) => self.get(name).cloned(),
        }
    }
}

impl<'a> IntoIterator for &'a ParameterSet {
    type Item = &'a Arc<Parameter>;
    type IntoIter = std::slice::Iter<'a, Arc<Parameter>>;

    fn into_iter(self) -> Self::IntoIter {
        self.parameters.iter()
    }
}
