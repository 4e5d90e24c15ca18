//! Error types for parameter collections.

use thiserror::Error;

/// Errors returned when building a [`ParameterSet`](crate::ParameterSet).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParamError {
    /// The name contains no ASCII alphanumerics, so it cannot be looked up.
    #[error("parameter name '{0}' has no alphanumeric characters")]
    EmptyName(String),

    /// Another parameter already resolves to the same lookup key.
    #[error("duplicate parameter name '{name}' (conflicts with '{existing}')")]
    DuplicateName {
        /// Name of the rejected parameter.
        name: String,
        /// Name of the parameter already in the set.
        existing: String,
    },
}
