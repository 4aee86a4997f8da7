#![forbid(unsafe_code)]

//! Errors surfaced by mounting and by model factories.

use kview_reactive::ObserveError;

/// Errors from defining, mounting, or booting views.
///
/// Only configuration errors abort a mount. Factory failures and lookup
/// misses are logged by the node that hit them and render nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    /// No element matched the mount selector, or no boot container is set.
    ContainerNotFound(String),
    /// No view is defined for the object's type.
    NoViewRegistered(String),
    /// A bound field could not be observed.
    Observe(ObserveError),
    /// A model factory reported a failure.
    Factory(String),
    /// A view was asked to mount an object of another type.
    ModelTypeMismatch { expected: &'static str },
}

impl ViewError {
    /// Convenience constructor for factory failures.
    pub fn factory(message: impl Into<String>) -> Self {
        Self::Factory(message.into())
    }
}

impl std::fmt::Display for ViewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ContainerNotFound(selector) => write!(f, "container not found: {selector}"),
            Self::NoViewRegistered(type_name) => write!(f, "no view registered for {type_name}"),
            Self::Observe(err) => write!(f, "binding failed: {err}"),
            Self::Factory(message) => write!(f, "factory failed: {message}"),
            Self::ModelTypeMismatch { expected } => {
                write!(f, "view expects a model of type {expected}")
            }
        }
    }
}

impl std::error::Error for ViewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Observe(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ObserveError> for ViewError {
    fn from(err: ObserveError) -> Self {
        Self::Observe(err)
    }
}
