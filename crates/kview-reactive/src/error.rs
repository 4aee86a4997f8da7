#![forbid(unsafe_code)]

//! Errors from state and observer operations.

/// Errors from reading or reshaping a [`State`](crate::State).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The field is a non-writable data field or a getter-only accessor.
    ReadOnly { field: String },
    /// The field is non-configurable and cannot be redefined.
    NonConfigurable { field: String },
}

impl std::fmt::Display for StateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReadOnly { field } => write!(f, "field '{field}' is read-only"),
            Self::NonConfigurable { field } => {
                write!(f, "field '{field}' is non-configurable")
            }
        }
    }
}

impl std::error::Error for StateError {}

/// Errors from registering an observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObserveError {
    /// The existing field is non-configurable and cannot be instrumented.
    NonConfigurable { field: String },
    /// The observed state object no longer exists.
    Detached,
}

impl std::fmt::Display for ObserveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonConfigurable { field } => {
                write!(f, "field '{field}' is non-configurable and cannot be observed")
            }
            Self::Detached => f.write_str("state object has been dropped"),
        }
    }
}

impl std::error::Error for ObserveError {}
