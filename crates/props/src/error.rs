//! Error types for property access.

use thiserror::Error;

/// Errors raised by [`crate::PropertyModel`] reads and writes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PropertyError {
    /// The key was not declared when the model was built.
    #[error("unknown property key: {0}")]
    UnknownKey(&'static str),

    /// A key with this name was declared with a different value type.
    #[error("property key {key} holds {stored}, accessed as {requested}")]
    TypeMismatch {
        key: &'static str,
        stored: &'static str,
        requested: &'static str,
    },
}
