//! Error types for tree mutation.

use thiserror::Error;

/// Result type alias for xmldom-dom operations.
pub type Result<T> = std::result::Result<T, DomError>;

/// Errors raised by document mutation primitives.
///
/// Names follow the DOM exception names so callers that know the DOM can
/// map them directly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// The node cannot be inserted at the requested place in the tree.
    #[error("Hierarchy request error: {message}")]
    HierarchyRequest { message: String },

    /// The reference node is not a child of the given parent.
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// The document implementation does not support the requested node kind.
    #[error("Not supported: {feature}")]
    NotSupported { feature: String },

    /// The attribute is already installed on another element.
    #[error("Attribute '{name}' is in use by another element")]
    InUseAttribute { name: String },
}

impl DomError {
    pub(crate) fn hierarchy(message: impl Into<String>) -> Self {
        DomError::HierarchyRequest {
            message: message.into(),
        }
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        DomError::NotFound {
            message: message.into(),
        }
    }
}
