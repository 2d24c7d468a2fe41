//! Document implementation capabilities.

use crate::Document;

/// Optional node kinds a [`DomImplementation`] may or may not support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    /// `<!DOCTYPE ...>` nodes.
    DocumentType,
}

/// Factory for documents, carrying the capabilities those documents have.
///
/// Builders query the capabilities once, up front, instead of probing for
/// each event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomImplementation {
    document_type: bool,
}

impl Default for DomImplementation {
    fn default() -> Self {
        Self::new()
    }
}

impl DomImplementation {
    /// An implementation supporting every feature.
    pub fn new() -> Self {
        Self {
            document_type: true,
        }
    }

    /// An implementation that cannot create document type nodes.
    pub fn without_document_type() -> Self {
        Self {
            document_type: false,
        }
    }

    pub fn has_feature(&self, feature: Feature) -> bool {
        match feature {
            Feature::DocumentType => self.document_type,
        }
    }

    /// Create an empty document bound to this implementation.
    pub fn create_document(&self) -> Document {
        Document::with_implementation(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_supports_doctype() {
        let implementation = DomImplementation::default();
        assert!(implementation.has_feature(Feature::DocumentType));
    }

    #[test]
    fn test_created_document_keeps_capabilities() {
        let implementation = DomImplementation::without_document_type();
        let doc = implementation.create_document();
        assert!(!doc.implementation().has_feature(Feature::DocumentType));
    }
}
