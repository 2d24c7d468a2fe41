//! Event handler traits.
//!
//! The reader drives a single object implementing [`SaxHandler`] (the
//! combination of [`ContentHandler`], [`LexicalHandler`] and
//! [`DeclHandler`]) and reports problems to a separate [`ErrorHandler`].
//! Every event method has a no-op default, so handlers only implement the
//! events they care about.
//!
//! Character data is passed as `(chars, start, length)`: the handler reads
//! the byte range `chars[start..start + length]`.

use crate::attributes::Attributes;
use crate::error::{Error, Result};
use crate::locator::Locator;

/// Document structure and content events.
#[allow(unused_variables)]
pub trait ContentHandler {
    /// Receive the locator the reader will keep up to date.
    fn set_document_locator(&mut self, locator: Locator) {}

    fn start_document(&mut self) -> Result<()> {
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        Ok(())
    }

    /// A namespace prefix comes into scope (`""` is the default namespace).
    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> Result<()> {
        Ok(())
    }

    fn end_prefix_mapping(&mut self, prefix: &str) -> Result<()> {
        Ok(())
    }

    fn start_element(
        &mut self,
        namespace_uri: Option<&str>,
        local_name: &str,
        q_name: &str,
        attributes: &Attributes,
    ) -> Result<()> {
        Ok(())
    }

    fn end_element(
        &mut self,
        namespace_uri: Option<&str>,
        local_name: &str,
        q_name: &str,
    ) -> Result<()> {
        Ok(())
    }

    fn characters(&mut self, chars: &str, start: usize, length: usize) -> Result<()> {
        Ok(())
    }

    fn ignorable_whitespace(&mut self, chars: &str, start: usize, length: usize) -> Result<()> {
        Ok(())
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<()> {
        Ok(())
    }

    /// An entity reference the reader could not resolve.
    fn skipped_entity(&mut self, name: &str) -> Result<()> {
        Ok(())
    }
}

/// Comments, CDATA boundaries and the document type declaration.
#[allow(unused_variables)]
pub trait LexicalHandler {
    fn comment(&mut self, chars: &str, start: usize, length: usize) -> Result<()> {
        Ok(())
    }

    fn start_cdata(&mut self) -> Result<()> {
        Ok(())
    }

    fn end_cdata(&mut self) -> Result<()> {
        Ok(())
    }

    fn start_dtd(
        &mut self,
        name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
    ) -> Result<()> {
        Ok(())
    }

    fn end_dtd(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Declarations found in the internal subset of a document type declaration.
#[allow(unused_variables)]
pub trait DeclHandler {
    fn element_decl(&mut self, name: &str, model: &str) -> Result<()> {
        Ok(())
    }

    fn internal_entity_decl(&mut self, name: &str, value: &str) -> Result<()> {
        Ok(())
    }

    fn external_entity_decl(
        &mut self,
        name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
    ) -> Result<()> {
        Ok(())
    }
}

/// Receiver for parse problems, by severity.
///
/// Warnings and errors are recoverable: the reader keeps going after
/// reporting them. A fatal error ends the parse; the returned [`Error`] is
/// what the reader propagates to its caller.
pub trait ErrorHandler {
    fn warning(&self, message: &str);

    fn error(&self, message: &str);

    fn fatal_error(&self, message: &str) -> Error;
}

/// Everything the reader drives.
pub trait SaxHandler: ContentHandler + LexicalHandler + DeclHandler {}

impl<T: ContentHandler + LexicalHandler + DeclHandler + ?Sized> SaxHandler for T {}
