//! Event-driven XML/HTML reader for xmldom.
//!
//! [`XmlReader`] reads source text with quick-xml and reports what it finds
//! to a [`SaxHandler`]: elements with namespace-resolved [`Attributes`],
//! character data with references expanded, CDATA boundaries, comments,
//! processing instructions and the document type declaration. Problems go
//! to an [`ErrorHandler`] by severity; only syntax errors stop the parse.
//!
//! A shared [`Locator`] can be attached so that handlers see the line and
//! column of every event as it is delivered.

pub mod attributes;
pub mod doctype;
pub mod entities;
pub mod error;
pub mod handler;
pub mod line_index;
pub mod locator;
pub mod namespace;
pub mod reader;

pub use attributes::{Attribute, Attributes};
pub use entities::{EntityMap, html_entities, xml_entities};
pub use error::{Error, Result};
pub use handler::{ContentHandler, DeclHandler, ErrorHandler, LexicalHandler, SaxHandler};
pub use line_index::LineIndex;
pub use locator::Locator;
pub use namespace::{NamespaceMap, XHTML_NAMESPACE, XML_NAMESPACE, XMLNS_NAMESPACE};
pub use reader::XmlReader;
