//! Document tree for xmldom.
//!
//! This crate provides the tree half of the parser: an arena-backed
//! [`Document`] that owns every node, the construction and mutation
//! primitives the DOM builder drives, and an [`XmlSerializer`] for the
//! reverse direction.
//!
//! # Overview
//!
//! - [`Document`]: owns the node arena; all navigation and mutation goes
//!   through it using [`NodeId`] handles
//! - [`NodeKind`]: the node variants (element, text, CDATA, comment, ...)
//! - [`DomImplementation`]: capability flags for optional node kinds
//! - [`XmlSerializer`]: turns a document (or subtree) back into markup
//!
//! # Example
//!
//! ```rust
//! use xmldom_dom::{Document, XmlSerializer};
//!
//! let mut doc = Document::new();
//! let root = doc.create_element("root");
//! let text = doc.create_text_node("hello");
//! doc.append_child(doc.root(), root).unwrap();
//! doc.append_child(root, text).unwrap();
//!
//! assert_eq!(doc.document_element(), Some(root));
//! assert_eq!(
//!     XmlSerializer::new().serialize_to_string(&doc, doc.root()),
//!     "<root>hello</root>"
//! );
//! ```

pub mod document;
pub mod error;
pub mod implementation;
pub mod node;
pub mod serializer;

pub use document::{Children, Descendants, Document};
pub use error::{DomError, Result};
pub use implementation::{DomImplementation, Feature};
pub use node::{NodeData, NodeId, NodeKind, NodeType, Position, QualifiedName};
pub use serializer::XmlSerializer;
