//! Build document trees from XML and HTML source text.
//!
//! [`DomParser`] runs the event reader from `xmldom-sax` and feeds its
//! events to a [`DomBuilder`] (by default a [`DomHandler`]) that assembles
//! an `xmldom-dom` [`Document`]. Problems found along the way are reported
//! through an [`ErrorAdapter`], resolved from whatever error callbacks the
//! caller configured.
//!
//! ```rust
//! use xmldom::{DomParser, XmlSerializer};
//!
//! let mut parser = DomParser::new();
//! let doc = parser
//!     .parse_from_string("<greeting lang=\"en\">hello</greeting>", "text/xml")
//!     .unwrap()
//!     .unwrap();
//!
//! let root = doc.document_element().unwrap();
//! assert_eq!(doc.get_attribute(root, "lang"), Some("en"));
//! assert_eq!(
//!     XmlSerializer::new().serialize_to_string(&doc, doc.root()),
//!     "<greeting lang=\"en\">hello</greeting>"
//! );
//! ```

pub mod builder;
pub mod diagnostics;
pub mod error;
pub mod error_adapter;
pub mod options;
pub mod parser;

pub use builder::{DomBuilder, DomHandler};
pub use diagnostics::{
    CollectingDiagnostics, Diagnostic, DiagnosticSink, Severity, TracingDiagnostics,
};
pub use error::{Error, Result};
pub use error_adapter::{ErrorAdapter, ErrorDescriptor, ErrorHandlers, MessageFn, SeverityFn};
pub use options::{LocatorConfig, ParserConfig, ParserOptions};
pub use parser::{DomParser, is_html_content_type};

pub use xmldom_dom::{
    Document, DomError, DomImplementation, Feature, NodeId, NodeType, Position, XmlSerializer,
};
pub use xmldom_sax as sax;
pub use xmldom_sax::{
    Attributes, ContentHandler, DeclHandler, ErrorHandler, LexicalHandler, Locator, NamespaceMap,
    XHTML_NAMESPACE,
};
