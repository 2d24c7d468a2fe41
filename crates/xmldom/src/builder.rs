//! Tree construction from reader events.

use std::fmt;
use std::rc::Rc;
use xmldom_dom::{Document, DomImplementation, Feature, NodeId, Position};
use xmldom_sax::{
    Attributes, ContentHandler, DeclHandler, Error, ErrorHandler, LexicalHandler, Locator, Result,
};

use crate::diagnostics::{DiagnosticSink, TracingDiagnostics};
use crate::error_adapter::{ErrorAdapter, ErrorDescriptor};

/// A handler that turns reader events into a [`Document`].
///
/// Besides the event callbacks, a builder can take part in error reporting:
/// when no error descriptor is configured for a parse, the builder's own
/// [`error_adapter`](DomBuilder::error_adapter) is used, and failing that its
/// [`error_descriptor`](DomBuilder::error_descriptor).
pub trait DomBuilder: ContentHandler + LexicalHandler + DeclHandler {
    /// Hand over the finished document, leaving the builder empty.
    fn take_document(&mut self) -> Option<Document>;

    fn error_adapter(&self) -> Option<ErrorAdapter> {
        None
    }

    fn error_descriptor(&self) -> Option<ErrorDescriptor> {
        None
    }
}

/// The default [`DomBuilder`].
///
/// Keeps a stack of open elements as the insertion point and a flag for
/// whether character data currently belongs to a CDATA section. Every node
/// it creates is stamped with the locator position of the event that
/// created it.
pub struct DomHandler {
    implementation: DomImplementation,
    doctype_supported: bool,
    document: Option<Document>,
    open: Vec<NodeId>,
    cdata: bool,
    locator: Option<Locator>,
    diagnostics: Rc<dyn DiagnosticSink>,
}

impl Default for DomHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl DomHandler {
    /// A builder reporting its own diagnostics through tracing.
    pub fn new() -> Self {
        Self::with_diagnostics(Rc::new(TracingDiagnostics))
    }

    pub fn with_diagnostics(diagnostics: Rc<dyn DiagnosticSink>) -> Self {
        let implementation = DomImplementation::new();
        Self {
            doctype_supported: implementation.has_feature(Feature::DocumentType),
            implementation,
            document: None,
            open: Vec::new(),
            cdata: false,
            locator: None,
            diagnostics,
        }
    }

    /// Build documents through `implementation`.
    pub fn with_implementation(mut self, implementation: DomImplementation) -> Self {
        self.doctype_supported = implementation.has_feature(Feature::DocumentType);
        self.implementation = implementation;
        self
    }

    /// The document under construction.
    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn locator(&self) -> Option<&Locator> {
        self.locator.as_ref()
    }

    fn adapter(&self) -> ErrorAdapter {
        ErrorAdapter::from_sink(self.diagnostics.clone(), self.locator.as_ref())
    }

    fn current_position(&self) -> Option<Position> {
        self.locator
            .as_ref()
            .map(|locator| Position::new(locator.line_number(), locator.column_number()))
    }

    /// Create a node and append it at the insertion point.
    fn append(
        &mut self,
        create: impl FnOnce(&mut Document) -> Result<NodeId>,
    ) -> Result<NodeId> {
        let parent = self.open.last().copied();
        self.append_to(parent, create)
    }

    /// Create a node and append it to `parent`, or to the document itself.
    fn append_to(
        &mut self,
        parent: Option<NodeId>,
        create: impl FnOnce(&mut Document) -> Result<NodeId>,
    ) -> Result<NodeId> {
        let position = self.current_position();
        let Some(doc) = self.document.as_mut() else {
            return Err(Error::protocol("node event before the start of the document"));
        };

        let node = create(doc)?;
        let parent = parent.unwrap_or_else(|| doc.root());
        doc.append_child(parent, node)?;
        if let Some(position) = position {
            doc.set_position(node, position);
        }
        Ok(node)
    }
}

fn slice(chars: &str, start: usize, length: usize) -> Result<&str> {
    start
        .checked_add(length)
        .and_then(|end| chars.get(start..end))
        .ok_or_else(|| {
            Error::protocol(format!(
                "character range {start}+{length} outside a buffer of {} bytes",
                chars.len()
            ))
        })
}

impl ContentHandler for DomHandler {
    fn set_document_locator(&mut self, locator: Locator) {
        locator.set_line_number(0);
        self.locator = Some(locator);
    }

    fn start_document(&mut self) -> Result<()> {
        let mut doc = self.implementation.create_document();
        if let Some(locator) = &self.locator {
            doc.document_uri = locator.system_id();
        }
        self.document = Some(doc);
        self.open.clear();
        self.cdata = false;
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        if let Some(doc) = self.document.as_mut() {
            let root = doc.root();
            doc.normalize(root);
        }
        Ok(())
    }

    fn start_element(
        &mut self,
        namespace_uri: Option<&str>,
        local_name: &str,
        q_name: &str,
        attributes: &Attributes,
    ) -> Result<()> {
        let name = if q_name.is_empty() { local_name } else { q_name };
        let element = self.append(|doc| {
            let element = doc.create_element_ns(namespace_uri, name);
            for attribute in attributes {
                let attr = doc.create_attribute_ns(
                    attribute.namespace_uri.as_deref(),
                    &attribute.q_name,
                );
                doc.set_node_value(attr, &attribute.value);
                doc.set_position(attr, attribute.position);
                doc.set_attribute_node(element, attr)?;
            }
            Ok(element)
        })?;
        self.open.push(element);
        Ok(())
    }

    fn end_element(
        &mut self,
        _namespace_uri: Option<&str>,
        _local_name: &str,
        q_name: &str,
    ) -> Result<()> {
        match self.open.pop() {
            Some(_) => Ok(()),
            None => Err(Error::protocol(format!(
                "end of element </{q_name}> without a matching start"
            ))),
        }
    }

    fn characters(&mut self, chars: &str, start: usize, length: usize) -> Result<()> {
        let text = slice(chars, start, length)?;
        if self.open.is_empty() || text.is_empty() {
            return Ok(());
        }

        let cdata = self.cdata;
        self.append(|doc| {
            Ok(if cdata {
                doc.create_cdata_section(text)
            } else {
                doc.create_text_node(text)
            })
        })?;
        Ok(())
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<()> {
        self.append(|doc| Ok(doc.create_processing_instruction(target, data)))?;
        Ok(())
    }
}

impl LexicalHandler for DomHandler {
    fn comment(&mut self, chars: &str, start: usize, length: usize) -> Result<()> {
        let text = slice(chars, start, length)?;
        self.append(|doc| Ok(doc.create_comment(text)))?;
        Ok(())
    }

    fn start_cdata(&mut self) -> Result<()> {
        self.cdata = true;
        Ok(())
    }

    fn end_cdata(&mut self) -> Result<()> {
        self.cdata = false;
        Ok(())
    }

    fn start_dtd(
        &mut self,
        name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
    ) -> Result<()> {
        if !self.doctype_supported {
            return Ok(());
        }
        // Only a document can hold a document type, wherever it was declared
        self.append_to(None, |doc| {
            Ok(doc.create_document_type(
                name,
                public_id.unwrap_or_default(),
                system_id.unwrap_or_default(),
            )?)
        })?;
        Ok(())
    }
}

impl DeclHandler for DomHandler {}

impl DomBuilder for DomHandler {
    fn take_document(&mut self) -> Option<Document> {
        self.open.clear();
        self.document.take()
    }

    fn error_adapter(&self) -> Option<ErrorAdapter> {
        Some(self.adapter())
    }
}

impl ErrorHandler for DomHandler {
    fn warning(&self, message: &str) {
        self.adapter().warning(message);
    }

    fn error(&self, message: &str) {
        self.adapter().error(message);
    }

    fn fatal_error(&self, message: &str) -> Error {
        self.adapter().fatal_error(message)
    }
}

impl fmt::Debug for DomHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomHandler")
            .field("implementation", &self.implementation)
            .field("document", &self.document.is_some())
            .field("open", &self.open)
            .field("cdata", &self.cdata)
            .field("locator", &self.locator)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{CollectingDiagnostics, Severity};
    use pretty_assertions::assert_eq;
    use xmldom_dom::{NodeType, XmlSerializer};
    use xmldom_sax::Attribute;

    fn started() -> DomHandler {
        let mut handler = DomHandler::new();
        handler.start_document().unwrap();
        handler
    }

    fn attribute(q_name: &str, value: &str) -> Attribute {
        Attribute {
            namespace_uri: None,
            local_name: q_name.to_string(),
            q_name: q_name.to_string(),
            value: value.to_string(),
            position: Position::new(1, 4),
        }
    }

    fn serialize(handler: &DomHandler) -> String {
        let doc = handler.document().unwrap();
        XmlSerializer::new().serialize_to_string(doc, doc.root())
    }

    #[test]
    fn test_elements_nest_at_insertion_point() {
        let mut handler = started();
        let mut attrs = Attributes::new();
        attrs.push(attribute("a", "1"));
        handler.start_element(None, "root", "root", &attrs).unwrap();
        handler.start_element(None, "child", "", &Attributes::new()).unwrap();
        handler.end_element(None, "child", "").unwrap();
        handler.end_element(None, "root", "root").unwrap();
        handler.end_document().unwrap();

        assert_eq!(serialize(&handler), r#"<root a="1"><child/></root>"#);
    }

    #[test]
    fn test_text_outside_elements_is_dropped() {
        let mut handler = started();
        handler.characters("  ", 0, 2).unwrap();
        handler.start_element(None, "r", "r", &Attributes::new()).unwrap();
        handler.characters("xabcx", 1, 3).unwrap();
        handler.characters("", 0, 0).unwrap();
        handler.end_element(None, "r", "r").unwrap();

        let doc = handler.document().unwrap();
        let root = doc.document_element().unwrap();
        assert_eq!(doc.child_nodes(doc.root()).count(), 1);
        assert_eq!(doc.child_nodes(root).count(), 1);
        assert_eq!(doc.text_content(root).as_deref(), Some("abc"));
    }

    #[test]
    fn test_cdata_flag_switches_node_kind() {
        let mut handler = started();
        handler.start_element(None, "r", "r", &Attributes::new()).unwrap();
        handler.start_cdata().unwrap();
        handler.characters("<raw>", 0, 5).unwrap();
        handler.end_cdata().unwrap();
        handler.characters("cooked", 0, 6).unwrap();

        let doc = handler.document().unwrap();
        let root = doc.document_element().unwrap();
        let kinds: Vec<NodeType> = doc.child_nodes(root).map(|n| doc.node_type(n)).collect();
        assert_eq!(kinds, vec![NodeType::CDataSection, NodeType::Text]);
    }

    #[test]
    fn test_comments_and_instructions_at_document_level() {
        let mut handler = started();
        handler.processing_instruction("xml", "version=\"1.0\"").unwrap();
        handler.comment(" top ", 0, 5).unwrap();
        handler.start_element(None, "r", "r", &Attributes::new()).unwrap();
        handler.end_element(None, "r", "r").unwrap();

        assert_eq!(serialize(&handler), "<?xml version=\"1.0\"?><!-- top --><r/>");
    }

    #[test]
    fn test_out_of_range_characters_are_rejected() {
        let mut handler = started();
        handler.start_element(None, "r", "r", &Attributes::new()).unwrap();
        let err = handler.characters("abc", 2, usize::MAX).unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
    }

    #[test]
    fn test_unbalanced_end_is_a_protocol_error() {
        let mut handler = started();
        let err = handler.end_element(None, "r", "r").unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
    }

    #[test]
    fn test_doctype_skipped_without_capability() {
        let mut handler =
            DomHandler::new().with_implementation(DomImplementation::without_document_type());
        handler.start_document().unwrap();
        handler.start_dtd("html", None, None).unwrap();
        handler.end_dtd().unwrap();

        let doc = handler.document().unwrap();
        assert!(doc.doctype().is_none());
        assert!(!doc.has_child_nodes(doc.root()));
    }

    #[test]
    fn test_nested_doctype_attaches_to_document() {
        let mut handler = started();
        handler.start_element(None, "r", "r", &Attributes::new()).unwrap();
        handler.start_dtd("x", None, Some("x.dtd")).unwrap();
        handler.end_dtd().unwrap();
        handler.end_element(None, "r", "r").unwrap();

        let doc = handler.document().unwrap();
        let root = doc.document_element().unwrap();
        assert!(!doc.has_child_nodes(root));
        assert_eq!(doc.doctype().and_then(|dt| doc.parent_node(dt)), Some(doc.root()));
    }

    #[test]
    fn test_positions_follow_locator() {
        let locator = Locator::with_system_id("mem.xml");
        let mut handler = DomHandler::new();
        handler.set_document_locator(locator.clone());
        assert_eq!(locator.line_number(), 0);

        locator.set_position(1, 1);
        handler.start_document().unwrap();
        handler.start_element(None, "r", "r", &Attributes::new()).unwrap();
        locator.set_position(2, 5);
        handler.characters("hi", 0, 2).unwrap();

        let doc = handler.document().unwrap();
        let root = doc.document_element().unwrap();
        let text = doc.first_child(root).unwrap();
        assert_eq!(doc.document_uri.as_deref(), Some("mem.xml"));
        assert_eq!(doc.position(root), Some(Position::new(1, 1)));
        assert_eq!(doc.position(text), Some(Position::new(2, 5)));
    }

    #[test]
    fn test_end_document_normalizes() {
        let mut handler = started();
        handler.start_element(None, "r", "r", &Attributes::new()).unwrap();
        handler.characters("a", 0, 1).unwrap();
        handler.characters("b", 0, 1).unwrap();
        handler.end_element(None, "r", "r").unwrap();
        handler.end_document().unwrap();

        let doc = handler.take_document().unwrap();
        let root = doc.document_element().unwrap();
        assert_eq!(doc.child_nodes(root).count(), 1);
        assert!(handler.document().is_none());
    }

    #[test]
    fn test_own_errors_go_to_sink() {
        let sink = Rc::new(CollectingDiagnostics::new());
        let mut handler = DomHandler::with_diagnostics(sink.clone());
        let locator = Locator::new();
        handler.set_document_locator(locator.clone());
        locator.set_position(3, 7);

        handler.warning("odd");
        let err = handler.fatal_error("dead");

        assert!(matches!(err, Error::Fatal { .. }));
        let diagnostics = sink.diagnostics();
        assert_eq!(diagnostics[0].severity, Severity::Warning);
        assert_eq!(diagnostics[0].message, "odd\n@#[line:3,col:7]");
        assert_eq!(diagnostics[1].severity, Severity::FatalError);
    }
}
