use pretty_assertions::assert_eq;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use xmldom::{
    Attributes, CollectingDiagnostics, ContentHandler, DeclHandler, Document, DomBuilder,
    DomParser, Error, ErrorDescriptor, ErrorHandlers, LexicalHandler, Locator, ParserOptions, sax,
};

/// Records element names and builds `<outline>` holding them.
#[derive(Default)]
struct Outline {
    names: Rc<RefCell<Vec<String>>>,
    located: Rc<Cell<bool>>,
    descriptor: Option<ErrorDescriptor>,
    reject: Option<&'static str>,
}

impl ContentHandler for Outline {
    fn set_document_locator(&mut self, _locator: Locator) {
        self.located.set(true);
    }

    fn start_element(
        &mut self,
        _namespace_uri: Option<&str>,
        _local_name: &str,
        q_name: &str,
        _attributes: &Attributes,
    ) -> sax::Result<()> {
        if self.reject.is_some_and(|name| name == q_name) {
            return Err(sax::Error::protocol(format!("no <{q_name}> allowed")));
        }
        self.names.borrow_mut().push(q_name.to_string());
        Ok(())
    }
}

impl LexicalHandler for Outline {}

impl DeclHandler for Outline {}

impl DomBuilder for Outline {
    fn take_document(&mut self) -> Option<Document> {
        let mut doc = Document::new();
        let outline = doc.create_element("outline");
        doc.append_child(doc.root(), outline).ok()?;
        let text = doc.create_text_node(&self.names.take().join(" "));
        doc.append_child(outline, text).ok()?;
        Some(doc)
    }

    fn error_descriptor(&self) -> Option<ErrorDescriptor> {
        self.descriptor.clone()
    }
}

fn recorder() -> (Rc<RefCell<Vec<String>>>, ErrorDescriptor) {
    let messages = Rc::new(RefCell::new(Vec::new()));
    let sink = messages.clone();
    let descriptor = ErrorDescriptor::unary(move |message: &str| {
        sink.borrow_mut().push(message.to_string());
    });
    (messages, descriptor)
}

#[test]
fn custom_builder_produces_the_document() {
    let located = Rc::new(Cell::new(false));
    let builder = Outline {
        located: located.clone(),
        ..Outline::default()
    };
    let mut parser = DomParser::with_options(ParserOptions::new().with_dom_builder(builder));

    let doc = parser
        .parse_from_string("<a><b/></a>", "text/xml")
        .unwrap()
        .unwrap();
    let root = doc.document_element().unwrap();

    assert!(located.get());
    assert_eq!(doc.tag_name(root), Some("outline"));
    assert_eq!(doc.text_content(root).as_deref(), Some("a b"));
}

#[test]
fn builder_descriptor_receives_diagnostics() {
    let (messages, descriptor) = recorder();
    let builder = Outline {
        descriptor: Some(descriptor),
        ..Outline::default()
    };
    let mut parser = DomParser::with_options(ParserOptions::new().with_dom_builder(builder));

    parser.parse_from_string("<r>&foo;</r>", "text/xml").unwrap();

    let messages = messages.borrow();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("entity not found:&foo;\n@#[line:1,col:"));
}

#[test]
fn configured_handler_wins_over_builder_descriptor() {
    let (from_builder, builder_descriptor) = recorder();
    let (from_options, options_descriptor) = recorder();
    let builder = Outline {
        descriptor: Some(builder_descriptor),
        ..Outline::default()
    };
    let options = ParserOptions::new()
        .with_dom_builder(builder)
        .with_error_handler(options_descriptor);

    DomParser::with_options(options)
        .parse_from_string("<r>&foo;</r>", "text/xml")
        .unwrap();

    assert!(from_builder.borrow().is_empty());
    assert_eq!(from_options.borrow().len(), 1);
}

#[test]
fn builder_without_reporting_is_silent() {
    let sink = Rc::new(CollectingDiagnostics::new());
    let options = ParserOptions::new()
        .with_dom_builder(Outline::default())
        .with_diagnostics(sink.clone());

    let doc = DomParser::with_options(options)
        .parse_from_string("<r>&foo;</r>", "text/xml")
        .unwrap();

    assert!(doc.is_some());
    assert!(sink.diagnostics().is_empty());
}

#[test]
fn builder_error_is_reported_as_fatal() {
    let fatal = Rc::new(RefCell::new(Vec::new()));
    let seen = fatal.clone();
    let handlers = ErrorHandlers::new().fatal_error(move |message: &str| {
        seen.borrow_mut().push(message.to_string());
    });
    let builder = Outline {
        descriptor: Some(handlers.into()),
        reject: Some("b"),
        ..Outline::default()
    };
    let mut parser = DomParser::with_options(ParserOptions::new().with_dom_builder(builder));

    let err = parser
        .parse_from_string("<a><b/></a>", "text/xml")
        .unwrap_err();

    assert!(matches!(err, Error::Fatal { .. }));
    let fatal = fatal.borrow();
    assert_eq!(fatal.len(), 1);
    assert!(fatal[0].starts_with("Protocol error: no <b> allowed\n@#[line:1,col:"));
}
