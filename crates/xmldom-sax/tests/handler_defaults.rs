//! Handlers that only implement part of the protocol still see a full parse.

use std::cell::Cell;
use xmldom_sax::{
    ContentHandler, DeclHandler, Error, ErrorHandler, LexicalHandler, NamespaceMap, XmlReader,
    xml_entities,
};

#[derive(Default)]
struct TextOnly(String);

impl ContentHandler for TextOnly {
    fn characters(&mut self, chars: &str, start: usize, length: usize) -> xmldom_sax::Result<()> {
        self.0.push_str(&chars[start..start + length]);
        Ok(())
    }
}

impl LexicalHandler for TextOnly {}
impl DeclHandler for TextOnly {}

#[derive(Default)]
struct Counting {
    warnings: Cell<usize>,
    errors: Cell<usize>,
}

impl ErrorHandler for Counting {
    fn warning(&self, _message: &str) {
        self.warnings.set(self.warnings.get() + 1);
    }

    fn error(&self, _message: &str) {
        self.errors.set(self.errors.get() + 1);
    }

    fn fatal_error(&self, message: &str) -> Error {
        Error::Fatal {
            message: message.to_string(),
        }
    }
}

#[test]
fn collects_text_across_elements() {
    let mut handler = TextOnly::default();
    let errors = Counting::default();

    XmlReader::new(&mut handler, &errors)
        .parse(
            "<doc>one <em>two</em> <![CDATA[three]]><!-- skipped --></doc>",
            &NamespaceMap::new(),
            &xml_entities(),
        )
        .unwrap();

    assert_eq!(handler.0, "one two three");
    assert_eq!(errors.warnings.get(), 0);
    assert_eq!(errors.errors.get(), 0);
}

#[test]
fn attribute_problems_are_recoverable() {
    let mut handler = TextOnly::default();
    let errors = Counting::default();

    XmlReader::new(&mut handler, &errors)
        .parse(
            "<doc a=\"1\" a=\"2\" title=\"x &bogus; y\">body</doc>",
            &NamespaceMap::new(),
            &xml_entities(),
        )
        .unwrap();

    assert_eq!(handler.0, "body");
    // the duplicate ends the attribute list, so `title` is never decoded
    assert_eq!(errors.errors.get(), 1);
}

#[test]
fn fatal_error_propagates() {
    let mut handler = TextOnly::default();
    let errors = Counting::default();

    let result = XmlReader::new(&mut handler, &errors).parse(
        "<doc><!-- open",
        &NamespaceMap::new(),
        &xml_entities(),
    );

    assert!(matches!(result, Err(Error::Fatal { .. })));
}
