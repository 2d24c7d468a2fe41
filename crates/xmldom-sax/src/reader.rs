//! quick-xml driven event reader.
//!
//! [`XmlReader`] pulls events from a `quick_xml::Reader` and turns them into
//! handler calls, doing the work quick-xml leaves to its caller: namespace
//! resolution, entity expansion, DOCTYPE parsing, locator updates and
//! recovery from mismatched tags.

use quick_xml::Reader;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use std::borrow::Cow;
use tracing::{debug, trace};

use crate::attributes::{Attribute, Attributes};
use crate::doctype::{MarkupDecl, parse_doctype};
use crate::entities::{self, EntityIssue, EntityMap};
use crate::error::Result;
use crate::handler::{ErrorHandler, SaxHandler};
use crate::line_index::LineIndex;
use crate::locator::Locator;
use crate::namespace::{
    NamespaceMap, NamespaceScopes, XHTML_NAMESPACE, XMLNS_NAMESPACE, split_qname,
};

/// Drives a [`SaxHandler`] from XML or HTML-ish source text.
///
/// # Example
///
/// ```rust
/// use xmldom_sax::{
///     Attributes, ContentHandler, DeclHandler, Error, ErrorHandler, LexicalHandler,
///     NamespaceMap, Result, XmlReader, xml_entities,
/// };
///
/// #[derive(Default)]
/// struct Names(Vec<String>);
///
/// impl ContentHandler for Names {
///     fn start_element(
///         &mut self,
///         _ns: Option<&str>,
///         local_name: &str,
///         _q_name: &str,
///         _attributes: &Attributes,
///     ) -> Result<()> {
///         self.0.push(local_name.to_string());
///         Ok(())
///     }
/// }
/// impl LexicalHandler for Names {}
/// impl DeclHandler for Names {}
///
/// struct Quiet;
///
/// impl ErrorHandler for Quiet {
///     fn warning(&self, _message: &str) {}
///     fn error(&self, _message: &str) {}
///     fn fatal_error(&self, message: &str) -> Error {
///         Error::Fatal { message: message.to_string() }
///     }
/// }
///
/// let mut names = Names::default();
/// XmlReader::new(&mut names, &Quiet)
///     .parse("<a><b/></a>", &NamespaceMap::new(), &xml_entities())
///     .unwrap();
/// assert_eq!(names.0, ["a", "b"]);
/// ```
pub struct XmlReader<'a, H: ?Sized> {
    handler: &'a mut H,
    errors: &'a dyn ErrorHandler,
    locator: Option<Locator>,
}

impl<'a, H: SaxHandler + ?Sized> XmlReader<'a, H> {
    pub fn new(handler: &'a mut H, errors: &'a dyn ErrorHandler) -> Self {
        Self {
            handler,
            errors,
            locator: None,
        }
    }

    /// Keep `locator` pointed at the start of each event as it is emitted.
    pub fn with_locator(mut self, locator: Locator) -> Self {
        self.locator = Some(locator);
        self
    }

    /// Parse `source`, seeding namespaces from `namespaces` and resolving
    /// named references through `entities`.
    ///
    /// A default namespace bound to XHTML switches attribute parsing to the
    /// lenient HTML rules (unquoted and valueless attributes).
    ///
    /// # Errors
    ///
    /// Returns the error produced by the error handler's `fatal_error` when
    /// quick-xml reports a syntax error, and any error a handler returns.
    pub fn parse(
        &mut self,
        source: &str,
        namespaces: &NamespaceMap,
        entities: &EntityMap,
    ) -> Result<()> {
        let html = namespaces.get("").map(String::as_str) == Some(XHTML_NAMESPACE);
        debug!(bytes = source.len(), html, "Starting XML parse");

        let mut driver = Driver {
            handler: &mut *self.handler,
            errors: self.errors,
            locator: self.locator.clone(),
            index: LineIndex::new(source),
            scopes: NamespaceScopes::new(namespaces),
            entities: entities.clone(),
            open: Vec::new(),
            html,
        };
        driver.run(source)
    }
}

/// An element that has been started and not yet ended.
struct OpenElement {
    q_name: String,
    local_name: String,
    namespace_uri: Option<String>,
}

/// Per-parse state.
struct Driver<'h, 's, H: ?Sized> {
    handler: &'h mut H,
    errors: &'h dyn ErrorHandler,
    locator: Option<Locator>,
    index: LineIndex<'s>,
    scopes: NamespaceScopes,
    /// Working copy: internal-subset entity declarations are added here.
    entities: EntityMap,
    open: Vec<OpenElement>,
    html: bool,
}

impl<'s, H: SaxHandler + ?Sized> Driver<'_, 's, H> {
    fn run(&mut self, source: &'s str) -> Result<()> {
        let mut reader = Reader::from_str(source);
        let config = reader.config_mut();
        config.trim_text_start = false;
        config.trim_text_end = false;
        config.expand_empty_elements = true;
        config.check_end_names = false;
        config.allow_unmatched_ends = true;

        self.move_to(0);
        self.handler.start_document()?;

        loop {
            // Capture position before reading the event
            let event_start = reader.buffer_position() as usize;

            let event = match reader.read_event() {
                Ok(event) => event,
                Err(err) => {
                    self.move_to(reader.error_position() as usize);
                    return Err(self.errors.fatal_error(&err.to_string()));
                }
            };
            self.move_to(event_start);

            match event {
                Event::Start(e) => self.start_element(&e, event_start)?,
                Event::Empty(e) => {
                    self.start_element(&e, event_start)?;
                    self.close_innermost()?;
                }
                Event::End(e) => self.end_element(&e)?,
                Event::Text(e) => self.text(&e)?,
                Event::CData(e) => self.cdata(&e)?,
                Event::Comment(e) => self.comment(&e)?,
                Event::Decl(e) => self.declaration(&e)?,
                Event::PI(e) => self.processing_instruction(&e)?,
                Event::DocType(e) => self.doctype(&e)?,
                Event::Eof => break,
            }
        }

        self.move_to(source.len());
        while let Some(open) = self.open.last() {
            self.errors
                .error(&format!("unclosed xml tag: <{}>", open.q_name));
            self.close_innermost()?;
        }

        self.handler.end_document()
    }

    fn move_to(&self, offset: usize) {
        if let Some(locator) = &self.locator {
            let position = self.index.position(offset);
            locator.set_position(position.line, position.column);
        }
    }

    fn start_element(&mut self, e: &BytesStart<'_>, event_start: usize) -> Result<()> {
        let q_name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let raw_attributes = self.collect_attributes(e, event_start, &q_name);

        self.scopes.push_frame();
        for attr in &raw_attributes {
            if attr.q_name == "xmlns" {
                self.scopes.bind("", &attr.value);
                self.handler.start_prefix_mapping("", &attr.value)?;
            } else if let Some(prefix) = attr.q_name.strip_prefix("xmlns:") {
                self.scopes.bind(prefix, &attr.value);
                self.handler.start_prefix_mapping(prefix, &attr.value)?;
            }
        }

        let (prefix, local_name) = split_qname(&q_name);
        let namespace_uri = self.element_namespace(prefix);

        let mut attributes = Attributes::new();
        for attr in raw_attributes {
            let (attr_prefix, attr_local) = split_qname(&attr.q_name);
            let attr_namespace = if attr.q_name == "xmlns" || attr_prefix == Some("xmlns") {
                Some(XMLNS_NAMESPACE.to_string())
            } else {
                attr_prefix.and_then(|p| self.prefixed_namespace(p))
            };
            attributes.push(Attribute {
                namespace_uri: attr_namespace,
                local_name: attr_local.to_string(),
                value: attr.value,
                position: self.index.position(attr.offset),
                q_name: attr.q_name,
            });
        }

        trace!(name = %q_name, attributes = attributes.len(), "start element");
        self.handler
            .start_element(namespace_uri.as_deref(), local_name, &q_name, &attributes)?;

        self.open.push(OpenElement {
            local_name: local_name.to_string(),
            q_name,
            namespace_uri,
        });
        Ok(())
    }

    fn end_element(&mut self, e: &BytesEnd<'_>) -> Result<()> {
        let q_name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let html = self.html;
        let matched = self.open.iter().rposition(|open| {
            open.q_name == q_name || (html && open.q_name.eq_ignore_ascii_case(&q_name))
        });

        let Some(index) = matched else {
            self.errors
                .warning(&format!("unmatched end tag: </{q_name}>"));
            return Ok(());
        };

        if index + 1 != self.open.len() {
            if let Some(current) = self.open.last() {
                self.errors.error(&format!(
                    "end tag name: {q_name} does not match the current start tagName: {}",
                    current.q_name
                ));
            }
        }
        while self.open.len() > index {
            self.close_innermost()?;
        }
        Ok(())
    }

    fn close_innermost(&mut self) -> Result<()> {
        let Some(open) = self.open.pop() else {
            return Ok(());
        };
        self.handler.end_element(
            open.namespace_uri.as_deref(),
            &open.local_name,
            &open.q_name,
        )?;
        for prefix in self.scopes.pop_frame() {
            self.handler.end_prefix_mapping(&prefix)?;
        }
        Ok(())
    }

    fn text(&mut self, e: &BytesText<'_>) -> Result<()> {
        let raw = String::from_utf8_lossy(e);
        let text = self.expand(&raw)?;
        self.handler.characters(&text, 0, text.len())
    }

    fn cdata(&mut self, e: &BytesCData<'_>) -> Result<()> {
        let data = String::from_utf8_lossy(e);
        self.handler.start_cdata()?;
        self.handler.characters(&data, 0, data.len())?;
        self.handler.end_cdata()
    }

    fn comment(&mut self, e: &BytesText<'_>) -> Result<()> {
        let data = String::from_utf8_lossy(e);
        self.handler.comment(&data, 0, data.len())
    }

    /// The XML declaration is reported as a processing instruction.
    fn declaration(&mut self, e: &BytesDecl<'_>) -> Result<()> {
        let raw = String::from_utf8_lossy(e);
        let data = raw.strip_prefix("xml").unwrap_or(&raw).trim();
        self.handler.processing_instruction("xml", data)
    }

    fn processing_instruction(&mut self, e: &BytesPI<'_>) -> Result<()> {
        let raw = String::from_utf8_lossy(e);
        let (target, data) = match raw.find(char::is_whitespace) {
            Some(split) => (&raw[..split], raw[split..].trim_start()),
            None => (raw.as_ref(), ""),
        };
        if target.is_empty() {
            self.errors
                .error("processing instruction without a target");
            return Ok(());
        }
        self.handler.processing_instruction(target, data)
    }

    fn doctype(&mut self, e: &BytesText<'_>) -> Result<()> {
        let raw = String::from_utf8_lossy(e);
        let decl = match parse_doctype(&raw) {
            Ok(decl) => decl,
            Err(message) => {
                self.errors.error(&message);
                return Ok(());
            }
        };
        if let Some(open) = self.open.last() {
            self.errors.warning(&format!(
                "document type declaration inside <{}>",
                open.q_name
            ));
        }

        self.handler.start_dtd(
            &decl.name,
            decl.public_id.as_deref(),
            decl.system_id.as_deref(),
        )?;
        for declaration in decl.declarations {
            match declaration {
                MarkupDecl::Element { name, model } => {
                    self.handler.element_decl(&name, &model)?;
                }
                MarkupDecl::InternalEntity { name, value } => {
                    self.handler.internal_entity_decl(&name, &value)?;
                    // The first declaration of an entity is binding
                    self.entities.entry(name).or_insert(value);
                }
                MarkupDecl::ExternalEntity {
                    name,
                    public_id,
                    system_id,
                } => {
                    self.handler.external_entity_decl(
                        &name,
                        public_id.as_deref(),
                        system_id.as_deref(),
                    )?;
                }
            }
        }
        self.handler.end_dtd()
    }

    /// Expand references in character data, reporting what failed.
    fn expand<'t>(&mut self, raw: &'t str) -> Result<Cow<'t, str>> {
        let mut issues = Vec::new();
        let text = entities::decode(raw, &self.entities, &mut issues);
        for issue in issues {
            match issue {
                EntityIssue::Unknown(name) => {
                    self.errors.error(&format!("entity not found:&{name};"));
                    self.handler.skipped_entity(&name)?;
                }
                EntityIssue::InvalidCharRef(reference) => {
                    self.errors
                        .error(&format!("invalid character reference:&{reference};"));
                }
                EntityIssue::Unterminated => {
                    self.errors.warning("unescaped '&' in character data");
                }
            }
        }
        Ok(text)
    }

    /// Read the attributes of a start tag with their source offsets.
    ///
    /// A malformed attribute is reported and ends the list: the attributes
    /// after it are dropped.
    fn collect_attributes(
        &self,
        e: &BytesStart<'_>,
        event_start: usize,
        element: &str,
    ) -> Vec<RawAttribute> {
        let tag = String::from_utf8_lossy(e.as_ref());
        // The tag content starts after '<'
        let content_start = event_start + 1;
        let mut search_from = e.name().as_ref().len();

        let iter = if self.html {
            e.html_attributes()
        } else {
            e.attributes()
        };

        let mut attributes = Vec::new();
        for result in iter {
            let attr = match result {
                Ok(attr) => attr,
                Err(err) => {
                    self.errors
                        .error(&format!("invalid attribute in <{element}>: {err}"));
                    break;
                }
            };

            let q_name = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let raw_value = String::from_utf8_lossy(&attr.value).into_owned();

            let name_offset = match tag.get(search_from..).and_then(|area| area.find(&q_name)) {
                Some(rel) => {
                    let name_end = search_from + rel + q_name.len();
                    search_from = tag[name_end..]
                        .find(&raw_value)
                        .map_or(name_end, |value_rel| name_end + value_rel + raw_value.len());
                    content_start + name_end - q_name.len()
                }
                None => content_start,
            };

            if raw_value.contains('<') {
                self.errors.warning(&format!(
                    "unescaped '<' in value of attribute {q_name}"
                ));
            }

            let normalized = raw_value.replace(['\t', '\n', '\r'], " ");
            let mut issues = Vec::new();
            let value = entities::decode(&normalized, &self.entities, &mut issues).into_owned();
            for issue in issues {
                match issue {
                    EntityIssue::Unknown(name) => {
                        self.errors.error(&format!("entity not found:&{name};"));
                    }
                    EntityIssue::InvalidCharRef(reference) => {
                        self.errors
                            .error(&format!("invalid character reference:&{reference};"));
                    }
                    EntityIssue::Unterminated => {
                        self.errors
                            .warning(&format!("unescaped '&' in value of attribute {q_name}"));
                    }
                }
            }

            attributes.push(RawAttribute {
                q_name,
                value,
                offset: name_offset,
            });
        }
        attributes
    }

    /// Namespace of an element: unprefixed names take the default namespace.
    fn element_namespace(&self, prefix: Option<&str>) -> Option<String> {
        match prefix {
            Some(prefix) => self.prefixed_namespace(prefix),
            None => self.scopes.resolve("").map(str::to_string),
        }
    }

    fn prefixed_namespace(&self, prefix: &str) -> Option<String> {
        let uri = self.scopes.resolve(prefix).map(str::to_string);
        if uri.is_none() {
            self.errors
                .warning(&format!("unbound namespace prefix: {prefix}"));
        }
        uri
    }
}

/// An attribute before namespace resolution.
struct RawAttribute {
    q_name: String,
    value: String,
    /// Byte offset of the attribute name.
    offset: usize,
}
