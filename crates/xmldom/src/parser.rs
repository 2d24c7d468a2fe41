//! Parse sessions.

use tracing::debug;
use xmldom_dom::Document;
use xmldom_sax::{ErrorHandler, XHTML_NAMESPACE, XmlReader, html_entities, xml_entities};

use crate::builder::{DomBuilder, DomHandler};
use crate::error::Result;
use crate::error_adapter::ErrorAdapter;
use crate::options::ParserOptions;

/// Parses source text into documents.
///
/// Each call to [`parse_from_string`](DomParser::parse_from_string) is an
/// independent session: it picks a builder, resolves error reporting,
/// chooses the entity table and namespace defaults for the content type,
/// and runs the reader.
#[derive(Debug, Default)]
pub struct DomParser {
    options: ParserOptions,
}

impl DomParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParserOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut ParserOptions {
        &mut self.options
    }

    /// Parse `source` as a document of `content_type`.
    ///
    /// HTML content types (a media type ending in `/html`, `/htm`, `/xhtml`
    /// or `/xhtm`) add the `nbsp` and `copy` entities and put unprefixed
    /// elements in the XHTML namespace.
    ///
    /// Returns `Ok(None)` after reporting `invalid document source` when
    /// `source` is empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Fatal`](crate::Error::Fatal) after a fatal error has
    /// been delivered to the error handler. An error raised by the builder
    /// is delivered as a fatal error first.
    pub fn parse_from_string(
        &mut self,
        source: &str,
        content_type: &str,
    ) -> Result<Option<Document>> {
        let mut default_builder;
        let builder: &mut dyn DomBuilder = match self.options.dom_builder.as_deref_mut() {
            Some(builder) => builder,
            None => {
                default_builder = DomHandler::with_diagnostics(self.options.diagnostics.clone());
                &mut default_builder
            }
        };

        let locator = self.options.locator.as_ref().map(|config| config.make_locator());
        if let Some(locator) = &locator {
            builder.set_document_locator(locator.clone());
        }
        let errors = ErrorAdapter::build(
            self.options.error_handler.as_ref(),
            &*builder,
            locator.as_ref(),
        );

        let html = is_html_content_type(content_type);
        let mut namespaces = self.options.xmlns.clone();
        let entities = if html {
            namespaces.insert(String::new(), XHTML_NAMESPACE.to_string());
            html_entities()
        } else {
            xml_entities()
        };

        if source.is_empty() {
            errors.error("invalid document source");
            return Ok(None);
        }

        debug!(content_type, html, "Parsing document");
        let mut reader = XmlReader::new(&mut *builder, &errors);
        if let Some(locator) = locator {
            reader = reader.with_locator(locator);
        }
        match reader.parse(source, &namespaces, &entities) {
            Ok(()) => Ok(builder.take_document()),
            Err(err @ xmldom_sax::Error::Fatal { .. }) => Err(err.into()),
            // A builder that cannot apply an event leaves the tree unusable
            Err(err) => Err(errors.fatal_error(&err.to_string()).into()),
        }
    }
}

/// Whether `content_type` names an HTML-family media type.
///
/// Parameters are ignored and the comparison is ASCII case-insensitive.
pub fn is_html_content_type(content_type: &str) -> bool {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let Some((_, subtype)) = media_type.rsplit_once('/') else {
        return false;
    };
    let subtype = subtype.strip_prefix('x').unwrap_or(subtype);
    matches!(subtype, "html" | "htm")
}
