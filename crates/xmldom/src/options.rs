//! Parser configuration.
//!
//! [`ParserOptions`] holds everything a [`DomParser`](crate::DomParser) can
//! be configured with, including values that only exist at runtime (a custom
//! builder, error callbacks, a diagnostics sink). [`ParserConfig`] is the
//! serializable subset, suitable for loading from a file.

use serde::Deserialize;
use std::fmt;
use std::rc::Rc;
use xmldom_sax::{Locator, NamespaceMap};

use crate::builder::DomBuilder;
use crate::diagnostics::{DiagnosticSink, TracingDiagnostics};
use crate::error_adapter::ErrorDescriptor;

/// Position tracking for a parse.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocatorConfig {
    /// Reported as the source identity in every position suffix and stored
    /// as the document URI.
    pub system_id: Option<String>,

    /// A caller-owned locator to advance instead of a fresh one.
    #[serde(skip)]
    pub tracker: Option<Locator>,
}

impl LocatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system_id(mut self, system_id: impl Into<String>) -> Self {
        self.system_id = Some(system_id.into());
        self
    }

    pub fn with_tracker(mut self, tracker: Locator) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// The locator a parse should advance.
    pub(crate) fn make_locator(&self) -> Locator {
        let locator = self.tracker.clone().unwrap_or_default();
        if self.system_id.is_some() {
            locator.set_system_id(self.system_id.clone());
        }
        locator
    }
}

/// The file-loadable part of [`ParserOptions`].
///
/// A missing `locator` key keeps position tracking on; `"locator": null`
/// turns it off.
///
/// ```rust
/// use xmldom::ParserConfig;
///
/// let config: ParserConfig = serde_json::from_str(
///     r#"{ "locator": { "systemId": "a.xml" }, "xmlns": { "x": "urn:x" } }"#,
/// ).unwrap();
/// assert_eq!(config.xmlns["x"], "urn:x");
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParserConfig {
    pub locator: Option<LocatorConfig>,
    pub xmlns: NamespaceMap,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            locator: Some(LocatorConfig::default()),
            xmlns: NamespaceMap::new(),
        }
    }
}

/// Options for a [`DomParser`](crate::DomParser).
///
/// The defaults track positions, use a fresh
/// [`DomHandler`](crate::DomHandler) for every parse, and report
/// diagnostics through tracing.
pub struct ParserOptions {
    /// Replaces the default builder; reused across parses.
    pub dom_builder: Option<Box<dyn DomBuilder>>,
    pub error_handler: Option<ErrorDescriptor>,
    pub locator: Option<LocatorConfig>,
    /// Namespace bindings in scope before the root element.
    pub xmlns: NamespaceMap,
    /// Where the default builder reports problems.
    pub diagnostics: Rc<dyn DiagnosticSink>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            dom_builder: None,
            error_handler: None,
            locator: Some(LocatorConfig::default()),
            xmlns: NamespaceMap::new(),
            diagnostics: Rc::new(TracingDiagnostics),
        }
    }
}

impl ParserOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: ParserConfig) -> Self {
        Self {
            locator: config.locator,
            xmlns: config.xmlns,
            ..Self::default()
        }
    }

    pub fn with_dom_builder(mut self, builder: impl DomBuilder + 'static) -> Self {
        self.dom_builder = Some(Box::new(builder));
        self
    }

    pub fn with_error_handler(mut self, descriptor: impl Into<ErrorDescriptor>) -> Self {
        self.error_handler = Some(descriptor.into());
        self
    }

    pub fn with_locator(mut self, locator: LocatorConfig) -> Self {
        self.locator = Some(locator);
        self
    }

    pub fn without_locator(mut self) -> Self {
        self.locator = None;
        self
    }

    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.xmlns.insert(prefix.into(), uri.into());
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Rc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }
}

impl fmt::Debug for ParserOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserOptions")
            .field("dom_builder", &self.dom_builder.is_some())
            .field("error_handler", &self.error_handler)
            .field("locator", &self.locator)
            .field("xmlns", &self.xmlns)
            .finish_non_exhaustive()
    }
}
