//! Normalizes error-reporting callbacks into one severity interface.
//!
//! Callers describe how they want to hear about problems with an
//! [`ErrorDescriptor`]: a set of named handlers, a single one-argument
//! callback, or a single callback that also receives the severity. The
//! descriptor is resolved once per parse into an [`ErrorAdapter`] that
//! always offers `warning`, `error` and `fatal_error`.
//!
//! Named handlers are resolved per severity by the first handler present
//! in its fallback chain:
//!
//! | Severity | Chain |
//! |---|---|
//! | warning | `warning`, `warn` |
//! | error | `error`, `warn`, `warning` |
//! | fatal error | `fatal_error`, `warn`, `warning`, `error` |
//!
//! A severity with nothing in its chain is dropped silently.

use std::fmt;
use std::rc::Rc;
use xmldom_sax::{ErrorHandler, Locator};

use crate::builder::DomBuilder;
use crate::diagnostics::{DiagnosticSink, Severity};

/// A callback receiving a position-annotated message.
pub type MessageFn = Rc<dyn Fn(&str)>;

/// A callback receiving the severity and a position-annotated message.
pub type SeverityFn = Rc<dyn Fn(Severity, &str)>;

/// Named handlers, any of which may be absent.
#[derive(Clone, Default)]
pub struct ErrorHandlers {
    pub warning: Option<MessageFn>,
    pub warn: Option<MessageFn>,
    pub error: Option<MessageFn>,
    pub fatal_error: Option<MessageFn>,
}

impl ErrorHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warning(mut self, handler: impl Fn(&str) + 'static) -> Self {
        self.warning = Some(Rc::new(handler));
        self
    }

    pub fn warn(mut self, handler: impl Fn(&str) + 'static) -> Self {
        self.warn = Some(Rc::new(handler));
        self
    }

    pub fn error(mut self, handler: impl Fn(&str) + 'static) -> Self {
        self.error = Some(Rc::new(handler));
        self
    }

    pub fn fatal_error(mut self, handler: impl Fn(&str) + 'static) -> Self {
        self.fatal_error = Some(Rc::new(handler));
        self
    }
}

impl fmt::Debug for ErrorHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorHandlers")
            .field("warning", &self.warning.is_some())
            .field("warn", &self.warn.is_some())
            .field("error", &self.error.is_some())
            .field("fatal_error", &self.fatal_error.is_some())
            .finish()
    }
}

/// How a caller wants problems reported.
#[derive(Clone)]
pub enum ErrorDescriptor {
    /// Handlers looked up by name, with fallbacks.
    Handlers(ErrorHandlers),
    /// One callback for every severity.
    Unary(MessageFn),
    /// One callback for every severity, told which severity it is.
    Binary(SeverityFn),
}

impl ErrorDescriptor {
    pub fn unary(handler: impl Fn(&str) + 'static) -> Self {
        ErrorDescriptor::Unary(Rc::new(handler))
    }

    pub fn binary(handler: impl Fn(Severity, &str) + 'static) -> Self {
        ErrorDescriptor::Binary(Rc::new(handler))
    }
}

impl From<ErrorHandlers> for ErrorDescriptor {
    fn from(handlers: ErrorHandlers) -> Self {
        ErrorDescriptor::Handlers(handlers)
    }
}

impl fmt::Debug for ErrorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorDescriptor::Handlers(handlers) => {
                f.debug_tuple("Handlers").field(handlers).finish()
            }
            ErrorDescriptor::Unary(_) => f.write_str("Unary(..)"),
            ErrorDescriptor::Binary(_) => f.write_str("Binary(..)"),
        }
    }
}

/// The resolved three-severity interface.
///
/// Every message is suffixed with `"\n@<systemId>#[line:<L>,col:<C>]"` read
/// from the locator at the time of the call, when there is a locator.
#[derive(Clone)]
pub struct ErrorAdapter {
    warning: Option<MessageFn>,
    error: Option<MessageFn>,
    fatal_error: Option<MessageFn>,
    locator: Option<Locator>,
}

impl ErrorAdapter {
    /// Build the adapter for a parse.
    ///
    /// With no descriptor, the builder's own adapter is reused when it has
    /// one; otherwise the builder's descriptor is resolved, and failing that
    /// every severity is dropped.
    pub fn build(
        descriptor: Option<&ErrorDescriptor>,
        builder: &dyn DomBuilder,
        locator: Option<&Locator>,
    ) -> Self {
        if let Some(descriptor) = descriptor {
            return Self::resolve(descriptor, locator);
        }
        if let Some(adapter) = builder.error_adapter() {
            return adapter;
        }
        match builder.error_descriptor() {
            Some(descriptor) => Self::resolve(&descriptor, locator),
            None => Self::silent(locator),
        }
    }

    /// Resolve `descriptor` into one handler per severity.
    pub fn resolve(descriptor: &ErrorDescriptor, locator: Option<&Locator>) -> Self {
        let (warning, error, fatal_error) = match descriptor {
            ErrorDescriptor::Unary(handler) => (
                Some(handler.clone()),
                Some(handler.clone()),
                Some(handler.clone()),
            ),
            ErrorDescriptor::Binary(handler) => (
                Some(with_severity(handler, Severity::Warning)),
                Some(with_severity(handler, Severity::Error)),
                Some(with_severity(handler, Severity::FatalError)),
            ),
            ErrorDescriptor::Handlers(handlers) => (
                first_of(&[&handlers.warning, &handlers.warn]),
                first_of(&[&handlers.error, &handlers.warn, &handlers.warning]),
                first_of(&[
                    &handlers.fatal_error,
                    &handlers.warn,
                    &handlers.warning,
                    &handlers.error,
                ]),
            ),
        };

        Self {
            warning,
            error,
            fatal_error,
            locator: locator.cloned(),
        }
    }

    /// An adapter reporting every severity to `sink`.
    pub fn from_sink(sink: Rc<dyn DiagnosticSink>, locator: Option<&Locator>) -> Self {
        let report: SeverityFn =
            Rc::new(move |severity: Severity, message: &str| sink.report(severity, message));
        Self::resolve(&ErrorDescriptor::Binary(report), locator)
    }

    /// An adapter that drops everything.
    pub fn silent(locator: Option<&Locator>) -> Self {
        Self {
            warning: None,
            error: None,
            fatal_error: None,
            locator: locator.cloned(),
        }
    }

    pub fn locator(&self) -> Option<&Locator> {
        self.locator.as_ref()
    }

    /// Whether messages of `severity` reach a handler.
    pub fn is_resolved(&self, severity: Severity) -> bool {
        match severity {
            Severity::Warning => self.warning.is_some(),
            Severity::Error => self.error.is_some(),
            Severity::FatalError => self.fatal_error.is_some(),
        }
    }

    /// Append the position suffix when a locator is attached.
    pub fn annotate(&self, message: &str) -> String {
        match &self.locator {
            Some(locator) => format!(
                "{message}\n@{}#[line:{},col:{}]",
                locator.system_id().unwrap_or_default(),
                locator.line_number(),
                locator.column_number()
            ),
            None => message.to_string(),
        }
    }

    fn deliver(&self, handler: Option<&MessageFn>, message: &str) {
        if let Some(handler) = handler {
            handler(&self.annotate(message));
        }
    }
}

impl ErrorHandler for ErrorAdapter {
    fn warning(&self, message: &str) {
        self.deliver(self.warning.as_ref(), message);
    }

    fn error(&self, message: &str) {
        self.deliver(self.error.as_ref(), message);
    }

    /// Deliver the message, then hand back the error that ends the parse.
    fn fatal_error(&self, message: &str) -> xmldom_sax::Error {
        self.deliver(self.fatal_error.as_ref(), message);
        xmldom_sax::Error::Fatal {
            message: message.to_string(),
        }
    }
}

impl fmt::Debug for ErrorAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorAdapter")
            .field("warning", &self.warning.is_some())
            .field("error", &self.error.is_some())
            .field("fatal_error", &self.fatal_error.is_some())
            .field("locator", &self.locator)
            .finish()
    }
}

fn with_severity(handler: &SeverityFn, severity: Severity) -> MessageFn {
    let handler = handler.clone();
    Rc::new(move |message: &str| handler(severity, message))
}

fn first_of(chain: &[&Option<MessageFn>]) -> Option<MessageFn> {
    chain.iter().find_map(|handler| (*handler).clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::DomHandler;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    type Log = Rc<RefCell<Vec<String>>>;

    fn recorder(log: &Log, tag: &'static str) -> impl Fn(&str) + 'static {
        let log = log.clone();
        move |message| log.borrow_mut().push(format!("{tag}:{message}"))
    }

    fn report_all(adapter: &ErrorAdapter) {
        adapter.warning("w");
        adapter.error("e");
        let _ = adapter.fatal_error("f");
    }

    #[test]
    fn test_unary_receives_every_severity() {
        let log: Log = Rc::default();
        let adapter = ErrorAdapter::resolve(&ErrorDescriptor::unary(recorder(&log, "fn")), None);

        report_all(&adapter);

        assert_eq!(*log.borrow(), vec!["fn:w", "fn:e", "fn:f"]);
    }

    #[test]
    fn test_binary_receives_severity_key() {
        let log: Log = Rc::default();
        let sink = log.clone();
        let descriptor = ErrorDescriptor::binary(move |severity, message| {
            sink.borrow_mut().push(format!("{}:{message}", severity.key()));
        });

        report_all(&ErrorAdapter::resolve(&descriptor, None));

        assert_eq!(*log.borrow(), vec!["warning:w", "error:e", "fatalError:f"]);
    }

    #[test]
    fn test_warn_only_covers_all() {
        let log: Log = Rc::default();
        let handlers = ErrorHandlers::new().warn(recorder(&log, "warn"));

        report_all(&ErrorAdapter::resolve(&handlers.into(), None));

        assert_eq!(*log.borrow(), vec!["warn:w", "warn:e", "warn:f"]);
    }

    #[test]
    fn test_fallback_order() {
        let log: Log = Rc::default();
        let handlers = ErrorHandlers::new()
            .warning(recorder(&log, "warning"))
            .error(recorder(&log, "error"));

        report_all(&ErrorAdapter::resolve(&handlers.into(), None));

        // fatal errors fall back to `warning` before `error`
        assert_eq!(*log.borrow(), vec!["warning:w", "error:e", "warning:f"]);
    }

    #[test]
    fn test_error_only_drops_warnings() {
        let log: Log = Rc::default();
        let handlers = ErrorHandlers::new().error(recorder(&log, "error"));
        let adapter = ErrorAdapter::resolve(&handlers.into(), None);

        report_all(&adapter);

        assert!(!adapter.is_resolved(Severity::Warning));
        assert_eq!(*log.borrow(), vec!["error:e", "error:f"]);
    }

    #[test]
    fn test_fatal_error_always_raises() {
        let adapter = ErrorAdapter::silent(None);
        let err = adapter.fatal_error("stop");
        assert!(matches!(err, xmldom_sax::Error::Fatal { message } if message == "stop"));
    }

    #[test]
    fn test_position_suffix() {
        let log: Log = Rc::default();
        let locator = Locator::with_system_id("file.xml");
        locator.set_position(4, 9);
        let adapter =
            ErrorAdapter::resolve(&ErrorDescriptor::unary(recorder(&log, "fn")), Some(&locator));

        adapter.error("bad");
        locator.set_system_id(None);
        locator.set_position(5, 1);
        adapter.warning("later");

        assert_eq!(
            *log.borrow(),
            vec![
                "fn:bad\n@file.xml#[line:4,col:9]",
                "fn:later\n@#[line:5,col:1]",
            ]
        );
    }

    #[test]
    fn test_build_prefers_descriptor() {
        let log: Log = Rc::default();
        let builder = DomHandler::new();
        let descriptor = ErrorDescriptor::unary(recorder(&log, "mine"));

        let adapter = ErrorAdapter::build(Some(&descriptor), &builder, None);
        adapter.warning("x");

        assert_eq!(*log.borrow(), vec!["mine:x"]);
    }

    #[test]
    fn test_build_reuses_builder_adapter() {
        let sink = Rc::new(crate::CollectingDiagnostics::new());
        let builder = DomHandler::with_diagnostics(sink.clone());

        let adapter = ErrorAdapter::build(None, &builder, None);
        adapter.error("oops");

        let diagnostics = sink.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Error);
        assert_eq!(diagnostics[0].message, "oops");
    }
}
