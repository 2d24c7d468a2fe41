//! Diagnostic sinks.
//!
//! The default error reporting of a [`DomHandler`](crate::DomHandler) goes
//! through a [`DiagnosticSink`] injected at construction, so tests and
//! tools can capture what would otherwise be logged.

use std::cell::RefCell;
use std::fmt;
use tracing::{error, warn};

/// Severity of a reported problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Warning,
    Error,
    FatalError,
}

impl Severity {
    /// The handler name for this severity (`warning`, `error`, `fatalError`).
    pub fn key(self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::FatalError => "fatalError",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A reported problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

/// Receiver for the default diagnostics.
pub trait DiagnosticSink {
    fn report(&self, severity: Severity, message: &str);
}

/// Writes diagnostics as tracing events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn report(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Warning => warn!("[xmldom {severity}]\t{message}"),
            Severity::Error | Severity::FatalError => error!("[xmldom {severity}]\t{message}"),
        }
    }
}

/// Keeps diagnostics in memory.
///
/// # Example
///
/// ```rust
/// use xmldom::{CollectingDiagnostics, DiagnosticSink, Severity};
///
/// let sink = CollectingDiagnostics::new();
/// sink.report(Severity::Warning, "careful");
/// assert!(sink.has_diagnostics());
/// assert!(!sink.has_errors());
/// ```
#[derive(Debug, Default)]
pub struct CollectingDiagnostics {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl CollectingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.borrow().is_empty()
    }

    /// Whether anything more severe than a warning was reported.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .borrow()
            .iter()
            .any(|d| d.severity != Severity::Warning)
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    /// Take all collected diagnostics, leaving the sink empty.
    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.borrow_mut())
    }
}

impl DiagnosticSink for CollectingDiagnostics {
    fn report(&self, severity: Severity, message: &str) {
        self.diagnostics.borrow_mut().push(Diagnostic {
            severity,
            message: message.to_string(),
        });
    }
}
