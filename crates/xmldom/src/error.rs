//! Error types for parse sessions.

use thiserror::Error;
use xmldom_dom::DomError;

/// Result type alias for xmldom operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that end a `parse_from_string` call.
///
/// Warnings and recoverable errors never surface here; they are delivered
/// to the configured error handler instead.
#[derive(Debug, Error)]
pub enum Error {
    /// A fatal error was delivered to the error handler; no document is returned.
    #[error("{message}")]
    Fatal { message: String },

    /// The document builder could not apply an event to the tree.
    #[error(transparent)]
    Dom(#[from] DomError),

    /// The document builder rejected the event sequence.
    #[error(transparent)]
    Reader(xmldom_sax::Error),
}

impl From<xmldom_sax::Error> for Error {
    fn from(err: xmldom_sax::Error) -> Self {
        match err {
            xmldom_sax::Error::Fatal { message } => Error::Fatal { message },
            xmldom_sax::Error::Dom(err) => Error::Dom(err),
            other => Error::Reader(other),
        }
    }
}

impl Error {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Fatal { .. })
    }
}
