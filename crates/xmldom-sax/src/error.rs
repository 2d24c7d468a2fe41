//! Error types for the reader and its handlers.

use thiserror::Error;
use xmldom_dom::DomError;

/// Result type alias for xmldom-sax operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a parse.
///
/// Recoverable problems never show up here: they are reported through an
/// [`ErrorHandler`](crate::ErrorHandler) and parsing continues.
#[derive(Debug, Error)]
pub enum Error {
    /// A fatal error was delivered to the error handler and parsing stopped.
    #[error("{message}")]
    Fatal { message: String },

    /// A handler received an event sequence it cannot act on.
    #[error("Protocol error: {message}")]
    Protocol { message: String },

    /// A tree mutation performed by a handler failed.
    #[error(transparent)]
    Dom(#[from] DomError),
}

impl Error {
    pub fn protocol(message: impl Into<String>) -> Self {
        Error::Protocol {
            message: message.into(),
        }
    }
}
