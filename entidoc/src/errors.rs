use crate::common::{atomic, Atomic};
use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

/// Error kinds for repository operations.
///
/// Each kind describes a category of failure, enabling precise handling at
/// the call site. Validation kinds are raised before any I/O; store-side
/// failures carry the original status code on the error itself.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// A query expected to yield at most one document yielded more.
    NonUniqueResult,
    /// Invalid entity metadata, e.g. more than one partition key marker.
    ConfigurationError,
    /// An underlying I/O, serialization, or unexpected-status failure.
    DataAccessError,
    /// The operation is not implemented by this engine.
    UnsupportedOperation,
    /// Error mapping a typed object to/from a document tree.
    ObjectMappingError,
    /// The provided identity value is invalid for a point lookup.
    InvalidId,
    /// Invalid document field name.
    InvalidFieldName,
    /// A not-found response from the store, raised by client
    /// implementations for 404-class responses.
    NotFound,
    /// Error reported by the document client collaborator.
    ClientError,
    /// Internal error (usually indicates a bug).
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::NonUniqueResult => write!(f, "Non-unique result"),
            ErrorKind::ConfigurationError => write!(f, "Configuration error"),
            ErrorKind::DataAccessError => write!(f, "Data access error"),
            ErrorKind::UnsupportedOperation => write!(f, "Unsupported operation"),
            ErrorKind::ObjectMappingError => write!(f, "Object mapping error"),
            ErrorKind::InvalidId => write!(f, "Invalid ID"),
            ErrorKind::InvalidFieldName => write!(f, "Invalid field name"),
            ErrorKind::NotFound => write!(f, "Not found"),
            ErrorKind::ClientError => write!(f, "Client error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Error type for all repository operations.
///
/// `EntidocError` carries the error message, kind, optional cause chain and
/// optional store status code. The status code lets callers distinguish a
/// missing document (404) from a lost optimistic-lock race (412) from a
/// transient store failure, even when the kind collapses to
/// [ErrorKind::DataAccessError].
#[derive(Clone)]
pub struct EntidocError {
    message: String,
    error_kind: ErrorKind,
    status: Option<u16>,
    cause: Option<Box<EntidocError>>,
    backtrace: Atomic<Backtrace>,
}

impl EntidocError {
    /// Creates a new `EntidocError` with the specified message and kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        EntidocError {
            message: message.to_string(),
            error_kind,
            status: None,
            cause: None,
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Creates a new `EntidocError` with a cause error attached. The cause
    /// chain is preserved for debugging.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: EntidocError) -> Self {
        EntidocError {
            message: message.to_string(),
            error_kind,
            status: cause.status,
            cause: Some(Box::new(cause)),
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Attaches the store's status code to this error.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn cause(&self) -> Option<&Box<EntidocError>> {
        self.cause.as_ref()
    }
}

impl Display for EntidocError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for EntidocError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace.read()),
        }
    }
}

impl Error for EntidocError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for repository operations.
pub type EntidocResult<T> = Result<T, EntidocError>;

// From trait implementations for automatic error conversion
impl From<std::io::Error> for EntidocError {
    fn from(err: std::io::Error) -> Self {
        EntidocError::new(&format!("IO error: {}", err), ErrorKind::DataAccessError)
    }
}

impl From<String> for EntidocError {
    fn from(msg: String) -> Self {
        EntidocError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for EntidocError {
    fn from(msg: &str) -> Self {
        EntidocError::new(msg, ErrorKind::InternalError)
    }
}
