use backtrace::Backtrace;
use serde::{de, ser};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::path::Path;
use std::result::Result;
use std::sync::Arc;

/// Error kinds for Scribe operations
///
/// Each kind describes one category of failure so callers can branch on
/// [`ScribeError::kind`] instead of parsing messages.
///
/// # Examples
///
/// ```rust
/// use scribe::errors::{ErrorKind, ScribeError, ScribeResult};
///
/// fn example() -> ScribeResult<()> {
///     Err(ScribeError::new("Missing collection", ErrorKind::ValidationError))
/// }
/// assert_eq!(example().unwrap_err().kind(), &ErrorKind::ValidationError);
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// A collection or resource name is empty or escapes the base directory,
    /// or a builder option is out of range
    ValidationError,
    /// The requested resource or collection does not exist
    NotFound,
    /// Generic filesystem error
    IOError,
    /// Permission denied for a filesystem operation
    PermissionDenied,
    /// A value could not be serialized to JSON
    EncodingError,
    /// Stored content is not valid JSON or does not fit the requested type
    DecodeError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::ValidationError => write!(f, "Validation error"),
            ErrorKind::NotFound => write!(f, "Not found"),
            ErrorKind::IOError => write!(f, "IO error"),
            ErrorKind::PermissionDenied => write!(f, "Permission denied"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::DecodeError => write!(f, "Decode error"),
        }
    }
}

/// Custom Scribe error type.
///
/// `ScribeError` carries a message, an [`ErrorKind`], an optional cause and
/// the backtrace captured where it was created.
///
/// # Examples
///
/// ```rust
/// use scribe::errors::{ErrorKind, ScribeError};
///
/// let cause = ScribeError::new("disk full", ErrorKind::IOError);
/// let err = ScribeError::new_with_cause("Write failed", ErrorKind::IOError, cause);
/// assert!(err.cause().is_some());
/// ```
#[derive(Clone)]
pub struct ScribeError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<ScribeError>>,
    backtrace: Arc<Backtrace>,
}

impl ScribeError {
    /// Creates a new `ScribeError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        ScribeError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    /// Creates a new `ScribeError` wrapping `cause`.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: ScribeError) -> Self {
        ScribeError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    /// Wraps an IO error raised while operating on `path`.
    ///
    /// The kind is taken from the IO error so a vanished file still reads as
    /// [`ErrorKind::NotFound`].
    pub(crate) fn io(action: &str, path: &Path, err: std::io::Error) -> Self {
        let cause = ScribeError::from(err);
        let kind = cause.kind().clone();
        ScribeError::new_with_cause(
            &format!("Failed to {} '{}'", action, path.display()),
            kind,
            cause,
        )
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&ScribeError> {
        self.cause.as_deref()
    }

    /// Whether this is a filesystem failure, including permission denials.
    pub fn is_io(&self) -> bool {
        matches!(
            self.error_kind,
            ErrorKind::IOError | ErrorKind::PermissionDenied
        )
    }
}

impl Display for ScribeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for ScribeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace),
        }
    }
}

impl Error for ScribeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for Scribe operations.
pub type ScribeResult<T> = Result<T, ScribeError>;

impl de::Error for ScribeError {
    fn custom<T: Display>(msg: T) -> Self {
        ScribeError::new(&msg.to_string(), ErrorKind::DecodeError)
    }
}

impl ser::Error for ScribeError {
    fn custom<T: Display>(msg: T) -> Self {
        ScribeError::new(&msg.to_string(), ErrorKind::EncodingError)
    }
}

impl From<std::io::Error> for ScribeError {
    fn from(err: std::io::Error) -> Self {
        let error_kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            _ => ErrorKind::IOError,
        };
        ScribeError::new(&format!("IO error: {}", err), error_kind)
    }
}

impl From<serde_json::Error> for ScribeError {
    fn from(err: serde_json::Error) -> Self {
        let error_kind = match err.classify() {
            serde_json::error::Category::Io => ErrorKind::IOError,
            _ => ErrorKind::DecodeError,
        };
        ScribeError::new(&format!("JSON error: {}", err), error_kind)
    }
}
