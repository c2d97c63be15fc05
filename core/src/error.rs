use std::{
    error::Error,
    fmt::{Display, Formatter, Result as FmtResult},
    io::Error as IoError,
    result::Result as StdResult,
};

/// Errors that can occur in Lodestone.
#[derive(Debug)]
pub enum LodestoneError {
    /// A query or index operation was constructed with invalid arguments (empty field name,
    /// inverted range bounds, a non-unique key on a keyed upsert, ...).
    Argument(String),

    /// The index, or one of its role-bound views, was used in an invalid state (mutating a
    /// closed index, addressing a document id that is out of range).
    State(String),

    /// An I/O error propagated from the store.
    Io(IoError),

    /// A query string could not be parsed. Produced by the external query-string parser,
    /// which reports through this error type.
    Parse(String),
}

impl Display for LodestoneError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Argument(message) => write!(f, "Argument error: {message}"),
            Self::State(message) => write!(f, "State error: {message}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Parse(message) => write!(f, "Parse error: {message}"),
        }
    }
}

impl Error for LodestoneError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<IoError> for LodestoneError {
    fn from(e: IoError) -> Self {
        Self::Io(e)
    }
}

/// A type alias for a `Result` with a [LodestoneError].
pub type Result<T> = StdResult<T, LodestoneError>;
