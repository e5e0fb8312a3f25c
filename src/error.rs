use std::error;
use std::fmt;
use std::io;
use std::result;

use csv_dialect_core::{DialectError, ParseErrorKind, WriteErrorKind};

use crate::reader::Position;

/// A type alias for `Result<T, csv_dialect::Error>`.
pub type Result<T> = result::Result<T, Error>;

/// An error that can occur when processing CSV data.
///
/// This error can happen when configuring dialects, looking them up by name,
/// and when reading or writing CSV data.
#[derive(Debug)]
pub enum Error {
    /// An I/O error that occurred while reading from a line source or
    /// writing to a line sink.
    Io(io::Error),
    /// A dialect was configured with inconsistent settings.
    Dialect(DialectError),
    /// No dialect is registered under the given name.
    UnknownDialect(String),
    /// The input could not be parsed.
    Parse {
        /// The position of the record in which this error occurred.
        pos: Position,
        /// What went wrong.
        kind: ParseErrorKind,
    },
    /// A field could not be written in the writer's dialect.
    Write(WriteErrorKind),
    /// A mapping given to a `DictWriter` has keys that aren't among its
    /// fieldnames.
    ExtraFields {
        /// The offending keys, in the mapping's iteration order.
        fields: Vec<String>,
    },
}

impl Error {
    /// Returns true if this error was caused by an invalid dialect.
    pub fn is_config(&self) -> bool {
        match *self {
            Error::Dialect(_) => true,
            _ => false,
        }
    }

    /// Returns true if this error is a failed dialect lookup.
    pub fn is_not_found(&self) -> bool {
        match *self {
            Error::UnknownDialect(_) => true,
            _ => false,
        }
    }

    /// Returns true if this error was caused by malformed CSV data or by
    /// data that can't be represented as CSV.
    pub fn is_csv_error(&self) -> bool {
        match *self {
            Error::Parse { .. } | Error::Write(_) | Error::ExtraFields { .. } => {
                true
            }
            _ => false,
        }
    }

    /// Returns true if this is an I/O error.
    pub fn is_io_error(&self) -> bool {
        match *self {
            Error::Io(_) => true,
            _ => false,
        }
    }

    /// The position of the record that caused this error, if any.
    pub fn position(&self) -> Option<&Position> {
        match *self {
            Error::Parse { ref pos, .. } => Some(pos),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<DialectError> for Error {
    fn from(err: DialectError) -> Error {
        Error::Dialect(err)
    }
}

impl From<WriteErrorKind> for Error {
    fn from(err: WriteErrorKind) -> Error {
        Error::Write(err)
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            Error::Dialect(ref err) => Some(err),
            Error::Parse { ref kind, .. } => Some(kind),
            Error::Write(ref err) => Some(err),
            Error::UnknownDialect(_) | Error::ExtraFields { .. } => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Io(ref err) => fmt::Display::fmt(err, f),
            Error::Dialect(ref err) => write!(f, "invalid dialect: {}", err),
            Error::UnknownDialect(ref name) => {
                write!(f, "unknown dialect: {:?}", name)
            }
            Error::Parse { ref pos, ref kind } => write!(
                f,
                "CSV parse error: record {} (line {}): {}",
                pos.record(),
                pos.line(),
                kind
            ),
            Error::Write(ref err) => write!(f, "CSV write error: {}", err),
            Error::ExtraFields { ref fields } => {
                write!(f, "dict contains fields not in fieldnames: ")?;
                for (i, name) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}", name)?;
                }
                Ok(())
            }
        }
    }
}
