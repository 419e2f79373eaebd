use std::error;
use std::fmt;
use std::io;
use std::result;

/// A type alias for `Result<T, csv_line::Error>`.
pub type Result<T> = result::Result<T, Error>;

/// An error that can occur when processing CSV data.
///
/// This error can happen when writing or reading CSV data. Note that the
/// tokenizer itself never fails: malformed quoting always yields *some*
/// record. Errors come from the underlying I/O, from text that is not UTF-8
/// and from limits configured on the reader.
#[derive(Debug)]
pub enum Error {
    /// An I/O error that occurred while reading or writing CSV data.
    Io(io::Error),
    /// A physical line was not valid UTF-8.
    Utf8 {
        /// The 1-based number of the offending physical line.
        line: u64,
        /// The corresponding UTF-8 error.
        err: Utf8Error,
    },
    /// A record spanned more physical lines than the reader permits.
    ///
    /// This only occurs when a multi-line limit is set on the reader.
    MultilineLimit {
        /// The 1-based line number at which the offending record started.
        line: u64,
        /// The configured maximum number of lines per record.
        limit: usize,
    },
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        match err {
            Error::Io(err) => err,
            err => io::Error::new(io::ErrorKind::InvalidData, err),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            Error::Utf8 { ref err, .. } => Some(err),
            Error::MultilineLimit { .. } => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Io(ref err) => err.fmt(f),
            Error::Utf8 { line, ref err } => {
                write!(f, "CSV parse error: line {}: {}", line, err)
            }
            Error::MultilineLimit { line, limit } => write!(
                f,
                "CSV parse error: record starting at line {} spans more \
                 than {} lines",
                line, limit
            ),
        }
    }
}

/// A UTF-8 validation error for a single physical line.
///
/// The error includes the last byte at which valid UTF-8 was verified.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Utf8Error {
    /// The index into the line up to which valid UTF-8 was verified.
    valid_up_to: usize,
    /// The length of the invalid sequence, if the line did not simply end
    /// in the middle of a character.
    error_len: Option<usize>,
}

impl Utf8Error {
    pub(crate) fn from_bstr(err: &bstr::Utf8Error) -> Utf8Error {
        Utf8Error { valid_up_to: err.valid_up_to(), error_len: err.error_len() }
    }

    /// The index into the line up to which valid UTF-8 was verified.
    pub fn valid_up_to(&self) -> usize {
        self.valid_up_to
    }

    /// The length in bytes of the invalid sequence, or `None` if the line
    /// ended in the middle of a character.
    pub fn error_len(&self) -> Option<usize> {
        self.error_len
    }
}

impl fmt::Display for Utf8Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "invalid UTF-8 near byte index {}",
            self.valid_up_to
        )
    }
}

impl error::Error for Utf8Error {}

/// `IntoInnerError` occurs when consuming a `Writer` fails.
///
/// Consuming the `Writer` causes a flush to happen. If the flush fails, then
/// this error is returned, which contains both the original `Writer` and
/// the error that occurred.
///
/// The type parameter `W` is the unconsumed writer.
pub struct IntoInnerError<W> {
    wtr: W,
    err: io::Error,
}

impl<W> IntoInnerError<W> {
    pub(crate) fn new(wtr: W, err: io::Error) -> IntoInnerError<W> {
        IntoInnerError { wtr, err }
    }

    /// Returns the error which caused the call to `into_inner` to fail.
    ///
    /// This error was returned when attempting to flush the internal buffer.
    pub fn error(&self) -> &io::Error {
        &self.err
    }

    /// Returns the underlying writer which generated the error.
    ///
    /// The returned value can be used for error recovery, such as
    /// re-inspecting the buffer.
    pub fn into_inner(self) -> W {
        self.wtr
    }
}

impl<W: std::any::Any> error::Error for IntoInnerError<W> {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        Some(&self.err)
    }
}

impl<W> fmt::Display for IntoInnerError<W> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.err.fmt(f)
    }
}

impl<W> fmt::Debug for IntoInnerError<W> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.err.fmt(f)
    }
}
