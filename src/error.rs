use std::io;
use std::error;
use std::fmt;

/// Everything that can go wrong while encoding or decoding.
///
/// `Io` wraps failures of the underlying streams, all other variants
/// describe a malformed artifact (or, for `IntervalUnderflow`, an input
/// the arithmetic coder cannot represent).
#[derive(Debug)]
pub enum Error {
    UnexpectedEof,
    MalformedTable(String),
    MalformedCode(String),
    UnmatchedCode(String),
    IndexOutOfRange(u64),
    InvalidFrameLength(usize),
    IntervalUnderflow,
    Io(io::Error),
}

impl Error {
    /// True for errors caused by the content of the input rather than
    /// by the stream it was read from.
    pub fn is_format(&self) -> bool {
        match *self {
            Error::Io(_) => false,
            _ => true,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::UnexpectedEof => write!(f, "unexpected end of file"),
            Error::MalformedTable(ref line) => write!(f, "malformed table entry: {:?}", line),
            Error::MalformedCode(ref what) => write!(f, "malformed code: {}", what),
            Error::UnmatchedCode(ref bits) => write!(f, "bits {:?} match no code", bits),
            Error::IndexOutOfRange(idx) => write!(f, "index {} out of range", idx),
            Error::InvalidFrameLength(len) => write!(f, "code length {} is not a multiple of the frame size", len),
            Error::IntervalUnderflow => write!(f, "coding interval too narrow for symbol table"),
            Error::Io(ref err) => err.fmt(f),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}
