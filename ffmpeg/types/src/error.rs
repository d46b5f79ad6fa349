/*!
    The error type shared by every pipeline stage.
*/

use std::{fmt, io};

/**
    Failure of a demuxer, codec, filter graph or muxer.

    Two variants are signals of the send/receive contract rather than
    failures:

    - [`Error::Again`]: the stage has nothing to hand out until it gets more
      input, or until its pending output is drained.
    - [`Error::Eof`]: the stage was flushed and has handed out everything.

    Drain loops stop on either one, see [`Error::is_transient`].
*/
#[derive(Debug)]
pub enum Error {
    /// Reading or writing a file failed
    Io(io::Error),
    /// A decoder, encoder or filter rejected its input or failed
    Codec { message: String },
    /// Malformed container or bitstream data
    InvalidData { message: String },
    /// Well-formed input this build cannot handle
    UnsupportedFormat { message: String },
    /// Nothing available right now
    Again,
    /// Flushed and fully drained
    Eof,
}

impl Error {
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec {
            message: message.into(),
        }
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    pub fn unsupported_format(message: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            message: message.into(),
        }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self, Self::Eof)
    }

    pub fn is_again(&self) -> bool {
        matches!(self, Self::Again)
    }

    /**
        True for [`Error::Again`] and [`Error::Eof`], which end a drain loop
        without failing it.
    */
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Again | Self::Eof)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Codec { message } => write!(f, "codec error: {message}"),
            Self::InvalidData { message } => write!(f, "invalid data: {message}"),
            Self::UnsupportedFormat { message } => write!(f, "unsupported format: {message}"),
            Self::Again => f.write_str("no output available yet"),
            Self::Eof => f.write_str("end of stream"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
