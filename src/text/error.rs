use std::io;

use thiserror::Error;

/// Errors that can be returned while decoding a text run or a document
/// record.  Like `DiskError`, these are generally carried inside an
/// `io::Error` once they leave the decoder.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A byte outside the recognized control set was found between
    /// control blocks.
    #[error("error block byte {byte} at offset {offset}")]
    MalformedControl {
        /// Offset of the offending byte.
        offset: usize,
        /// The offending byte.
        byte: u8,
        /// Bytes consumed up to and including the offending byte.
        consumed: usize,
    },
    /// A field or a parameter skip reached past the end of the buffer.  This
    /// usually means a wrong starting offset or a truncated capture.
    #[error("buffer exhausted at offset {offset} (buffer holds {length} bytes)")]
    Exhausted { offset: usize, length: usize },
    /// An explicit byte range whose start lies after its end.
    #[error("invalid byte range {start}..{end}")]
    InvalidRange { start: usize, end: usize },
}

impl DecodeError {
    /// If the provided `io::Error` contains a `DecodeError`, return the
    /// underlying `DecodeError`.  If not, return None.
    pub fn from_io_error(error: &io::Error) -> Option<DecodeError> {
        error
            .get_ref()
            .and_then(|e| e.downcast_ref::<DecodeError>())
            .cloned()
    }

    /// True for errors caused by the caller's buffer being too short, as
    /// opposed to a bad protocol byte.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, DecodeError::Exhausted { .. })
    }
}

impl From<DecodeError> for io::Error {
    fn from(error: DecodeError) -> io::Error {
        let kind = match error {
            DecodeError::MalformedControl { .. } => io::ErrorKind::InvalidData,
            DecodeError::Exhausted { .. } => io::ErrorKind::UnexpectedEof,
            DecodeError::InvalidRange { .. } => io::ErrorKind::InvalidInput,
        };
        io::Error::new(kind, error)
    }
}

impl PartialEq<io::Error> for DecodeError {
    fn eq(&self, other: &io::Error) -> bool {
        match DecodeError::from_io_error(other) {
            Some(ref e) if e == self => true,
            _ => false,
        }
    }
}
