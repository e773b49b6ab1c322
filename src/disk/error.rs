use std::io;

use thiserror::Error;

/// Errors that can be returned from disk image operations.  These are
/// generally converted into `io::Error`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DiskError {
    /// Offset out of bounds
    #[error("offset out of bounds")]
    InvalidOffset,
    /// Sector number beyond the end of the image
    #[error("bad sector number")]
    InvalidSector,
    /// Image contains no data
    #[error("disk image is empty")]
    EmptyImage,
}

impl From<DiskError> for io::Error {
    fn from(error: DiskError) -> io::Error {
        use std::io::ErrorKind::*;
        let kind = match error {
            DiskError::InvalidOffset => InvalidInput,
            DiskError::InvalidSector => InvalidInput,
            DiskError::EmptyImage => InvalidData,
        };
        io::Error::new(kind, error)
    }
}

impl DiskError {
    /// If the provided `io::Error` contains a `DiskError`, return the
    /// underlying `DiskError`.  If not, return None.
    pub fn from_io_error(error: &io::Error) -> Option<DiskError> {
        match error.get_ref() {
            Some(e) => e.downcast_ref::<DiskError>().cloned(),
            None => None,
        }
    }
}

impl PartialEq<io::Error> for DiskError {
    fn eq(&self, other: &io::Error) -> bool {
        match DiskError::from_io_error(other) {
            Some(ref e) if e == self => true,
            _ => false,
        }
    }
}

impl PartialEq<DiskError> for io::Error {
    fn eq(&self, other: &DiskError) -> bool {
        match DiskError::from_io_error(self) {
            Some(ref e) if e == other => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_round_trip() {
        let error: io::Error = DiskError::InvalidSector.into();
        assert_eq!(error.kind(), io::ErrorKind::InvalidInput);
        assert_eq!(
            DiskError::from_io_error(&error),
            Some(DiskError::InvalidSector)
        );
        assert!(error == DiskError::InvalidSector);
        assert!(DiskError::EmptyImage != error);
    }

    #[test]
    fn test_foreign_io_error() {
        let error = io::Error::new(io::ErrorKind::Other, "elsewhere");
        assert_eq!(DiskError::from_io_error(&error), None);
        assert!(error != DiskError::InvalidOffset);
    }
}
