//! Raw disk images: geometry, backing storage, and captured buffers.

mod capture;
mod error;
mod image;

use std::fmt;

pub use self::capture::{Capture, DEFAULT_CAPTURE_SIZE};
pub use self::error::DiskError;
pub use self::image::Image;

pub const SECTOR_SIZE: usize = 512;

/// A `Geometry` specifies the sector layout of a disk image.  Every track
/// holds the same number of equally sized sectors.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Geometry {
    pub sector_size: usize,
    pub sectors_per_track: usize,
    pub tracks: usize,
}

/// Double-sided high density diskette: 80 cylinders of two tracks, 18
/// sectors of 512 bytes each.
pub static DISKETTE: Geometry = Geometry {
    sector_size: SECTOR_SIZE,
    sectors_per_track: 18,
    tracks: 160,
};

impl Geometry {
    /// Given a disk image file size, return the first matching geometry.
    pub fn find_by_size(
        size: usize,
        geometries: &[&'static Geometry],
    ) -> Option<&'static Geometry> {
        geometries
            .iter()
            .copied()
            .find(|geometry| geometry.size() == size)
    }

    /// Total number of sectors.
    #[inline]
    pub fn sectors(&self) -> usize {
        self.sectors_per_track * self.tracks
    }

    /// Return the total number of bytes used to represent a disk image in
    /// this geometry.
    #[inline]
    pub fn size(&self) -> usize {
        self.sectors() * self.sector_size
    }

    /// Byte offset of a sector.
    #[inline]
    pub fn sector_offset(&self, sector: usize) -> usize {
        sector * self.sector_size
    }

    /// Track and sector of a linear sector number.
    pub fn location(&self, sector: usize) -> Location {
        Location(
            sector / self.sectors_per_track,
            sector % self.sectors_per_track,
        )
    }
}

#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord)]
pub struct Location(pub usize, pub usize); // Track and sector

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({},{})", self.0, self.1)
    }
}
