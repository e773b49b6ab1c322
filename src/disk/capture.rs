use std::io::{self, Write};
use std::path::Path;

use log::debug;

use crate::disk::error::DiskError;
use crate::disk::image::Image;
use crate::disk::{Geometry, DISKETTE};
use crate::util;

/// Bytes captured from an image when no limit is given: the first 120
/// sectors, which hold the document records on every diskette seen so far.
pub const DEFAULT_CAPTURE_SIZE: usize = 512 * 120;

/// An owned, mutable copy of the leading part of a disk image.  Decoding
/// scrubs control bytes in place, so it always works on a capture rather
/// than on the image itself.
pub struct Capture {
    data: Vec<u8>,
    geometry: &'static Geometry,
}

impl Capture {
    /// Open a raw image file and capture up to `limit` bytes of it.
    pub fn open<P: AsRef<Path>>(path: P, limit: usize) -> io::Result<Capture> {
        let image = Image::open_read_only(path)?;
        Capture::from_image(&image, limit)
    }

    /// Capture up to `limit` bytes from the start of an image.
    pub fn from_image(image: &Image, limit: usize) -> io::Result<Capture> {
        if image.is_empty() {
            return Err(DiskError::EmptyImage.into());
        }
        let geometry = match Geometry::find_by_size(image.len(), &[&DISKETTE]) {
            Some(geometry) => geometry,
            None => {
                debug!(
                    "image size {} matches no known geometry, assuming a diskette",
                    image.len()
                );
                &DISKETTE
            }
        };
        let length = image.len().min(limit);
        debug!("capturing {} of {} bytes", length, image.len());
        Ok(Capture {
            data: image.slice(0, length)?.to_vec(),
            geometry,
        })
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Capture {
        Capture {
            data: bytes,
            geometry: &DISKETTE,
        }
    }

    #[inline]
    pub fn geometry(&self) -> &'static Geometry {
        self.geometry
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Number of sectors covered by the capture, counting a trailing
    /// partial sector.
    pub fn sector_count(&self) -> usize {
        let size = self.geometry.sector_size;
        (self.data.len() + size - 1) / size
    }

    /// Return the sector holding a byte offset.
    #[inline]
    pub fn sector_of(&self, offset: usize) -> usize {
        offset / self.geometry.sector_size
    }

    /// Return the bytes of a sector.  The last sector of a capture may be
    /// shorter than the sector size.
    pub fn sector(&self, sector: usize) -> io::Result<&[u8]> {
        if sector >= self.sector_count() {
            return Err(DiskError::InvalidSector.into());
        }
        let offset = self.geometry.sector_offset(sector);
        let end = (offset + self.geometry.sector_size).min(self.data.len());
        Ok(&self.data[offset..end])
    }

    /// Write a hex dump of every sector.
    pub fn dump(&self, writer: &mut dyn Write) -> io::Result<()> {
        for sector in 0..self.sector_count() {
            let offset = self.geometry.sector_offset(sector);
            writeln!(writer)?;
            writeln!(
                writer,
                "sector {:04} {} (0x{:06X})",
                sector,
                self.geometry.location(sector),
                offset
            )?;
            writeln!(writer, "{}", util::hex_at(offset, self.sector(sector)?))?;
        }
        Ok(())
    }
}
