//! Document records.
//!
//! Each document on the diskette is introduced by a control record starting
//! with the ASCII signature `CANONETW1`.  The record fields sit at fixed
//! offsets from the signature.  The layout is undocumented; the offsets
//! below were observed on real diskettes and are kept exactly as measured
//! (as sums of the field widths seen between known fields).

mod scan;

use std::fmt;
use std::io::{self, Write};

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use log::debug;

use crate::text::{self, DecodeError};

pub use self::scan::{find_signature, scan, OutputSink, ScanSettings, ScanSummary, Signatures};

/// Signature found at the start of every document control record.
pub const SIGNATURE: &[u8] = b"CANONETW1";

/// Header tag of a record describing a document.
pub const DOCUMENT_HEADER_TAG: u8 = 0x9F;
/// Trigger code of a record describing a document.
pub const DOCUMENT_TRIGGER: u16 = 0x175B;
/// Marker byte opening the body of a document.  This is also the control
/// byte of a format change block, which is where the body text starts.
pub const DOCUMENT_MARKER: u8 = 0x12;

/// Header tag, one byte.
pub const HEADER_TAG_OFFSET: usize = 9 + 2 + 8 + 8 + 8 + 4;
/// Filename, `FILENAME_SIZE` raw bytes.
pub const FILENAME_OFFSET: usize = HEADER_TAG_OFFSET + 1 + 12 + 8 + 3;
pub const FILENAME_SIZE: usize = 8;
/// Trigger code, big-endian u16.
pub const TRIGGER_OFFSET: usize = FILENAME_OFFSET + 8 + 3 + 10 + 36;
/// Declared body length, little-endian u32.
pub const LENGTH_OFFSET: usize = TRIGGER_OFFSET + 2;
/// Marker byte, and the start of the body text.
pub const MARKER_OFFSET: usize = TRIGGER_OFFSET + 142;

/// The fixed-offset fields of a control record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentRecord {
    /// Offset of the record (its signature) within the buffer.
    pub index: usize,
    pub header_tag: u8,
    pub filename: String,
    pub trigger: u16,
    /// Body length as declared by the record.  The body is actually
    /// delimited by its end-of-text byte.
    pub length: u32,
    pub marker: u8,
}

impl DocumentRecord {
    /// Read the record fields at `index`.
    pub fn read(buffer: &[u8], index: usize) -> Result<DocumentRecord, DecodeError> {
        let header_tag = field(buffer, index, HEADER_TAG_OFFSET, 1)?[0];
        let filename = text::decode_bytes(field(buffer, index, FILENAME_OFFSET, FILENAME_SIZE)?);
        let trigger = BigEndian::read_u16(field(buffer, index, TRIGGER_OFFSET, 2)?);
        let length = LittleEndian::read_u32(field(buffer, index, LENGTH_OFFSET, 4)?);
        let marker = field(buffer, index, MARKER_OFFSET, 1)?[0];

        Ok(DocumentRecord {
            index,
            header_tag,
            filename,
            trigger,
            length,
            marker,
        })
    }

    /// True if the record describes a document body.
    pub fn is_document(&self) -> bool {
        self.header_tag == DOCUMENT_HEADER_TAG
            && self.trigger == DOCUMENT_TRIGGER
            && self.marker == DOCUMENT_MARKER
    }

    /// Offset of the body text within the buffer.
    #[inline]
    pub fn body_offset(&self) -> usize {
        self.index + MARKER_OFFSET
    }
}

/// Borrow the `size` bytes found `offset` bytes into the record at `index`,
/// or report exhaustion.  Offsets that overflow are past any buffer.
fn field(buffer: &[u8], index: usize, offset: usize, size: usize) -> Result<&[u8], DecodeError> {
    let exhausted = |offset| DecodeError::Exhausted {
        offset,
        length: buffer.len(),
    };
    let start = index.checked_add(offset).ok_or(exhausted(usize::MAX))?;
    let end = start.checked_add(size).ok_or(exhausted(usize::MAX))?;
    if end > buffer.len() {
        return Err(exhausted(end));
    }
    Ok(&buffer[start..end])
}

impl fmt::Display for DocumentRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "record@{}: tag={:02X} file={:?} trigger={:04X} len={} marker={:02X}",
            self.index, self.header_tag, self.filename, self.trigger, self.length, self.marker
        )
    }
}

/// A document recovered from a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    pub record: DocumentRecord,
    /// Exclusive end offset of the body text.
    pub end: usize,
    pub text: String,
}

impl fmt::Display for Document {
    /// Render the document header block followed by the body text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let record = &self.record;
        write!(
            f,
            "\nDocHdr: {:01X}, File: {}\nTrigger: {:04X}, Len: {:6}, End: {:6}, Char: {:01X}\n{}",
            record.header_tag,
            record.filename,
            record.trigger,
            record.length,
            self.end,
            record.marker,
            self.text
        )
    }
}

/// Read the record at `index` and, if it describes a document, decode its
/// body.  The body is scrubbed in place.  Records which are not documents
/// yield `None`.
pub fn extract(buffer: &mut [u8], index: usize) -> Result<Option<Document>, DecodeError> {
    let record = DocumentRecord::read(buffer, index)?;
    if !record.is_document() {
        debug!("skipping {}", record);
        return Ok(None);
    }
    debug!("decoding {}", record);
    let body = text::decode_run(buffer, record.body_offset())?;
    Ok(Some(Document {
        record,
        end: body.end,
        text: body.text,
    }))
}

/// Extract the document at `index` and append it to `sink`.  Returns
/// whether a document was written.
pub fn extract_record(buffer: &mut [u8], index: usize, sink: &mut dyn Write) -> io::Result<bool> {
    match extract(buffer, index)? {
        Some(document) => {
            write!(sink, "{}", document)?;
            Ok(true)
        }
        None => Ok(false),
    }
}
