//! This is a Rust library for recovering document text from raw sector
//! images of diskettes written by dedicated word processors of the 1980's.
//! Such machines stored documents in a private format: a control record
//! tagged with the signature `CANONETW1` describes each document, and the
//! body text is a stream of control blocks in which style, paragraph, and
//! codepage switches are interleaved with the characters themselves.
//!
//! Features:
//!
//! * Capture the leading sectors of a raw diskette image (memory mapped).
//! * Scan a capture for document records and recover the text of every
//! document found.
//! * Scrub the control-code protocol down to plain text, keeping paragraph
//! breaks and tabs.
//! * Map the machine's accented characters to Unicode.
//! * Render sectors as hex and ASCII panes for manual inspection.
//! * A sample `swdisk` program for operating on disk images from the
//! command line.
//!
//! Current shortcomings:
//!
//! * Only records whose header tag, trigger code, and marker byte match the
//! known document signature are decoded.
//! * Style and symbol-codepage parameters are discarded rather than
//! interpreted.
//! * Recovered text still carries placeholders where odd numbers of control
//! bytes were scrubbed.
//!
//! # Example
//!
//! The following example captures the start of a disk image and writes
//! every recovered document to standard output:
//!
//! ```no_run
//! use std::io;
//! use swdisk::disk::{Capture, DEFAULT_CAPTURE_SIZE};
//! use swdisk::record::{self, ScanSettings};
//! # fn recover(disk_image_filename: &str) -> io::Result<()> {
//!
//! let mut capture = Capture::open(disk_image_filename, DEFAULT_CAPTURE_SIZE)?;
//! let summary = record::scan(
//!     capture.as_mut_slice(),
//!     &ScanSettings::default(),
//!     &mut io::stdout(),
//! )?;
//! eprintln!("{} documents recovered", summary.documents);
//! # Ok(())
//! # }
//! ```
//!
//! # Design of the decoder
//!
//! Decoding is layered:
//!
//! 1. `text::automaton` walks control blocks, scrubbing control bytes in
//!    place and finding the end of a text run.
//! 2. `text::decode` turns the scrubbed bytes into a string, escaping bytes
//!    that are not UTF-8 as `\xNN`.
//! 3. `text::codepage` maps the escapes of accented characters to the
//!    characters themselves.
//! 4. `record` reads the fixed-offset fields of a control record and, for
//!    documents, decodes the body.
//!
//! Scrubbing is destructive.  A buffer must not be shared while a parse is
//! running, and parsing the same run twice does not give the same result,
//! which is why decoding works on a `disk::Capture` rather than on the
//! image.
//!
//! # License
//!
//! Swdisk is distributed under the terms of both the MIT license and the
//! Apache License (Version 2.0).

pub mod disk;
pub mod record;
pub mod text;
pub mod util;

pub use crate::disk::DiskError;
pub use crate::text::DecodeError;
