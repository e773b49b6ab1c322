use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::{debug, info, warn};

use crate::record::{self, SIGNATURE};

/// Settings for scanning a buffer for document records.
#[derive(Clone, Debug)]
pub struct ScanSettings {
    signature: Vec<u8>,
}

impl Default for ScanSettings {
    fn default() -> Self {
        ScanSettings {
            signature: SIGNATURE.to_vec(),
        }
    }
}

impl ScanSettings {
    /// Look for a different record signature.  An empty signature is
    /// ignored.
    pub fn signature(mut self, signature: &[u8]) -> Self {
        if !signature.is_empty() {
            self.signature = signature.to_vec();
        }
        self
    }

    pub fn get_signature(&self) -> &[u8] {
        &self.signature
    }
}

/// Counts gathered over one scan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Signature occurrences found.
    pub matches: usize,
    /// Documents written to the sink.
    pub documents: usize,
    /// Records abandoned because of a decode error.
    pub failures: usize,
}

/// Return the offset of the first occurrence of `pattern` at or after
/// `from`.
pub fn find_signature(buffer: &[u8], pattern: &[u8], from: usize) -> Option<usize> {
    if pattern.is_empty() || from >= buffer.len() {
        return None;
    }
    buffer[from..]
        .windows(pattern.len())
        .position(|window| window == pattern)
        .map(|position| from + position)
}

/// Iterate over the offsets of every non-overlapping occurrence of a
/// signature.
pub struct Signatures<'a> {
    buffer: &'a [u8],
    pattern: &'a [u8],
    next: usize,
}

impl<'a> Signatures<'a> {
    pub fn new(buffer: &'a [u8], pattern: &'a [u8]) -> Signatures<'a> {
        Signatures {
            buffer,
            pattern,
            next: 0,
        }
    }
}

impl<'a> Iterator for Signatures<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let index = find_signature(self.buffer, self.pattern, self.next)?;
        self.next = index + self.pattern.len();
        Some(index)
    }
}

/// Extract every document whose record signature occurs in `buffer`,
/// appending each to `sink`.  Records that fail to decode are logged and
/// skipped.  Only sink errors abort the scan.
pub fn scan(
    buffer: &mut [u8],
    settings: &ScanSettings,
    sink: &mut dyn Write,
) -> io::Result<ScanSummary> {
    let signature = settings.get_signature();
    let mut summary = ScanSummary::default();
    let mut from = 0;
    while let Some(index) = find_signature(buffer, signature, from) {
        summary.matches += 1;
        from = index + signature.len();
        match record::extract(buffer, index) {
            Ok(Some(document)) => {
                info!(
                    "document {:?} at offset {} ({} bytes)",
                    document.record.filename,
                    index,
                    document.end - document.record.body_offset()
                );
                write!(sink, "{}", document)?;
                summary.documents += 1;
            }
            Ok(None) => {}
            Err(e) => {
                warn!("abandoning record at offset {}: {}", index, e);
                summary.failures += 1;
            }
        }
    }
    sink.flush()?;
    debug!("scan finished: {:?}", summary);
    Ok(summary)
}

/// An append-only text file receiving extracted documents.
pub struct OutputSink {
    writer: BufWriter<File>,
}

impl OutputSink {
    /// Open `path` for appending, creating it if needed.
    pub fn append<P: AsRef<Path>>(path: P) -> io::Result<OutputSink> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(OutputSink {
            writer: BufWriter::new(file),
        })
    }
}

impl Write for OutputSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
