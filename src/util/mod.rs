use std::fmt::{self, Write};

use crate::disk::SECTOR_SIZE;

/// Bytes per row in sector panes and hex dumps.
const COLUMNS: usize = 16;
/// Rows in a sector pane.
pub const SECTOR_ROWS: usize = SECTOR_SIZE / COLUMNS;

/// Write a hexdump of the provided byte slice, labelling rows with offsets
/// counted from `base`.
pub fn hexdump(
    f: &mut fmt::Formatter,
    prefix: &str,
    base: usize,
    buffer: &[u8],
) -> std::result::Result<(), std::fmt::Error> {
    let mut offset: usize = 0;
    if buffer.is_empty() {
        // For a zero-length buffer, at least print an offset instead of
        // nothing.
        write!(f, "{}{:06x}: ", prefix, base)?;
    }
    while offset < buffer.len() {
        write!(f, "{}{:06x}: ", prefix, base + offset)?;

        // Determine row byte range
        let next_offset = offset + COLUMNS;
        let (row_size, padding) = if next_offset <= buffer.len() {
            (COLUMNS, 0)
        } else {
            (buffer.len() - offset, next_offset - buffer.len())
        };
        let row = &buffer[offset..offset + row_size];

        // Print hex representation
        for b in row {
            write!(f, "{:02x} ", b)?;
        }
        for _ in 0..padding {
            write!(f, "   ")?;
        }

        // Print ASCII representation
        for b in row {
            f.write_char(printable(*b))?;
        }

        offset += COLUMNS;
        if offset < buffer.len() {
            writeln!(f)?;
        }
    }
    Ok(())
}

pub struct Hex<'a> {
    base: usize,
    bytes: &'a [u8],
}

impl<'a> fmt::Display for Hex<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        hexdump(f, "", self.base, self.bytes)
    }
}

/// Display bytes as a hexdump whose offsets start at `base`.
pub fn hex_at(base: usize, bytes: &[u8]) -> Hex {
    Hex { base, bytes }
}

#[inline]
fn printable(b: u8) -> char {
    match b {
        c @ 0x20..=0x7E => c as char,
        _ => '.',
    }
}

/// Render a sector as rows of eight two-byte groups, each row prefixed with
/// its row number.
pub fn sector_hex(sector: &[u8]) -> String {
    let mut string = String::with_capacity(SECTOR_ROWS * 44);
    for row in 0..SECTOR_ROWS {
        let _ = write!(string, "{:02X}", row);
        let start = (row * COLUMNS).min(sector.len());
        let end = ((row + 1) * COLUMNS).min(sector.len());
        for group in sector[start..end].chunks(2) {
            string.push(' ');
            for b in group {
                let _ = write!(string, "{:02x}", b);
            }
        }
        string.push('\n');
    }
    string
}

/// Render a sector as rows of sixteen printable characters, with `.` for
/// anything outside printable ASCII.
pub fn sector_ascii(sector: &[u8]) -> String {
    let mut string = String::with_capacity(SECTOR_ROWS * (COLUMNS + 1));
    for row in 0..SECTOR_ROWS {
        let start = (row * COLUMNS).min(sector.len());
        let end = ((row + 1) * COLUMNS).min(sector.len());
        string.extend(sector[start..end].iter().map(|b| printable(*b)));
        string.push('\n');
    }
    string
}

/// Render the hex and ASCII panes of a sector next to each other.
pub fn sector_panes(sector: &[u8]) -> String {
    let hex = sector_hex(sector);
    let ascii = sector_ascii(sector);
    let width = hex.lines().map(str::len).max().unwrap_or(0);
    let mut string = String::with_capacity(hex.len() + ascii.len() + SECTOR_ROWS * 4);
    for (left, right) in hex.lines().zip(ascii.lines()) {
        let _ = writeln!(string, "{:<width$} | {}", left, right, width = width);
    }
    string
}
