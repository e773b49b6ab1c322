use std::fmt::Write;

use crate::text::automaton;
use crate::text::codepage;
use crate::text::error::DecodeError;

/// Text decoded from a byte range of a raw buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
    /// Exclusive end offset of the bytes that were decoded.
    pub end: usize,
}

/// Decode text starting at `start`.  With an explicit `end`, the range
/// `start..end` is decoded literally.  Without one, the control-code
/// automaton scrubs the run in place and determines where it ends.
pub fn decode(
    buffer: &mut [u8],
    start: usize,
    end: Option<usize>,
) -> Result<Decoded, DecodeError> {
    match end {
        Some(end) => decode_range(buffer, start, end),
        None => decode_run(buffer, start),
    }
}

/// Decode an automaton-delimited text run.
pub fn decode_run(buffer: &mut [u8], start: usize) -> Result<Decoded, DecodeError> {
    let run = automaton::parse(buffer, start)?;
    Ok(Decoded {
        text: decode_bytes(run.bytes),
        end: run.end(),
    })
}

/// Decode the literal byte range `start..end` without scrubbing.
pub fn decode_range(buffer: &[u8], start: usize, end: usize) -> Result<Decoded, DecodeError> {
    if start > end {
        return Err(DecodeError::InvalidRange { start, end });
    }
    if end > buffer.len() {
        return Err(DecodeError::Exhausted {
            offset: end,
            length: buffer.len(),
        });
    }
    Ok(Decoded {
        text: decode_bytes(&buffer[start..end]),
        end,
    })
}

/// Decode bytes as UTF-8, escaping invalid sequences, and apply the
/// codepage.
pub fn decode_bytes(bytes: &[u8]) -> String {
    codepage::substitute(&escape_invalid_utf8(bytes))
}

/// Interpret bytes as UTF-8, rendering every byte of an invalid sequence as
/// a `\xNN` escape instead of failing.
pub fn escape_invalid_utf8(bytes: &[u8]) -> String {
    let mut string = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        string.push_str(chunk.valid());
        for b in chunk.invalid() {
            // Writing into a String cannot fail.
            let _ = write!(string, "\\x{:02x}", b);
        }
    }
    string
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_invalid_byte() {
        assert_eq!(escape_invalid_utf8(b"a\xffb"), "a\\xffb");
        assert_eq!(escape_invalid_utf8("déjà".as_bytes()), "déjà");
    }

    #[test]
    fn test_escape_truncated_sequence() {
        // A valid prefix of a multi-byte sequence is escaped byte by byte.
        assert_eq!(escape_invalid_utf8(b"x\xe2\x82"), "x\\xe2\\x82");
        assert_eq!(escape_invalid_utf8(b"\xe2\x82y"), "\\xe2\\x82y");
    }

    #[test]
    fn test_decode_range_is_literal() {
        let buffer = *b"\x13FILE\x8d__\x03";
        let decoded = decode_range(&buffer, 1, 8).unwrap();
        assert_eq!(decoded.text, "FILEè");
        assert_eq!(decoded.end, 8);
        // Nothing was scrubbed.
        assert_eq!(buffer[0], 0x13);
    }

    #[test]
    fn test_decode_range_bounds() {
        let buffer = [0u8; 4];
        assert!(decode_range(&buffer, 0, 5).unwrap_err().is_exhausted());
        assert_eq!(
            decode_range(&buffer, 3, 2).unwrap_err(),
            DecodeError::InvalidRange { start: 3, end: 2 }
        );
        assert_eq!(decode_range(&buffer, 4, 4).unwrap().text, "");
    }

    #[test]
    fn test_decode_run() {
        let mut buffer = *b"..\x13Cr\x8dme\x13\x11\x22\x11\x13br\x9el\x8ce\x13\x03..";
        let decoded = decode(&mut buffer, 2, None).unwrap();
        assert_eq!(decoded.text, "_Crème\nbr\\x9elée_\x03");
        assert_eq!(decoded.end, buffer.len() - 2);
    }

    #[test]
    fn test_decode_invalid_body_byte() {
        let mut buffer = *b"\x13a\xffb\x13\x03";
        let decoded = decode(&mut buffer, 0, None).unwrap();
        assert_eq!(decoded.text, "_a\\xffb_\x03");
    }

    #[test]
    fn test_decode_run_escape_split_by_controls() {
        // The escape is only whole once the scrubbed blocks are removed.
        let mut buffer = *b"\x13\\\x13\x13x8d\x13\x03";
        let decoded = decode_run(&mut buffer, 0).unwrap();
        assert_eq!(decoded.text, "_\u{e8}_\x03");
        assert_eq!(codepage::substitute(&decoded.text), decoded.text);
    }

    #[test]
    fn test_decode_with_explicit_end() {
        let mut buffer = *b"\x13abc\x13\x03";
        let decoded = decode(&mut buffer, 1, Some(4)).unwrap();
        assert_eq!(decoded.text, "abc");
        assert_eq!(decoded.end, 4);
    }
}
