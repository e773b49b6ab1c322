//! The control-code automaton.
//!
//! Document text is stored as a sequence of control blocks.  Each block is
//! opened by one of the bytes `0x10..=0x15` and closed by the same byte (or,
//! for the escape block, by `0x80`).  Between blocks only another opening
//! byte or the end-of-text byte `0x03` may appear.  The automaton walks these
//! blocks, overwriting every control byte in place with a placeholder (or a
//! newline/tab where the control byte has a textual meaning), and stops at
//! the end-of-text byte.
//!
//! Parameter escapes carry three opaque bytes which may coincidentally equal
//! control bytes, so they are skipped and scrubbed without interpretation.

use log::trace;

use crate::text::error::DecodeError;

/// Byte written over every neutralized control byte.
pub const PLACEHOLDER: u8 = b'_';

/// End of text.
pub const ETX: u8 = 0x03;

/// Number of opaque bytes following a parameter escape.
pub const PARAMETER_SIZE: usize = 3;

const STYLE: u8 = 0x10;
const PARA: u8 = 0x11;
const FORMAT_CHANGE: u8 = 0x12;
const TEXT_BASE: u8 = 0x13;
const TEXT_SYMBOL: u8 = 0x14;
const ESCAPE: u8 = 0x15;

/// Automaton states.  Every state except `Start` is entered by the control
/// byte of the same block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// Outside any control block.
    Start,
    /// `0x10`: format and style block.
    Style,
    /// `0x11`: paragraph, page break, tab, and justification block.
    Para,
    /// `0x12`: opaque format change block.
    FormatChange,
    /// `0x13`: text in the base codepage.
    TextBase,
    /// `0x14`: text in the symbol codepage.
    TextSymbol,
    /// `0x15`: single byte escape.
    Escape,
}

impl State {
    /// Return the state opened by a control byte, if the byte opens one.
    pub fn from_control(byte: u8) -> Option<State> {
        match byte {
            STYLE => Some(State::Style),
            PARA => Some(State::Para),
            FORMAT_CHANGE => Some(State::FormatChange),
            TEXT_BASE => Some(State::TextBase),
            TEXT_SYMBOL => Some(State::TextSymbol),
            ESCAPE => Some(State::Escape),
            _ => None,
        }
    }
}

/// A text run delimited by the automaton.
#[derive(Debug, PartialEq, Eq)]
pub struct Run<'a> {
    /// Offset of the first byte of the run.
    pub start: usize,
    /// Number of bytes consumed, including the terminating `0x03`.
    pub consumed: usize,
    /// The scrubbed bytes of the run.
    pub bytes: &'a [u8],
}

impl<'a> Run<'a> {
    /// Exclusive end offset of the run within the buffer.
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.consumed
    }
}

enum Step {
    Next(State),
    Done,
}

/// Walk the control blocks starting at `start`, scrubbing control bytes in
/// place, until the end-of-text byte is consumed.
pub fn parse(buffer: &mut [u8], start: usize) -> Result<Run<'_>, DecodeError> {
    let mut state = State::Start;
    let mut pos = start;
    loop {
        let here = pos;
        let byte = match buffer.get(here) {
            Some(byte) => *byte,
            None => {
                return Err(DecodeError::Exhausted {
                    offset: here,
                    length: buffer.len(),
                })
            }
        };
        pos += 1;

        let step = match state {
            State::Start => match State::from_control(byte) {
                Some(next) => {
                    buffer[here] = PLACEHOLDER;
                    Step::Next(next)
                }
                None if byte == ETX => Step::Done,
                None => {
                    return Err(DecodeError::MalformedControl {
                        offset: here,
                        byte,
                        consumed: pos - start,
                    })
                }
            },
            State::Style => match byte {
                0x02 => Step::Next(State::Style),
                STYLE => {
                    buffer[here] = PLACEHOLDER;
                    Step::Next(State::Start)
                }
                b'0' | b'2' | b'@' | b'B' | b'D' | b'F' | b'H' | b'J' | b' ' => {
                    pos = skip_parameters(buffer, here)?;
                    Step::Next(State::Style)
                }
                _ => Step::Next(State::Style),
            },
            State::Para => match byte {
                ETX => Step::Done,
                PARA => {
                    buffer[here] = PLACEHOLDER;
                    Step::Next(State::Start)
                }
                0x22 | 0x81 => {
                    buffer[here] = b'\n';
                    Step::Next(State::Para)
                }
                0x80 => {
                    buffer[here] = b'\t';
                    Step::Next(State::Para)
                }
                // 0x84 and 0x85 (justification) fall in here as well.
                _ => {
                    buffer[here] = PLACEHOLDER;
                    Step::Next(State::Para)
                }
            },
            State::FormatChange => {
                buffer[here] = PLACEHOLDER;
                match byte {
                    FORMAT_CHANGE => Step::Next(State::Start),
                    _ => Step::Next(State::FormatChange),
                }
            }
            State::TextBase => match byte {
                ETX => Step::Done,
                TEXT_BASE => {
                    buffer[here] = PLACEHOLDER;
                    Step::Next(State::Start)
                }
                // Same shape as the style parameters: 0x04 <x> <y> 0x05.
                0x04 => {
                    pos = skip_parameters(buffer, here)?;
                    Step::Next(State::TextBase)
                }
                _ => Step::Next(State::TextBase),
            },
            State::TextSymbol => match byte {
                TEXT_SYMBOL => {
                    buffer[here] = PLACEHOLDER;
                    Step::Next(State::Start)
                }
                _ => Step::Next(State::TextSymbol),
            },
            State::Escape => match byte {
                ESCAPE | 0x80 => {
                    buffer[here] = PLACEHOLDER;
                    Step::Next(State::Start)
                }
                _ => Step::Next(State::Escape),
            },
        };

        match step {
            Step::Next(next) => {
                if next != state {
                    trace!("{:?} -> {:?} at offset {}", state, next, here);
                }
                state = next;
            }
            Step::Done => {
                trace!("{:?} -> done at offset {}", state, here);
                break;
            }
        }
    }
    Ok(Run {
        start,
        consumed: pos - start,
        bytes: &buffer[start..pos],
    })
}

/// Scrub a parameter escape at `escape` together with its parameter bytes,
/// and return the offset following them.
fn skip_parameters(buffer: &mut [u8], escape: usize) -> Result<usize, DecodeError> {
    let end = escape + 1 + PARAMETER_SIZE;
    if end > buffer.len() {
        return Err(DecodeError::Exhausted {
            offset: buffer.len(),
            length: buffer.len(),
        });
    }
    for b in &mut buffer[escape..end] {
        *b = PLACEHOLDER;
    }
    Ok(end)
}
