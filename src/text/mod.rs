//! Decoding of the word processor's text stream: the control-code
//! automaton, UTF-8 decoding with escapes, and the accented-character
//! codepage.

pub mod automaton;
pub mod codepage;
pub mod decode;
mod error;

pub use self::automaton::{parse, Run, State, PLACEHOLDER};
pub use self::decode::{decode, decode_bytes, decode_range, decode_run, Decoded};
pub use self::error::DecodeError;
