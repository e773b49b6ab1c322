//! Accented characters are stored as single bytes in the `0x80..=0x9F`
//! range, which never form valid UTF-8 on their own.  After decoding they
//! show up as backslash escapes, and this table maps those escapes to the
//! characters they stand for.

/// Substitutions applied, in order, to decoded text.  The final entry
/// removes pairs of placeholders left behind by scrubbed control blocks.
#[rustfmt::skip]
pub static CODEPAGE: [(&str, &str); 9] = [
    ("\\x8d", "\u{00e8}"), // è
    ("\\x8c", "\u{00e9}"), // é
    ("\\x81", "\u{00e0}"), // à
    ("\\x8f", "\u{00ea}"), // ê
    ("\\x89", "\u{00f9}"), // ù
    ("\\x93", "\u{00f4}"), // ô
    ("\\x9c", "\u{00e7}"), // ç
    ("\\x87", "\u{00ee}"), // î
    ("__", ""),
];

/// Apply the codepage substitutions to decoded text.  Removing placeholder
/// pairs can join the pieces of an escape, so the table is applied until
/// the text no longer changes.  Every substitution shortens the text.
pub fn substitute(text: &str) -> String {
    let mut text = substitute_once(text);
    loop {
        let next = substitute_once(&text);
        if next == text {
            return text;
        }
        text = next;
    }
}

fn substitute_once(text: &str) -> String {
    CODEPAGE
        .iter()
        .fold(text.to_string(), |text, (from, to)| text.replace(from, to))
}
