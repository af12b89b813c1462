//! ISO-8859-1 mapping between record bytes and Rust strings.
//!
//! GDV files are Latin-1: every byte is exactly one character, which keeps
//! byte offsets and character positions identical.

/// Decodes Latin-1 bytes into a string.
pub fn decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Encodes a string as Latin-1, returning the first character that does not fit.
pub fn encode(text: &str) -> Result<Vec<u8>, char> {
    text.chars()
        .map(|c| u8::try_from(c as u32).map_err(|_| c))
        .collect()
}
