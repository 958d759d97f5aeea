//! Character encodings a frame may declare for its Base64 text fields.
//!
//! The encoding name travels on the wire un-encoded (it is plain ASCII);
//! an unresolvable name is a payload decode failure, not a malformed frame.

use crate::error::{Result, WireError};

/// Replacement for bytes/characters the target encoding cannot represent.
const REPLACEMENT: char = '\u{FFFD}';

/// A character encoding declared in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextEncoding {
    #[default]
    Utf8,
    UsAscii,
    Iso8859_1,
}

impl TextEncoding {
    /// Canonical wire name.
    pub const fn name(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "UTF-8",
            TextEncoding::UsAscii => "US-ASCII",
            TextEncoding::Iso8859_1 => "ISO-8859-1",
        }
    }

    /// Resolve an encoding by name, case-insensitively, accepting the
    /// common aliases.
    pub fn for_name(name: &str) -> Result<Self> {
        match name.to_ascii_uppercase().as_str() {
            "UTF-8" | "UTF8" => Ok(TextEncoding::Utf8),
            "US-ASCII" | "ASCII" => Ok(TextEncoding::UsAscii),
            "ISO-8859-1" | "LATIN-1" | "LATIN1" => Ok(TextEncoding::Iso8859_1),
            _ => Err(WireError::UnknownEncoding(name.to_string())),
        }
    }

    /// Decode bytes into text, substituting the replacement character for
    /// invalid sequences rather than failing.
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            TextEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            TextEncoding::UsAscii => bytes
                .iter()
                .map(|&b| if b.is_ascii() { b as char } else { REPLACEMENT })
                .collect(),
            TextEncoding::Iso8859_1 => bytes.iter().map(|&b| b as char).collect(),
        }
    }

    /// Encode text into bytes, substituting `?` for characters the encoding
    /// cannot represent.
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            TextEncoding::Utf8 => text.as_bytes().to_vec(),
            TextEncoding::UsAscii => text
                .chars()
                .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
                .collect(),
            TextEncoding::Iso8859_1 => text
                .chars()
                .map(|c| if (c as u32) < 256 { c as u8 } else { b'?' })
                .collect(),
        }
    }
}
