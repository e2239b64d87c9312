//! Character sets used to move between text and bytes.

use std::fmt;

use crate::ConversionError;

/// A supported character encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Charset {
    #[default]
    Utf8,
    UsAscii,
    Iso8859_1,
    Utf16Be,
    Utf16Le,
}

impl Charset {
    /// Look a charset up by its canonical name or a common alias, ignoring case.
    pub fn for_name(name: &str) -> Result<Self, ConversionError> {
        let normalized = name.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "utf-8" | "utf8" => Ok(Charset::Utf8),
            "us-ascii" | "ascii" => Ok(Charset::UsAscii),
            "iso-8859-1" | "latin1" | "latin-1" | "iso8859-1" => Ok(Charset::Iso8859_1),
            "utf-16" | "utf-16be" | "utf16" => Ok(Charset::Utf16Be),
            "utf-16le" => Ok(Charset::Utf16Le),
            _ => Err(ConversionError::UnsupportedCharset(name.to_owned())),
        }
    }

    /// Canonical name.
    pub fn name(self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::UsAscii => "US-ASCII",
            Charset::Iso8859_1 => "ISO-8859-1",
            Charset::Utf16Be => "UTF-16BE",
            Charset::Utf16Le => "UTF-16LE",
        }
    }

    /// Encode text. Characters the charset cannot represent become `?`.
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            Charset::Utf8 => text.as_bytes().to_vec(),
            Charset::UsAscii => text.chars().map(|c| if c.is_ascii() { c as u8 } else { b'?' }).collect(),
            Charset::Iso8859_1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                .collect(),
            Charset::Utf16Be => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
            Charset::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
        }
    }

    /// Decode bytes, failing on sequences that are invalid in this charset.
    pub fn decode(self, bytes: &[u8]) -> Result<String, ConversionError> {
        let decode_error = |detail: String| ConversionError::Decode {
            charset: self.name(),
            detail,
        };
        match self {
            Charset::Utf8 => String::from_utf8(bytes.to_vec()).map_err(|e| decode_error(e.to_string())),
            Charset::UsAscii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(pos) => Err(decode_error(format!("non-ascii byte at offset {}", pos))),
                None => Ok(bytes.iter().map(|&b| b as char).collect()),
            },
            Charset::Iso8859_1 => Ok(bytes.iter().map(|&b| b as char).collect()),
            Charset::Utf16Be | Charset::Utf16Le => {
                if bytes.len() % 2 != 0 {
                    return Err(decode_error("odd number of bytes".into()));
                }
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| match self {
                        Charset::Utf16Le => u16::from_le_bytes([pair[0], pair[1]]),
                        _ => u16::from_be_bytes([pair[0], pair[1]]),
                    })
                    .collect();
                String::from_utf16(&units).map_err(|e| decode_error(e.to_string()))
            }
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
